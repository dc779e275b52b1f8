//! Employee and payroll database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{decode_amount, require_positive, require_text, Database, DbError, DbResult};
use crate::models::{
    Employee, EmployeeBalance, EmployeeStatus, EmployeeTransaction, NewEmployee,
    NewEmployeeTransaction, TransactionKind,
};

impl Database {
    /// Hire an employee.
    pub fn insert_employee(&self, new: &NewEmployee) -> DbResult<Employee> {
        require_text("employee name", &new.name)?;
        require_positive("base salary", new.base_salary)?;

        self.conn.execute(
            r#"
            INSERT INTO employees (name, position, phone, hire_date, base_salary, status)
            VALUES (?1, ?2, ?3, ?4, ?5, 'active')
            "#,
            params![
                new.name.trim(),
                new.position,
                new.phone,
                new.hire_date,
                new.base_salary.to_string(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(employee_id = id, "Hired employee");

        self.get_employee(id)?
            .ok_or_else(|| DbError::NotFound(format!("employee {}", id)))
    }

    /// Get an employee by ID.
    pub fn get_employee(&self, id: i64) -> DbResult<Option<Employee>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, position, phone, hire_date, base_salary, status, created_at
                FROM employees
                WHERE id = ?
                "#,
                [id],
                read_employee_row,
            )
            .optional()?
            .map(Employee::try_from)
            .transpose()
    }

    /// List employees, newest first, optionally filtered by status.
    pub fn list_employees(&self, status: Option<EmployeeStatus>) -> DbResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, position, phone, hire_date, base_salary, status, created_at
            FROM employees
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt
            .query_map([status.map(|s| s.as_str())], read_employee_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    /// Edit name, position, phone and base salary. The hire date is fixed.
    pub fn update_employee(&self, id: i64, update: &NewEmployee) -> DbResult<bool> {
        require_text("employee name", &update.name)?;
        require_positive("base salary", update.base_salary)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE employees SET
                name = ?2,
                position = ?3,
                phone = ?4,
                base_salary = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                update.name.trim(),
                update.position,
                update.phone,
                update.base_salary.to_string(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Change employment status.
    pub fn set_employee_status(&self, id: i64, status: EmployeeStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE employees SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Number of active employees.
    pub fn count_active_employees(&self) -> DbResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE status = 'active'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Record a payroll transaction.
    pub fn insert_employee_transaction(
        &self,
        new: &NewEmployeeTransaction,
    ) -> DbResult<EmployeeTransaction> {
        require_positive("transaction amount", new.amount)?;
        if self.get_employee(new.employee_id)?.is_none() {
            return Err(DbError::NotFound(format!("employee {}", new.employee_id)));
        }

        self.conn.execute(
            r#"
            INSERT INTO employee_transactions (employee_id, kind, amount, transaction_date, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                new.employee_id,
                new.kind.as_str(),
                new.amount.to_string(),
                new.transaction_date,
                new.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(
            transaction_id = id,
            employee_id = new.employee_id,
            kind = new.kind.as_str(),
            "Recorded payroll transaction"
        );

        Ok(EmployeeTransaction {
            id,
            employee_id: new.employee_id,
            kind: new.kind,
            amount: new.amount,
            transaction_date: new.transaction_date,
            notes: new.notes.clone(),
            created_at: self.conn.query_row(
                "SELECT created_at FROM employee_transactions WHERE id = ?",
                [id],
                |row| row.get(0),
            )?,
        })
    }

    /// Payroll history for an employee, most recent first.
    pub fn list_employee_transactions(&self, employee_id: i64) -> DbResult<Vec<EmployeeTransaction>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, employee_id, kind, amount, transaction_date, notes, created_at
            FROM employee_transactions
            WHERE employee_id = ?
            ORDER BY transaction_date DESC, id DESC
            "#,
        )?;

        let rows = stmt
            .query_map([employee_id], |row| {
                Ok(TransactionRow {
                    id: row.get(0)?,
                    employee_id: row.get(1)?,
                    kind: row.get(2)?,
                    amount: row.get(3)?,
                    transaction_date: row.get(4)?,
                    notes: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(EmployeeTransaction::try_from).collect()
    }

    /// Per-kind payroll totals for an employee.
    pub fn employee_balance(&self, employee_id: i64) -> DbResult<EmployeeBalance> {
        let transactions = self.list_employee_transactions(employee_id)?;
        Ok(EmployeeBalance::from_transactions(&transactions))
    }
}

fn read_employee_row(row: &Row<'_>) -> rusqlite::Result<EmployeeRow> {
    Ok(EmployeeRow {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        phone: row.get(3)?,
        hire_date: row.get(4)?,
        base_salary: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Intermediate row struct for database mapping.
struct EmployeeRow {
    id: i64,
    name: String,
    position: Option<String>,
    phone: Option<String>,
    hire_date: NaiveDate,
    base_salary: String,
    status: String,
    created_at: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = DbError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let status = EmployeeStatus::parse(&row.status)
            .ok_or_else(|| DbError::InvalidData(format!("Unknown employee status: {}", row.status)))?;

        Ok(Employee {
            id: row.id,
            name: row.name,
            position: row.position,
            phone: row.phone,
            hire_date: row.hire_date,
            base_salary: decode_amount("base_salary", &row.base_salary)?,
            status,
            created_at: row.created_at,
        })
    }
}

/// Intermediate row struct for database mapping.
struct TransactionRow {
    id: i64,
    employee_id: i64,
    kind: String,
    amount: String,
    transaction_date: NaiveDate,
    notes: Option<String>,
    created_at: String,
}

impl TryFrom<TransactionRow> for EmployeeTransaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&row.kind)
            .ok_or_else(|| DbError::InvalidData(format!("Unknown transaction kind: {}", row.kind)))?;

        Ok(EmployeeTransaction {
            id: row.id,
            employee_id: row.employee_id,
            kind,
            amount: decode_amount("amount", &row.amount)?,
            transaction_date: row.transaction_date,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}
