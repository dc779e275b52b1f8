//! Expense database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{decode_amount, require_positive, require_text, Database, DbError, DbResult};
use crate::models::{CategoryTotal, Expense, NewExpense};

impl Database {
    /// Record an expense.
    pub fn insert_expense(&self, new: &NewExpense) -> DbResult<Expense> {
        validate_expense(new)?;

        self.conn.execute(
            r#"
            INSERT INTO expenses (category, amount, expense_date, description)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                new.category.trim(),
                new.amount.to_string(),
                new.expense_date,
                new.description,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(expense_id = id, category = %new.category, amount = %new.amount, "Recorded expense");

        self.get_expense(id)?
            .ok_or_else(|| DbError::NotFound(format!("expense {}", id)))
    }

    /// Get an expense by ID.
    pub fn get_expense(&self, id: i64) -> DbResult<Option<Expense>> {
        self.conn
            .query_row(
                r#"
                SELECT id, category, amount, expense_date, description, created_at
                FROM expenses
                WHERE id = ?
                "#,
                [id],
                read_expense_row,
            )
            .optional()?
            .map(Expense::try_from)
            .transpose()
    }

    /// List all expenses, most recent first.
    pub fn list_expenses(&self) -> DbResult<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, category, amount, expense_date, description, created_at
            FROM expenses
            ORDER BY expense_date DESC, id DESC
            "#,
        )?;

        let rows = stmt
            .query_map([], read_expense_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    /// Rewrite an expense.
    pub fn update_expense(&self, id: i64, new: &NewExpense) -> DbResult<bool> {
        validate_expense(new)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE expenses SET
                category = ?2,
                amount = ?3,
                expense_date = ?4,
                description = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                new.category.trim(),
                new.amount.to_string(),
                new.expense_date,
                new.description,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete an expense.
    pub fn delete_expense(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(expense_id = id, "Deleted expense");
        }
        Ok(rows_affected > 0)
    }

    /// Totals per category, largest first.
    pub fn expense_totals_by_category(&self) -> DbResult<Vec<CategoryTotal>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, amount FROM expenses")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut totals: Vec<CategoryTotal> = Vec::new();
        for (category, raw) in rows {
            let amount = decode_amount("amount", &raw)?;
            match totals.iter_mut().find(|t| t.category == category) {
                Some(total) => total.total += amount,
                None => totals.push(CategoryTotal {
                    category,
                    total: amount,
                }),
            }
        }

        totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        Ok(totals)
    }
}

fn validate_expense(new: &NewExpense) -> DbResult<()> {
    require_text("expense category", &new.category)?;
    require_positive("expense amount", new.amount)
}

pub(crate) fn read_expense_row(row: &Row<'_>) -> rusqlite::Result<ExpenseRow> {
    Ok(ExpenseRow {
        id: row.get(0)?,
        category: row.get(1)?,
        amount: row.get(2)?,
        expense_date: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Intermediate row struct for database mapping.
pub(crate) struct ExpenseRow {
    id: i64,
    category: String,
    amount: String,
    expense_date: NaiveDate,
    description: Option<String>,
    created_at: String,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = DbError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: row.id,
            category: row.category,
            amount: decode_amount("amount", &row.amount)?,
            expense_date: row.expense_date,
            description: row.description,
            created_at: row.created_at,
        })
    }
}
