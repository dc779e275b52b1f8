//! Period-bounded aggregate queries over payments and expenses.
//!
//! Amounts are TEXT columns, so sums are computed in Rust with `Decimal`
//! rather than with SQLite's floating point `SUM`.

use rusqlite::params_from_iter;
use rust_decimal::Decimal;

use super::expenses::read_expense_row;
use super::payments::read_payment_row;
use super::{decode_amount, Database, DbError, DbResult};
use crate::models::{checked_sum, Expense, Payment, PaymentWithPatient, Period};

/// WHERE clause and its parameters for a date column.
fn period_filter(column: &str, period: &Period) -> DbResult<(String, Vec<String>)> {
    if !period.is_valid() {
        return Err(DbError::Constraint(format!("invalid period: {:?}", period)));
    }

    let filter = match period {
        Period::Day { date } => (format!("{} = ?1", column), vec![date.format("%Y-%m-%d").to_string()]),
        Period::Range { start, end } => (
            format!("{} BETWEEN ?1 AND ?2", column),
            vec![
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
            ],
        ),
        Period::Month { year, month } => (
            format!("strftime('%Y-%m', {}) = ?1", column),
            vec![format!("{:04}-{:02}", year, month)],
        ),
        Period::Year { year } => (
            format!("strftime('%Y', {}) = ?1", column),
            vec![format!("{:04}", year)],
        ),
    };
    Ok(filter)
}

impl Database {
    /// Revenue (sum of payments) received within a period.
    pub fn sum_payments_in(&self, period: &Period) -> DbResult<Decimal> {
        let (clause, params) = period_filter("payment_date", period)?;
        self.sum_amounts_where(&format!("SELECT amount FROM payments WHERE {}", clause), &params)
    }

    /// Expenses spent within a period.
    pub fn sum_expenses_in(&self, period: &Period) -> DbResult<Decimal> {
        let (clause, params) = period_filter("expense_date", period)?;
        self.sum_amounts_where(&format!("SELECT amount FROM expenses WHERE {}", clause), &params)
    }

    /// Lifetime revenue.
    pub fn total_revenue(&self) -> DbResult<Decimal> {
        self.sum_amounts_where("SELECT amount FROM payments", &[])
    }

    /// Lifetime expenses.
    pub fn total_expenses(&self) -> DbResult<Decimal> {
        self.sum_amounts_where("SELECT amount FROM expenses", &[])
    }

    /// Payments within a period with patient names, most recent first.
    pub fn list_payments_in(&self, period: &Period) -> DbResult<Vec<PaymentWithPatient>> {
        let (clause, params) = period_filter("p.payment_date", period)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT p.id, p.patient_id, p.amount, p.payment_date, p.notes, p.created_at, pt.name
            FROM payments p
            JOIN patients pt ON p.patient_id = pt.id
            WHERE {}
            ORDER BY p.payment_date DESC, p.id DESC
            "#,
            clause
        ))?;

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((read_payment_row(row)?, row.get::<_, String>(6)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(row, patient_name)| {
                Ok(PaymentWithPatient {
                    payment: Payment::try_from(row)?,
                    patient_name,
                })
            })
            .collect()
    }

    /// Expenses within a period, most recent first.
    pub fn list_expenses_in(&self, period: &Period) -> DbResult<Vec<Expense>> {
        let (clause, params) = period_filter("expense_date", period)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT id, category, amount, expense_date, description, created_at
            FROM expenses
            WHERE {}
            ORDER BY expense_date DESC, id DESC
            "#,
            clause
        ))?;

        let rows = stmt
            .query_map(params_from_iter(params.iter()), read_expense_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    fn sum_amounts_where(&self, sql: &str, params: &[String]) -> DbResult<Decimal> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let amounts = raw
            .iter()
            .map(|value| decode_amount("amount", value))
            .collect::<DbResult<Vec<_>>>()?;
        checked_sum(amounts)
            .ok_or_else(|| DbError::InvalidData("amount total out of range".into()))
    }
}
