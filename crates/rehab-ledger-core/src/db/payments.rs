//! Payment database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{decode_amount, require_positive, Database, DbError, DbResult};
use crate::models::{checked_sum, NewPayment, Payment, PaymentWithPatient};

impl Database {
    /// Record a payment against an existing patient.
    pub fn insert_payment(&self, new: &NewPayment) -> DbResult<Payment> {
        self.validate_payment(new)?;

        self.conn.execute(
            r#"
            INSERT INTO payments (patient_id, amount, payment_date, notes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                new.patient_id,
                new.amount.to_string(),
                new.payment_date,
                new.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(
            payment_id = id,
            patient_id = new.patient_id,
            amount = %new.amount,
            "Recorded payment"
        );

        self.get_payment(id)?
            .ok_or_else(|| DbError::NotFound(format!("payment {}", id)))
    }

    /// Get a payment by ID.
    pub fn get_payment(&self, id: i64) -> DbResult<Option<Payment>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, amount, payment_date, notes, created_at
                FROM payments
                WHERE id = ?
                "#,
                [id],
                read_payment_row,
            )
            .optional()?
            .map(Payment::try_from)
            .transpose()
    }

    /// All payments for a patient, most recent first.
    pub fn list_payments_for_patient(&self, patient_id: i64) -> DbResult<Vec<Payment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, amount, payment_date, notes, created_at
            FROM payments
            WHERE patient_id = ?
            ORDER BY payment_date DESC, id DESC
            "#,
        )?;

        let rows = stmt
            .query_map([patient_id], read_payment_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    /// Every payment with its patient's name, most recent first.
    pub fn list_payments_with_names(&self) -> DbResult<Vec<PaymentWithPatient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.id, p.patient_id, p.amount, p.payment_date, p.notes, p.created_at, pt.name
            FROM payments p
            JOIN patients pt ON p.patient_id = pt.id
            ORDER BY p.payment_date DESC, p.id DESC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| Ok((read_payment_row(row)?, row.get::<_, String>(6)?)))?
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

    /// Lifetime total paid by a patient. Zero when nothing was paid.
    pub fn sum_payments_for_patient(&self, patient_id: i64) -> DbResult<Decimal> {
        let mut stmt = self
            .conn
            .prepare("SELECT amount FROM payments WHERE patient_id = ?")?;
        let raw = stmt
            .query_map([patient_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let amounts = raw
            .iter()
            .map(|value| decode_amount("amount", value))
            .collect::<DbResult<Vec<_>>>()?;
        checked_sum(amounts)
            .ok_or_else(|| DbError::InvalidData("amount total out of range".into()))
    }

    /// Rewrite a payment (amount, date, patient, note).
    pub fn update_payment(&self, id: i64, new: &NewPayment) -> DbResult<bool> {
        self.validate_payment(new)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE payments SET
                patient_id = ?2,
                amount = ?3,
                payment_date = ?4,
                notes = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                new.patient_id,
                new.amount.to_string(),
                new.payment_date,
                new.notes,
            ],
        )?;

        if rows_affected > 0 {
            tracing::info!(payment_id = id, amount = %new.amount, "Updated payment");
        }
        Ok(rows_affected > 0)
    }

    /// Delete a payment.
    pub fn delete_payment(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM payments WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(payment_id = id, "Deleted payment");
        }
        Ok(rows_affected > 0)
    }

    fn validate_payment(&self, new: &NewPayment) -> DbResult<()> {
        require_positive("payment amount", new.amount)?;

        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?)",
            [new.patient_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::NotFound(format!("patient {}", new.patient_id)));
        }
        Ok(())
    }
}

pub(crate) fn read_payment_row(row: &Row<'_>) -> rusqlite::Result<PaymentRow> {
    Ok(PaymentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Intermediate row struct for database mapping.
pub(crate) struct PaymentRow {
    id: i64,
    patient_id: i64,
    amount: String,
    payment_date: NaiveDate,
    notes: Option<String>,
    created_at: String,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DbError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            patient_id: row.patient_id,
            amount: decode_amount("amount", &row.amount)?,
            payment_date: row.payment_date,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, NewPatient};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let patient = db
            .insert_patient(
                &NewPatient::new("Mostafa", date(2024, 1, 1), Department::Detox, Decimal::from(100)),
                date(2024, 12, 31),
            )
            .unwrap();
        (db, patient.id)
    }

    #[test]
    fn test_insert_and_get() {
        let (db, patient_id) = setup();

        let payment = db
            .insert_payment(
                &NewPayment::new(patient_id, Decimal::new(30050, 2), date(2024, 1, 6))
                    .with_notes("receipt 17"),
            )
            .unwrap();

        let retrieved = db.get_payment(payment.id).unwrap().unwrap();
        assert_eq!(retrieved.patient_id, patient_id);
        assert_eq!(retrieved.amount, Decimal::new(30050, 2));
        assert_eq!(retrieved.payment_date, date(2024, 1, 6));
        assert_eq!(retrieved.notes, Some("receipt 17".into()));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let (db, patient_id) = setup();
        let zero = NewPayment::new(patient_id, Decimal::ZERO, date(2024, 1, 6));
        assert!(matches!(db.insert_payment(&zero), Err(DbError::Constraint(_))));
        let negative = NewPayment::new(patient_id, Decimal::from(-5), date(2024, 1, 6));
        assert!(matches!(db.insert_payment(&negative), Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_rejects_unknown_patient() {
        let (db, _) = setup();
        let orphan = NewPayment::new(999, Decimal::from(10), date(2024, 1, 6));
        assert!(matches!(db.insert_payment(&orphan), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_list_most_recent_first() {
        let (db, patient_id) = setup();
        db.insert_payment(&NewPayment::new(patient_id, Decimal::from(100), date(2024, 1, 3)))
            .unwrap();
        db.insert_payment(&NewPayment::new(patient_id, Decimal::from(200), date(2024, 1, 9)))
            .unwrap();
        db.insert_payment(&NewPayment::new(patient_id, Decimal::from(300), date(2024, 1, 5)))
            .unwrap();

        let payments = db.list_payments_for_patient(patient_id).unwrap();
        let dates: Vec<_> = payments.iter().map(|p| p.payment_date).collect();
        assert_eq!(dates, vec![date(2024, 1, 9), date(2024, 1, 5), date(2024, 1, 3)]);
    }

    #[test]
    fn test_sum_payments() {
        let (db, patient_id) = setup();
        assert_eq!(db.sum_payments_for_patient(patient_id).unwrap(), Decimal::ZERO);

        db.insert_payment(&NewPayment::new(patient_id, Decimal::new(10010, 2), date(2024, 1, 3)))
            .unwrap();
        db.insert_payment(&NewPayment::new(patient_id, Decimal::new(20020, 2), date(2024, 1, 4)))
            .unwrap();
        assert_eq!(
            db.sum_payments_for_patient(patient_id).unwrap(),
            Decimal::new(30030, 2)
        );
    }

    #[test]
    fn test_update_and_delete() {
        let (db, patient_id) = setup();
        let payment = db
            .insert_payment(&NewPayment::new(patient_id, Decimal::from(100), date(2024, 1, 3)))
            .unwrap();

        let edited = NewPayment::new(patient_id, Decimal::from(150), date(2024, 1, 4))
            .with_notes("corrected");
        assert!(db.update_payment(payment.id, &edited).unwrap());
        let retrieved = db.get_payment(payment.id).unwrap().unwrap();
        assert_eq!(retrieved.amount, Decimal::from(150));
        assert_eq!(retrieved.notes, Some("corrected".into()));

        assert!(db.delete_payment(payment.id).unwrap());
        assert!(db.get_payment(payment.id).unwrap().is_none());
        assert!(!db.delete_payment(payment.id).unwrap());
    }

    #[test]
    fn test_payment_after_discharge_is_accepted() {
        let (db, patient_id) = setup();
        db.discharge_patient(patient_id, date(2024, 1, 5)).unwrap();

        db.insert_payment(&NewPayment::new(patient_id, Decimal::from(300), date(2024, 1, 6)))
            .unwrap();

        let patient = db.get_patient(patient_id).unwrap().unwrap();
        assert!(!patient.is_active());
        assert_eq!(db.list_payments_for_patient(patient_id).unwrap().len(), 1);
    }

    #[test]
    fn test_list_with_names() {
        let (db, patient_id) = setup();
        db.insert_payment(&NewPayment::new(patient_id, Decimal::from(100), date(2024, 1, 3)))
            .unwrap();

        let rows = db.list_payments_with_names().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_name, "Mostafa");
        assert_eq!(rows[0].payment.amount, Decimal::from(100));
    }
}
