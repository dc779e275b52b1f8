//! Database-backed billing.

use rust_decimal::Decimal;

use super::{compute_balance, compute_detailed_statement, BillingError, BillingResult, Statement};
use crate::clock::Clock;
use crate::db::Database;
use crate::models::Patient;

/// Reads the patient, payments and pricing fresh on every call. Nothing is
/// cached, so edits are visible immediately.
pub struct BillingService<'a, C: Clock + ?Sized> {
    db: &'a Database,
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> BillingService<'a, C> {
    pub fn new(db: &'a Database, clock: &'a C) -> Self {
        Self { db, clock }
    }

    /// Accommodation-only balance. `None` if the patient doesn't exist.
    pub fn balance(&self, patient_id: i64) -> BillingResult<Option<Decimal>> {
        let Some(patient) = self.load_patient(patient_id)? else {
            return Ok(None);
        };
        let payments = self.db.list_payments_for_patient(patient_id)?;
        let balance = compute_balance(&patient, &payments, self.clock.today())?;

        tracing::debug!(patient_id, %balance, "Computed balance");
        Ok(Some(balance))
    }

    /// Detailed statement priced at the current settings. `None` if the
    /// patient doesn't exist.
    pub fn statement(&self, patient_id: i64) -> BillingResult<Option<Statement>> {
        let Some(patient) = self.load_patient(patient_id)? else {
            return Ok(None);
        };
        let payments = self.db.list_payments_for_patient(patient_id)?;
        let settings = self.db.pricing_settings()?;
        let statement =
            compute_detailed_statement(&patient, &payments, &settings, self.clock.today())?;

        tracing::debug!(
            patient_id,
            elapsed_days = statement.elapsed_days,
            total_expenses = %statement.total_expenses,
            balance = %statement.balance,
            "Computed statement"
        );
        Ok(Some(statement))
    }

    /// Every patient with its accommodation balance, newest first.
    ///
    /// The ledger refuses admissions after today, but a stored row can still
    /// be ahead of this clock (the clock was set back, or the row predates
    /// the check). Such patients, and any whose balance overflows, are left
    /// out with a warning rather than failing the whole list.
    pub fn outstanding_balances(&self) -> BillingResult<Vec<(Patient, Decimal)>> {
        let today = self.clock.today();
        let mut balances = Vec::new();

        for patient in self.db.list_patients(None)? {
            let payments = self.db.list_payments_for_patient(patient.id)?;
            match compute_balance(&patient, &payments, today) {
                Ok(balance) => balances.push((patient, balance)),
                Err(BillingError::InvalidDateRange { admission, end }) => {
                    tracing::warn!(
                        patient_id = patient.id,
                        %admission,
                        %end,
                        "Skipping patient with unbillable dates"
                    );
                }
                Err(BillingError::AmountOverflow { patient_id }) => {
                    tracing::warn!(patient_id, "Skipping patient whose balance overflows");
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(count = balances.len(), "Computed outstanding balances");
        Ok(balances)
    }

    fn load_patient(&self, patient_id: i64) -> BillingResult<Option<Patient>> {
        let patient = self.db.get_patient(patient_id)?;
        if patient.is_none() {
            tracing::info!(patient_id, "Billing requested for missing patient");
        }
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{ConsumableAllowance, Department, NewPatient, NewPayment, PACK_PRICE_KEY};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admit(db: &Database, admission: NaiveDate, rate: i64, allowance: ConsumableAllowance) -> Patient {
        db.insert_patient(
            &NewPatient::new("Youssef", admission, Department::Detox, Decimal::from(rate))
                .with_allowance(allowance),
            admission,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_patient() {
        let db = Database::open_in_memory().unwrap();
        let clock = FixedClock::new(date(2024, 1, 10));
        let billing = BillingService::new(&db, &clock);

        assert_eq!(billing.balance(99).unwrap(), None);
        assert!(billing.statement(99).unwrap().is_none());
    }

    #[test]
    fn test_balance_reads_latest_payments() {
        let db = Database::open_in_memory().unwrap();
        let patient = admit(&db, date(2024, 1, 1), 100, ConsumableAllowance::none());
        let clock = FixedClock::new(date(2024, 1, 5));
        let billing = BillingService::new(&db, &clock);

        assert_eq!(billing.balance(patient.id).unwrap(), Some(Decimal::from(500)));

        db.insert_payment(&NewPayment::new(patient.id, Decimal::from(300), date(2024, 1, 3)))
            .unwrap();
        assert_eq!(billing.balance(patient.id).unwrap(), Some(Decimal::from(200)));
    }

    #[test]
    fn test_statement_uses_current_price() {
        let db = Database::open_in_memory().unwrap();
        let patient = admit(&db, date(2024, 1, 1), 50, ConsumableAllowance::daily(20));
        let clock = FixedClock::new(date(2024, 1, 10));
        let billing = BillingService::new(&db, &clock);

        let before = billing.statement(patient.id).unwrap().unwrap();
        assert_eq!(before.consumable_cost, Decimal::from(400));

        db.set_setting(PACK_PRICE_KEY, "60").unwrap();
        let after = billing.statement(patient.id).unwrap().unwrap();
        assert_eq!(after.consumable_cost, Decimal::from(600));
        assert_eq!(after.balance, Decimal::from(1100));
    }

    #[test]
    fn test_outstanding_balances_skip_rows_ahead_of_clock() {
        let db = Database::open_in_memory().unwrap();
        let current = admit(&db, date(2024, 1, 1), 100, ConsumableAllowance::none());
        // Admitted on 2024-02-01, then billed by a clock set back a month
        admit(&db, date(2024, 2, 1), 100, ConsumableAllowance::none());
        let clock = FixedClock::new(date(2024, 1, 3));

        let balances = BillingService::new(&db, &clock).outstanding_balances().unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].0.id, current.id);
        assert_eq!(balances[0].1, Decimal::from(300));
    }

    #[test]
    fn test_statement_for_row_ahead_of_clock_errors() {
        let db = Database::open_in_memory().unwrap();
        let patient = admit(&db, date(2024, 2, 1), 100, ConsumableAllowance::none());
        let clock = FixedClock::new(date(2024, 1, 3));

        let result = BillingService::new(&db, &clock).statement(patient.id);
        assert!(matches!(result, Err(BillingError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_huge_rate_is_an_error_not_a_panic() {
        let db = Database::open_in_memory().unwrap();
        let fine = admit(&db, date(2024, 1, 1), 100, ConsumableAllowance::none());
        let huge = db
            .insert_patient(
                &NewPatient::new("Max", date(2024, 1, 1), Department::Detox, Decimal::MAX),
                date(2024, 1, 1),
            )
            .unwrap();
        let clock = FixedClock::new(date(2024, 1, 3));
        let billing = BillingService::new(&db, &clock);

        assert!(matches!(
            billing.statement(huge.id),
            Err(BillingError::AmountOverflow { .. })
        ));
        let balances = billing.outstanding_balances().unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].0.id, fine.id);
    }
}
