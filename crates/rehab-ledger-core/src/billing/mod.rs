//! Billing engine.
//!
//! Balances are never stored. Every call derives them from the patient
//! record, the payment history, a [`PricingSettings`] snapshot and the date
//! supplied by the caller's clock.
//!
//! ```text
//! days           = (billing_end - admission) + 1
//! accommodation  = days * daily_rate
//! consumables    = daily_units * days * pack_price / units_per_pack
//! total_expenses = accommodation + consumables
//! balance        = total_expenses - sum(payments)
//! ```
//!
//! Payments are summed over the patient's whole history while charges cover
//! only the billed window, and the consumable price is whatever the snapshot
//! says today, applied to every billed day.

mod service;
mod statement;

pub use service::BillingService;
pub use statement::Statement;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::DbError;
use crate::models::{checked_sum, Patient, PatientStatus, Payment, PricingSettings};

/// Billing errors.
#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invalid date range: billing ends {end} before admission {admission}")]
    InvalidDateRange { admission: NaiveDate, end: NaiveDate },

    #[error("Amount out of range while billing patient {patient_id}")]
    AmountOverflow { patient_id: i64 },

    #[error(transparent)]
    Database(#[from] DbError),
}

pub type BillingResult<T> = Result<T, BillingError>;

/// Inclusive number of billed days.
///
/// A discharged patient is billed up to the discharge date; anyone else up
/// to `today`. Admission and discharge on the same day count as one day.
pub fn elapsed_days(
    admission: NaiveDate,
    discharge: Option<NaiveDate>,
    status: PatientStatus,
    today: NaiveDate,
) -> BillingResult<i64> {
    let end = match (status, discharge) {
        (PatientStatus::Discharged, Some(discharged)) => discharged,
        _ => today,
    };

    if end < admission {
        return Err(BillingError::InvalidDateRange { admission, end });
    }
    Ok((end - admission).num_days() + 1)
}

/// Sum of every payment, regardless of date. `None` on overflow.
pub fn total_paid(payments: &[Payment]) -> Option<Decimal> {
    checked_sum(payments.iter().map(|payment| payment.amount))
}

/// Accommodation-only balance. Positive means the patient owes money.
pub fn compute_balance(
    patient: &Patient,
    payments: &[Payment],
    today: NaiveDate,
) -> BillingResult<Decimal> {
    let days = patient_days(patient, today)?;
    let overflow = || BillingError::AmountOverflow { patient_id: patient.id };

    let accommodation = accommodation_cost(patient, days).ok_or_else(overflow)?;
    let paid = total_paid(payments).ok_or_else(overflow)?;
    accommodation.checked_sub(paid).ok_or_else(overflow)
}

/// Full statement including consumables, priced with `settings`.
pub fn compute_detailed_statement(
    patient: &Patient,
    payments: &[Payment],
    settings: &PricingSettings,
    today: NaiveDate,
) -> BillingResult<Statement> {
    let days = patient_days(patient, today)?;
    let overflow = || BillingError::AmountOverflow { patient_id: patient.id };

    let accommodation_cost = accommodation_cost(patient, days).ok_or_else(overflow)?;
    let consumable_cost = if patient.allowance.is_enabled() {
        settings
            .cost_of(patient.allowance.daily_units(), days)
            .ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };
    let total_expenses = accommodation_cost
        .checked_add(consumable_cost)
        .ok_or_else(overflow)?;

    let mut payments = payments.to_vec();
    payments.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    let total_paid = total_paid(&payments).ok_or_else(overflow)?;
    let balance = total_expenses.checked_sub(total_paid).ok_or_else(overflow)?;

    Ok(Statement {
        patient_id: patient.id,
        patient_name: patient.name.clone(),
        department: patient.department,
        daily_rate: patient.daily_rate,
        daily_units: patient.allowance.daily_units(),
        admission_date: patient.admission_date,
        discharge_date: match patient.status {
            PatientStatus::Discharged => patient.discharge_date,
            PatientStatus::Active => None,
        },
        elapsed_days: days,
        accommodation_cost,
        consumable_cost,
        total_expenses,
        payments,
        total_paid,
        balance,
        computed_on: today,
    })
}

fn accommodation_cost(patient: &Patient, days: i64) -> Option<Decimal> {
    patient.daily_rate.checked_mul(Decimal::from(days))
}

fn patient_days(patient: &Patient, today: NaiveDate) -> BillingResult<i64> {
    elapsed_days(
        patient.admission_date,
        patient.discharge_date,
        patient.status,
        today,
    )
}
