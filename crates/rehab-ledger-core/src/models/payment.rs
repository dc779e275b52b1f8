//! Payment models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment received from (or on behalf of) a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    /// Row ID
    pub id: i64,
    /// Owning patient
    pub patient_id: i64,
    /// Amount received
    pub amount: Decimal,
    /// Date the payment was received
    pub payment_date: NaiveDate,
    /// Free-form note (receipt number, payer...)
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

/// Fields required to record (or rewrite) a payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub patient_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn new(patient_id: i64, amount: Decimal, payment_date: NaiveDate) -> Self {
        Self {
            patient_id,
            amount,
            payment_date,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A payment joined with its patient's name, for ledgers and period reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentWithPatient {
    pub payment: Payment,
    pub patient_name: String,
}
