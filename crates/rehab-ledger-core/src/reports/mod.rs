//! Periodic and dashboard reporting.
//!
//! Revenue is the sum of payments received, expenses the sum of recorded
//! facility expenses, and profit their difference. All figures are exact
//! decimals; rounding is left to presentation.

mod consumables;

pub use consumables::{ConsumablesOverview, ConsumerLine};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbError, DbResult};
use crate::models::{Expense, PatientStatus, PaymentWithPatient, Period};

/// Revenue, expenses and profit over a period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeriodSummary {
    pub revenue: Decimal,
    pub expenses: Decimal,
    /// revenue - expenses
    pub profit: Decimal,
}

impl PeriodSummary {
    pub fn new(revenue: Decimal, expenses: Decimal) -> Self {
        Self {
            revenue,
            expenses,
            profit: revenue - expenses,
        }
    }
}

/// The data behind a daily, weekly, monthly or yearly report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodReport {
    pub period: Period,
    pub label: String,
    pub summary: PeriodSummary,
    /// Most recent first
    pub payments: Vec<PaymentWithPatient>,
    /// Most recent first
    pub expenses: Vec<Expense>,
    pub active_patients: u32,
    pub discharged_patients: u32,
}

impl PeriodReport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Headline figures for the home screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub active_patients: u32,
    pub discharged_patients: u32,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub profit: Decimal,
    pub active_employees: u32,
    pub daily_consumable_units: u32,
}

/// Report builder.
pub struct ReportService<'a> {
    db: &'a Database,
}

impl<'a> ReportService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Revenue, expenses and profit for a period.
    pub fn period_summary(&self, period: &Period) -> DbResult<PeriodSummary> {
        let summary = PeriodSummary::new(
            self.db.sum_payments_in(period)?,
            self.db.sum_expenses_in(period)?,
        );
        tracing::debug!(
            period = %period.label(),
            revenue = %summary.revenue,
            expenses = %summary.expenses,
            "Computed period summary"
        );
        Ok(summary)
    }

    /// Full report for a period: summary plus the underlying rows.
    pub fn period_report(&self, period: &Period) -> DbResult<PeriodReport> {
        let payments = self.db.list_payments_in(period)?;
        let expenses = self.db.list_expenses_in(period)?;

        Ok(PeriodReport {
            period: *period,
            label: period.label(),
            summary: self.period_summary(period)?,
            payments,
            expenses,
            active_patients: self.db.count_patients(PatientStatus::Active)?,
            discharged_patients: self.db.count_patients(PatientStatus::Discharged)?,
        })
    }

    /// Lifetime totals and current headcounts.
    pub fn dashboard(&self) -> DbResult<DashboardSummary> {
        let total_revenue = self.db.total_revenue()?;
        let total_expenses = self.db.total_expenses()?;

        Ok(DashboardSummary {
            active_patients: self.db.count_patients(PatientStatus::Active)?,
            discharged_patients: self.db.count_patients(PatientStatus::Discharged)?,
            total_revenue,
            total_expenses,
            profit: total_revenue - total_expenses,
            active_employees: self.db.count_active_employees()?,
            daily_consumable_units: self.db.total_daily_consumables()?,
        })
    }

    /// Today's consumable usage and cost at the current pack price.
    pub fn consumables_overview(&self) -> DbResult<ConsumablesOverview> {
        let settings = self.db.pricing_settings()?;
        let consumers = self
            .db
            .list_patients(Some(PatientStatus::Active))?
            .into_iter()
            .filter(|patient| patient.allowance.is_enabled());

        ConsumablesOverview::build(&settings, consumers).ok_or_else(|| {
            DbError::InvalidData(format!(
                "consumable costs overflow at pack price {}",
                settings.pack_price
            ))
        })
    }
}
