//! Rehab Ledger Core Library
//!
//! Local-first accounting for a residential treatment facility: patients,
//! payments, expenses, payroll, a daily consumable allowance, statements and
//! periodic reports.
//!
//! # Architecture
//!
//! ```text
//!   Desktop shell (UI, printing, spreadsheets)
//!                     │  FFI
//!                     ▼
//!             ┌───────────────┐
//!             │ RehabLedgerCore│
//!             └───────┬───────┘
//!        ┌────────────┼─────────────┐
//!        ▼            ▼             ▼
//!     Ledgers      Billing       Reports
//!   (db::*)   (statements,   (period sums,
//!                balances)     dashboard)
//!        │            │             │
//!        └────────────┴──────┬──────┘
//!                            ▼
//!                   SQLite + settings
//! ```
//!
//! # Core Principle
//!
//! **Balances are derived, never stored.** Every statement is recomputed from
//! the ledger, the current pricing settings and the injected clock.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Payment, Expense, Employee, etc.)
//! - [`billing`]: Elapsed days, balances and detailed statements
//! - [`reports`]: Period summaries, dashboard and consumable overview
//! - [`clock`]: Injectable time source
//! - [`config`]: JSON application config
//! - [`telemetry`]: Tracing subscriber setup

pub mod billing;
pub mod clock;
pub mod config;
pub mod db;
pub mod models;
pub mod reports;
pub mod telemetry;

// Re-export commonly used types
pub use billing::{BillingError, BillingService, Statement};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use db::Database;
pub use models::{
    ConsumableAllowance, Department, Expense, Patient, PatientStatus, Payment, Period,
    PricingSettings,
};
pub use reports::{DashboardSummary, PeriodSummary, ReportService};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use models::{
    format_amount, parse_amount, CategoryTotal, Employee, EmployeeBalance, EmployeeStatus,
    EmployeeTransaction, NewEmployee, NewEmployeeTransaction, NewExpense, NewPatient, NewPayment,
    PatientUpdate, PaymentWithPatient, PriceChangeImpact, TransactionKind,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RehabLedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Billing error: {0}")]
    Billing(String),
}

impl From<db::DbError> for RehabLedgerError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => RehabLedgerError::NotFound(what),
            db::DbError::Constraint(msg) => RehabLedgerError::InvalidInput(msg),
            other => RehabLedgerError::DatabaseError(other.to_string()),
        }
    }
}

impl From<BillingError> for RehabLedgerError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::Database(inner) => inner.into(),
            other => RehabLedgerError::Billing(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for RehabLedgerError {
    fn from(e: config::ConfigError) -> Self {
        RehabLedgerError::InvalidInput(format!("config: {}", e))
    }
}

impl From<serde_json::Error> for RehabLedgerError {
    fn from(e: serde_json::Error) -> Self {
        RehabLedgerError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RehabLedgerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RehabLedgerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, RehabLedgerError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        RehabLedgerError::InvalidInput(format!("{} must be YYYY-MM-DD, got {:?}", field, raw))
    })
}

fn parse_money(field: &str, raw: &str) -> Result<Decimal, RehabLedgerError> {
    parse_amount(raw)
        .ok_or_else(|| RehabLedgerError::InvalidInput(format!("{} is not an amount: {:?}", field, raw)))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<RehabLedgerCore>, RehabLedgerError> {
    let db = Database::open(&path)?;
    Ok(RehabLedgerCore::with_clock(db, Arc::new(SystemClock)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<RehabLedgerCore>, RehabLedgerError> {
    let db = Database::open_in_memory()?;
    Ok(RehabLedgerCore::with_clock(db, Arc::new(SystemClock)))
}

/// Load the JSON config at `config_path`, start logging with its filter and
/// open the database it names.
#[uniffi::export]
pub fn open_with_config(config_path: String) -> Result<Arc<RehabLedgerCore>, RehabLedgerError> {
    let config = AppConfig::load(Path::new(&config_path))?;
    telemetry::init_tracing(&config.log_filter);
    let db = Database::open(&config.database_path)?;
    Ok(RehabLedgerCore::with_clock(db, Arc::new(SystemClock)))
}

/// Start logging with a `tracing` filter directive.
#[uniffi::export]
pub fn init_logging(filter: String) {
    telemetry::init_tracing(&filter);
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct RehabLedgerCore {
    db: Arc<Mutex<Database>>,
    clock: Arc<dyn Clock>,
}

impl RehabLedgerCore {
    /// Wrap an open database with an explicit clock.
    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            clock,
        })
    }
}

#[uniffi::export]
impl RehabLedgerCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Admit a patient.
    pub fn admit_patient(&self, patient: FfiNewPatient) -> Result<FfiPatient, RehabLedgerError> {
        let new = NewPatient::try_from(patient)?;
        let db = self.db.lock()?;
        Ok(db.insert_patient(&new, self.clock.today())?.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> Result<Option<FfiPatient>, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(db.get_patient(id)?.map(|p| p.into()))
    }

    /// List patients, newest first. `status` is `"active"`, `"discharged"` or absent for all.
    pub fn list_patients(&self, status: Option<String>) -> Result<Vec<FfiPatient>, RehabLedgerError> {
        let status = status
            .map(|label| {
                PatientStatus::parse(&label)
                    .ok_or_else(|| RehabLedgerError::InvalidInput(format!("Unknown status: {}", label)))
            })
            .transpose()?;
        let db = self.db.lock()?;
        let patients = db.list_patients(status)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Search patients by name prefix.
    pub fn search_patients(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatient>, RehabLedgerError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&query, limit as usize)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Edit a patient's details. Returns false if the patient doesn't exist.
    pub fn update_patient(
        &self,
        id: i64,
        update: FfiPatientUpdate,
    ) -> Result<bool, RehabLedgerError> {
        let update = PatientUpdate::try_from(update)?;
        let db = self.db.lock()?;
        Ok(db.update_patient(id, &update)?)
    }

    /// Turn the consumable allowance on (with `daily_units`) or off.
    pub fn set_consumable_allowance(
        &self,
        id: i64,
        enabled: bool,
        daily_units: u32,
    ) -> Result<bool, RehabLedgerError> {
        let db = self.db.lock()?;
        let allowance = ConsumableAllowance::from_parts(enabled, daily_units);
        Ok(db.set_consumable_allowance(id, allowance)?)
    }

    /// Discharge a patient on `date` (YYYY-MM-DD).
    pub fn discharge_patient(&self, id: i64, date: String) -> Result<FfiPatient, RehabLedgerError> {
        let date = parse_date("discharge date", &date)?;
        let db = self.db.lock()?;
        Ok(db.discharge_patient(id, date)?.into())
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    /// Record a payment.
    pub fn record_payment(&self, payment: FfiNewPayment) -> Result<FfiPayment, RehabLedgerError> {
        let new = NewPayment::try_from(payment)?;
        let db = self.db.lock()?;
        Ok(db.insert_payment(&new)?.into())
    }

    /// Payments for a patient, most recent first.
    pub fn list_payments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<FfiPayment>, RehabLedgerError> {
        let db = self.db.lock()?;
        let payments = db.list_payments_for_patient(patient_id)?;
        Ok(payments.into_iter().map(|p| p.into()).collect())
    }

    /// All payments with patient names.
    pub fn list_payments(&self) -> Result<Vec<FfiPaymentWithPatient>, RehabLedgerError> {
        let db = self.db.lock()?;
        let payments = db.list_payments_with_names()?;
        Ok(payments.into_iter().map(|p| p.into()).collect())
    }

    /// Rewrite a payment. Returns false if it doesn't exist.
    pub fn update_payment(&self, id: i64, payment: FfiNewPayment) -> Result<bool, RehabLedgerError> {
        let new = NewPayment::try_from(payment)?;
        let db = self.db.lock()?;
        Ok(db.update_payment(id, &new)?)
    }

    /// Delete a payment. Returns false if it doesn't exist.
    pub fn delete_payment(&self, id: i64) -> Result<bool, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(db.delete_payment(id)?)
    }

    // =========================================================================
    // Expense Operations
    // =========================================================================

    /// Record a facility expense.
    pub fn record_expense(&self, expense: FfiNewExpense) -> Result<FfiExpense, RehabLedgerError> {
        let new = NewExpense::try_from(expense)?;
        let db = self.db.lock()?;
        Ok(db.insert_expense(&new)?.into())
    }

    /// All expenses, most recent first.
    pub fn list_expenses(&self) -> Result<Vec<FfiExpense>, RehabLedgerError> {
        let db = self.db.lock()?;
        let expenses = db.list_expenses()?;
        Ok(expenses.into_iter().map(|e| e.into()).collect())
    }

    /// Rewrite an expense. Returns false if it doesn't exist.
    pub fn update_expense(&self, id: i64, expense: FfiNewExpense) -> Result<bool, RehabLedgerError> {
        let new = NewExpense::try_from(expense)?;
        let db = self.db.lock()?;
        Ok(db.update_expense(id, &new)?)
    }

    /// Delete an expense. Returns false if it doesn't exist.
    pub fn delete_expense(&self, id: i64) -> Result<bool, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(db.delete_expense(id)?)
    }

    /// Totals per expense category, largest first.
    pub fn expense_totals_by_category(&self) -> Result<Vec<FfiCategoryTotal>, RehabLedgerError> {
        let db = self.db.lock()?;
        let totals = db.expense_totals_by_category()?;
        Ok(totals.into_iter().map(|t| t.into()).collect())
    }

    // =========================================================================
    // Employee Operations
    // =========================================================================

    /// Hire an employee.
    pub fn hire_employee(&self, employee: FfiNewEmployee) -> Result<FfiEmployee, RehabLedgerError> {
        let new = NewEmployee::try_from(employee)?;
        let db = self.db.lock()?;
        Ok(db.insert_employee(&new)?.into())
    }

    /// List employees. `status` is `"active"`, `"inactive"` or absent for all.
    pub fn list_employees(&self, status: Option<String>) -> Result<Vec<FfiEmployee>, RehabLedgerError> {
        let status = status
            .map(|label| {
                EmployeeStatus::parse(&label)
                    .ok_or_else(|| RehabLedgerError::InvalidInput(format!("Unknown status: {}", label)))
            })
            .transpose()?;
        let db = self.db.lock()?;
        let employees = db.list_employees(status)?;
        Ok(employees.into_iter().map(|e| e.into()).collect())
    }

    /// Mark an employee active or inactive.
    pub fn set_employee_active(&self, id: i64, active: bool) -> Result<bool, RehabLedgerError> {
        let status = if active {
            EmployeeStatus::Active
        } else {
            EmployeeStatus::Inactive
        };
        let db = self.db.lock()?;
        Ok(db.set_employee_status(id, status)?)
    }

    /// Record a salary, deduction, advance or bonus.
    pub fn record_employee_transaction(
        &self,
        transaction: FfiNewEmployeeTransaction,
    ) -> Result<FfiEmployeeTransaction, RehabLedgerError> {
        let new = NewEmployeeTransaction::try_from(transaction)?;
        let db = self.db.lock()?;
        Ok(db.insert_employee_transaction(&new)?.into())
    }

    /// Payroll history, most recent first.
    pub fn list_employee_transactions(
        &self,
        employee_id: i64,
    ) -> Result<Vec<FfiEmployeeTransaction>, RehabLedgerError> {
        let db = self.db.lock()?;
        let transactions = db.list_employee_transactions(employee_id)?;
        Ok(transactions.into_iter().map(|t| t.into()).collect())
    }

    /// Per-kind payroll totals.
    pub fn employee_balance(&self, employee_id: i64) -> Result<FfiEmployeeBalance, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(db.employee_balance(employee_id)?.into())
    }

    // =========================================================================
    // Settings Operations
    // =========================================================================

    /// Raw setting value.
    pub fn get_setting(&self, key: String) -> Result<Option<String>, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(db.get_setting(&key)?)
    }

    /// Store a raw setting value.
    pub fn set_setting(&self, key: String, value: String) -> Result<(), RehabLedgerError> {
        let db = self.db.lock()?;
        db.set_setting(&key, &value)?;
        Ok(())
    }

    /// Current consumable pricing.
    pub fn pricing_settings(&self) -> Result<FfiPricingSettings, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(db.pricing_settings()?.into())
    }

    /// Change the pack price and report the impact on active patients.
    pub fn update_pack_price(
        &self,
        new_price: String,
    ) -> Result<FfiPriceChangeImpact, RehabLedgerError> {
        let new_price = parse_money("pack price", &new_price)?;
        let db = self.db.lock()?;
        Ok(db.update_pack_price(new_price)?.into())
    }

    // =========================================================================
    // Billing Operations
    // =========================================================================

    /// Accommodation-only balance, `None` for an unknown patient.
    pub fn patient_balance(&self, patient_id: i64) -> Result<Option<String>, RehabLedgerError> {
        let db = self.db.lock()?;
        let billing = BillingService::new(&db, self.clock.as_ref());
        Ok(billing.balance(patient_id)?.map(format_amount))
    }

    /// Detailed statement (display-rounded), `None` for an unknown patient.
    pub fn patient_statement(
        &self,
        patient_id: i64,
    ) -> Result<Option<FfiStatement>, RehabLedgerError> {
        let db = self.db.lock()?;
        let billing = BillingService::new(&db, self.clock.as_ref());
        Ok(billing.statement(patient_id)?.map(|s| s.rounded().into()))
    }

    /// Detailed statement as JSON, same figures as `patient_statement`.
    pub fn export_statement_json(
        &self,
        patient_id: i64,
    ) -> Result<Option<String>, RehabLedgerError> {
        let db = self.db.lock()?;
        let billing = BillingService::new(&db, self.clock.as_ref());
        billing
            .statement(patient_id)?
            .map(|s| s.to_json())
            .transpose()
            .map_err(Into::into)
    }

    /// Detailed statement as CSV.
    pub fn export_statement_csv(&self, patient_id: i64) -> Result<Option<String>, RehabLedgerError> {
        let db = self.db.lock()?;
        let billing = BillingService::new(&db, self.clock.as_ref());
        Ok(billing.statement(patient_id)?.map(|s| s.to_csv()))
    }

    /// Every patient with its accommodation balance.
    pub fn outstanding_balances(&self) -> Result<Vec<FfiPatientBalance>, RehabLedgerError> {
        let db = self.db.lock()?;
        let billing = BillingService::new(&db, self.clock.as_ref());
        let balances = billing.outstanding_balances()?;
        Ok(balances
            .into_iter()
            .map(|(patient, balance)| FfiPatientBalance {
                patient: patient.into(),
                balance: format_amount(balance),
            })
            .collect())
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Revenue, expenses and profit for a period.
    pub fn period_summary(&self, period: FfiPeriod) -> Result<FfiPeriodSummary, RehabLedgerError> {
        let period = Period::try_from(period)?;
        let db = self.db.lock()?;
        let summary = ReportService::new(&db).period_summary(&period)?;
        Ok(FfiPeriodSummary::new(&period, summary))
    }

    /// Full period report as JSON.
    pub fn export_period_report_json(&self, period: FfiPeriod) -> Result<String, RehabLedgerError> {
        let period = Period::try_from(period)?;
        let db = self.db.lock()?;
        let report = ReportService::new(&db).period_report(&period)?;
        Ok(report.to_json()?)
    }

    /// Report for the current calendar month.
    pub fn current_month_summary(&self) -> Result<FfiPeriodSummary, RehabLedgerError> {
        let period = Period::month_of(self.clock.today());
        let db = self.db.lock()?;
        let summary = ReportService::new(&db).period_summary(&period)?;
        Ok(FfiPeriodSummary::new(&period, summary))
    }

    /// Home screen figures.
    pub fn dashboard(&self) -> Result<FfiDashboard, RehabLedgerError> {
        let db = self.db.lock()?;
        Ok(ReportService::new(&db).dashboard()?.into())
    }

    /// Consumable usage overview as JSON.
    pub fn export_consumables_overview_json(&self) -> Result<String, RehabLedgerError> {
        let db = self.db.lock()?;
        let overview = ReportService::new(&db).consumables_overview()?;
        Ok(serde_json::to_string_pretty(&overview)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient. Money is a decimal string, dates are YYYY-MM-DD.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub name: String,
    pub family_phone: Option<String>,
    pub admission_date: String,
    pub department: String,
    pub daily_rate: String,
    pub receives_consumables: bool,
    pub daily_units: u32,
    pub status: String,
    pub discharge_date: Option<String>,
    pub created_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            family_phone: patient.family_phone,
            admission_date: format_date(patient.admission_date),
            department: patient.department.as_str().to_string(),
            daily_rate: patient.daily_rate.to_string(),
            receives_consumables: patient.allowance.is_enabled(),
            daily_units: patient.allowance.daily_units(),
            status: patient.status.as_str().to_string(),
            discharge_date: patient.discharge_date.map(format_date),
            created_at: patient.created_at,
        }
    }
}

/// FFI-safe admission request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub family_phone: Option<String>,
    pub admission_date: String,
    pub department: String,
    pub daily_rate: String,
    pub receives_consumables: bool,
    pub daily_units: u32,
}

fn parse_department(label: &str) -> Result<Department, RehabLedgerError> {
    Department::parse(label)
        .ok_or_else(|| RehabLedgerError::InvalidInput(format!("Unknown department: {}", label)))
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = RehabLedgerError;

    fn try_from(p: FfiNewPatient) -> Result<Self, Self::Error> {
        Ok(NewPatient {
            name: p.name,
            family_phone: p.family_phone,
            admission_date: parse_date("admission date", &p.admission_date)?,
            department: parse_department(&p.department)?,
            daily_rate: parse_money("daily rate", &p.daily_rate)?,
            allowance: ConsumableAllowance::from_parts(p.receives_consumables, p.daily_units),
        })
    }
}

/// FFI-safe patient edit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientUpdate {
    pub name: String,
    pub family_phone: Option<String>,
    pub department: String,
    pub daily_rate: String,
    pub receives_consumables: bool,
    pub daily_units: u32,
}

impl TryFrom<FfiPatientUpdate> for PatientUpdate {
    type Error = RehabLedgerError;

    fn try_from(p: FfiPatientUpdate) -> Result<Self, Self::Error> {
        Ok(PatientUpdate {
            name: p.name,
            family_phone: p.family_phone,
            department: parse_department(&p.department)?,
            daily_rate: parse_money("daily rate", &p.daily_rate)?,
            allowance: ConsumableAllowance::from_parts(p.receives_consumables, p.daily_units),
        })
    }
}

/// FFI-safe payment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPayment {
    pub id: i64,
    pub patient_id: i64,
    pub amount: String,
    pub payment_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<Payment> for FfiPayment {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            patient_id: payment.patient_id,
            amount: payment.amount.to_string(),
            payment_date: format_date(payment.payment_date),
            notes: payment.notes,
            created_at: payment.created_at,
        }
    }
}

/// FFI-safe payment with its patient's name.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPaymentWithPatient {
    pub payment: FfiPayment,
    pub patient_name: String,
}

impl From<PaymentWithPatient> for FfiPaymentWithPatient {
    fn from(row: PaymentWithPatient) -> Self {
        Self {
            payment: row.payment.into(),
            patient_name: row.patient_name,
        }
    }
}

/// FFI-safe payment request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPayment {
    pub patient_id: i64,
    pub amount: String,
    pub payment_date: String,
    pub notes: Option<String>,
}

impl TryFrom<FfiNewPayment> for NewPayment {
    type Error = RehabLedgerError;

    fn try_from(p: FfiNewPayment) -> Result<Self, Self::Error> {
        Ok(NewPayment {
            patient_id: p.patient_id,
            amount: parse_money("amount", &p.amount)?,
            payment_date: parse_date("payment date", &p.payment_date)?,
            notes: p.notes,
        })
    }
}

/// FFI-safe expense.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExpense {
    pub id: i64,
    pub category: String,
    pub amount: String,
    pub expense_date: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Expense> for FfiExpense {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            category: expense.category,
            amount: expense.amount.to_string(),
            expense_date: format_date(expense.expense_date),
            description: expense.description,
            created_at: expense.created_at,
        }
    }
}

/// FFI-safe expense request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewExpense {
    pub category: String,
    pub amount: String,
    pub expense_date: String,
    pub description: Option<String>,
}

impl TryFrom<FfiNewExpense> for NewExpense {
    type Error = RehabLedgerError;

    fn try_from(e: FfiNewExpense) -> Result<Self, Self::Error> {
        Ok(NewExpense {
            category: e.category,
            amount: parse_money("amount", &e.amount)?,
            expense_date: parse_date("expense date", &e.expense_date)?,
            description: e.description,
        })
    }
}

/// FFI-safe category total.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategoryTotal {
    pub category: String,
    pub total: String,
}

impl From<CategoryTotal> for FfiCategoryTotal {
    fn from(total: CategoryTotal) -> Self {
        Self {
            category: total.category,
            total: total.total.to_string(),
        }
    }
}

/// FFI-safe employee.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmployee {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub hire_date: String,
    pub base_salary: String,
    pub status: String,
}

impl From<Employee> for FfiEmployee {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            position: employee.position,
            phone: employee.phone,
            hire_date: format_date(employee.hire_date),
            base_salary: employee.base_salary.to_string(),
            status: employee.status.as_str().to_string(),
        }
    }
}

/// FFI-safe hire request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewEmployee {
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub hire_date: String,
    pub base_salary: String,
}

impl TryFrom<FfiNewEmployee> for NewEmployee {
    type Error = RehabLedgerError;

    fn try_from(e: FfiNewEmployee) -> Result<Self, Self::Error> {
        Ok(NewEmployee {
            name: e.name,
            position: e.position,
            phone: e.phone,
            hire_date: parse_date("hire date", &e.hire_date)?,
            base_salary: parse_money("base salary", &e.base_salary)?,
        })
    }
}

/// FFI-safe payroll transaction.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmployeeTransaction {
    pub id: i64,
    pub employee_id: i64,
    pub kind: String,
    pub amount: String,
    pub transaction_date: String,
    pub notes: Option<String>,
}

impl From<EmployeeTransaction> for FfiEmployeeTransaction {
    fn from(t: EmployeeTransaction) -> Self {
        Self {
            id: t.id,
            employee_id: t.employee_id,
            kind: t.kind.as_str().to_string(),
            amount: t.amount.to_string(),
            transaction_date: format_date(t.transaction_date),
            notes: t.notes,
        }
    }
}

/// FFI-safe payroll transaction request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewEmployeeTransaction {
    pub employee_id: i64,
    pub kind: String,
    pub amount: String,
    pub transaction_date: String,
    pub notes: Option<String>,
}

impl TryFrom<FfiNewEmployeeTransaction> for NewEmployeeTransaction {
    type Error = RehabLedgerError;

    fn try_from(t: FfiNewEmployeeTransaction) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&t.kind).ok_or_else(|| {
            RehabLedgerError::InvalidInput(format!("Unknown transaction kind: {}", t.kind))
        })?;
        Ok(NewEmployeeTransaction {
            employee_id: t.employee_id,
            kind,
            amount: parse_money("amount", &t.amount)?,
            transaction_date: parse_date("transaction date", &t.transaction_date)?,
            notes: t.notes,
        })
    }
}

/// FFI-safe payroll totals.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmployeeBalance {
    pub salary_paid: String,
    pub deductions: String,
    pub advances: String,
    pub bonuses: String,
    pub total: String,
}

impl From<EmployeeBalance> for FfiEmployeeBalance {
    fn from(b: EmployeeBalance) -> Self {
        Self {
            salary_paid: b.salary_paid.to_string(),
            deductions: b.deductions.to_string(),
            advances: b.advances.to_string(),
            bonuses: b.bonuses.to_string(),
            total: b.total.to_string(),
        }
    }
}

/// FFI-safe pricing snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPricingSettings {
    pub pack_price: String,
    pub pack_cost: String,
    pub units_per_pack: u32,
}

impl From<PricingSettings> for FfiPricingSettings {
    fn from(s: PricingSettings) -> Self {
        Self {
            pack_price: s.pack_price.to_string(),
            pack_cost: s.pack_cost.to_string(),
            units_per_pack: s.units_per_pack,
        }
    }
}

/// FFI-safe price change impact.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPriceChangeImpact {
    pub old_price: String,
    pub new_price: String,
    pub price_difference: String,
    pub affected_patients: u32,
    pub daily_units: u32,
    pub daily_cost_difference: String,
}

impl From<PriceChangeImpact> for FfiPriceChangeImpact {
    fn from(i: PriceChangeImpact) -> Self {
        Self {
            old_price: i.old_price.to_string(),
            new_price: i.new_price.to_string(),
            price_difference: i.price_difference.to_string(),
            affected_patients: i.affected_patients,
            daily_units: i.daily_units,
            daily_cost_difference: format_amount(i.daily_cost_difference),
        }
    }
}

/// FFI-safe statement. Amounts are two-decimal strings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStatement {
    pub patient_id: i64,
    pub patient_name: String,
    pub department: String,
    pub daily_rate: String,
    pub daily_units: u32,
    pub admission_date: String,
    pub discharge_date: Option<String>,
    pub elapsed_days: i64,
    pub accommodation_cost: String,
    pub consumable_cost: String,
    pub total_expenses: String,
    pub payments: Vec<FfiPayment>,
    pub total_paid: String,
    pub balance: String,
    pub computed_on: String,
}

impl From<Statement> for FfiStatement {
    fn from(s: Statement) -> Self {
        Self {
            patient_id: s.patient_id,
            patient_name: s.patient_name,
            department: s.department.as_str().to_string(),
            daily_rate: format_amount(s.daily_rate),
            daily_units: s.daily_units,
            admission_date: format_date(s.admission_date),
            discharge_date: s.discharge_date.map(format_date),
            elapsed_days: s.elapsed_days,
            accommodation_cost: format_amount(s.accommodation_cost),
            consumable_cost: format_amount(s.consumable_cost),
            total_expenses: format_amount(s.total_expenses),
            payments: s
                .payments
                .into_iter()
                .map(|p| FfiPayment {
                    amount: format_amount(p.amount),
                    ..FfiPayment::from(p)
                })
                .collect(),
            total_paid: format_amount(s.total_paid),
            balance: format_amount(s.balance),
            computed_on: format_date(s.computed_on),
        }
    }
}

/// FFI-safe patient balance row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientBalance {
    pub patient: FfiPatient,
    pub balance: String,
}

/// FFI-safe reporting period. Dates are YYYY-MM-DD, bounds inclusive.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiPeriod {
    Day { date: String },
    Range { start: String, end: String },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl TryFrom<FfiPeriod> for Period {
    type Error = RehabLedgerError;

    fn try_from(p: FfiPeriod) -> Result<Self, Self::Error> {
        let period = match p {
            FfiPeriod::Day { date } => Period::day(parse_date("date", &date)?),
            FfiPeriod::Range { start, end } => {
                Period::range(parse_date("start", &start)?, parse_date("end", &end)?)
            }
            FfiPeriod::Month { year, month } => Period::month(year, month),
            FfiPeriod::Year { year } => Period::year(year),
        };
        if !period.is_valid() {
            return Err(RehabLedgerError::InvalidInput(format!(
                "Invalid period: {}",
                period.label()
            )));
        }
        Ok(period)
    }
}

/// FFI-safe period summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPeriodSummary {
    pub label: String,
    pub revenue: String,
    pub expenses: String,
    pub profit: String,
}

impl FfiPeriodSummary {
    fn new(period: &Period, summary: PeriodSummary) -> Self {
        Self {
            label: period.label(),
            revenue: format_amount(summary.revenue),
            expenses: format_amount(summary.expenses),
            profit: format_amount(summary.profit),
        }
    }
}

/// FFI-safe dashboard figures.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub active_patients: u32,
    pub discharged_patients: u32,
    pub total_revenue: String,
    pub total_expenses: String,
    pub profit: String,
    pub active_employees: u32,
    pub daily_consumable_units: u32,
}

impl From<DashboardSummary> for FfiDashboard {
    fn from(d: DashboardSummary) -> Self {
        Self {
            active_patients: d.active_patients,
            discharged_patients: d.discharged_patients,
            total_revenue: format_amount(d.total_revenue),
            total_expenses: format_amount(d.total_expenses),
            profit: format_amount(d.profit),
            active_employees: d.active_employees,
            daily_consumable_units: d.daily_consumable_units,
        }
    }
}
