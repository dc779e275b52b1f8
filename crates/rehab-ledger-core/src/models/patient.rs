//! Patient models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Treatment department a patient is admitted to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    /// Detoxification ward
    Detox,
    /// Recovery/rehabilitation ward
    Recovery,
}

impl Department {
    /// Storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Detox => "detox",
            Department::Recovery => "recovery",
        }
    }

    /// Parse a storage label (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "detox" => Some(Department::Detox),
            "recovery" => Some(Department::Recovery),
            _ => None,
        }
    }
}

/// Patient lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// Currently admitted
    Active,
    /// Discharged (terminal)
    Discharged,
}

impl PatientStatus {
    /// Storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Discharged => "discharged",
        }
    }

    /// Parse a storage label.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "active" => Some(PatientStatus::Active),
            "discharged" => Some(PatientStatus::Discharged),
            _ => None,
        }
    }
}

/// Daily consumable (cigarette) allowance.
///
/// The flag and the unit count only change together: a disabled allowance
/// always carries zero units, and there is no way to build one that doesn't.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "StoredAllowance")]
pub struct ConsumableAllowance {
    enabled: bool,
    daily_units: u32,
}

#[derive(Deserialize)]
struct StoredAllowance {
    enabled: bool,
    #[serde(default)]
    daily_units: u32,
}

impl From<StoredAllowance> for ConsumableAllowance {
    fn from(stored: StoredAllowance) -> Self {
        Self::from_parts(stored.enabled, stored.daily_units)
    }
}

impl ConsumableAllowance {
    /// No allowance.
    pub const fn none() -> Self {
        Self {
            enabled: false,
            daily_units: 0,
        }
    }

    /// An enabled allowance of `units` per day.
    pub const fn daily(units: u32) -> Self {
        Self {
            enabled: true,
            daily_units: units,
        }
    }

    /// Rebuild from stored columns. A disabled flag wins over a stray count.
    pub fn from_parts(enabled: bool, daily_units: u32) -> Self {
        if enabled {
            Self::daily(daily_units)
        } else {
            Self::none()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn daily_units(&self) -> u32 {
        self.daily_units
    }
}

impl Default for ConsumableAllowance {
    fn default() -> Self {
        Self::none()
    }
}

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Stable row ID
    pub id: i64,
    /// Full name
    pub name: String,
    /// Family contact phone
    pub family_phone: Option<String>,
    /// Admission date (first billable day)
    pub admission_date: NaiveDate,
    /// Department
    pub department: Department,
    /// Accommodation rate per day
    pub daily_rate: Decimal,
    /// Consumable allowance
    pub allowance: ConsumableAllowance,
    /// Lifecycle status
    pub status: PatientStatus,
    /// Set together with `status` on discharge
    pub discharge_date: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    pub fn is_active(&self) -> bool {
        self.status == PatientStatus::Active
    }

    /// Last billable day: the discharge date once discharged, otherwise `today`.
    pub fn billing_end(&self, today: NaiveDate) -> NaiveDate {
        match (self.status, self.discharge_date) {
            (PatientStatus::Discharged, Some(discharged)) => discharged,
            _ => today,
        }
    }
}

/// Fields required to admit a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub family_phone: Option<String>,
    pub admission_date: NaiveDate,
    pub department: Department,
    pub daily_rate: Decimal,
    pub allowance: ConsumableAllowance,
}

impl NewPatient {
    /// Create an admission request with no consumable allowance.
    pub fn new(
        name: impl Into<String>,
        admission_date: NaiveDate,
        department: Department,
        daily_rate: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            family_phone: None,
            admission_date,
            department,
            daily_rate,
            allowance: ConsumableAllowance::none(),
        }
    }

    pub fn with_allowance(mut self, allowance: ConsumableAllowance) -> Self {
        self.allowance = allowance;
        self
    }

    pub fn with_family_phone(mut self, phone: impl Into<String>) -> Self {
        self.family_phone = Some(phone.into());
        self
    }
}

/// Editable patient fields. Admission date, status and discharge date are
/// not part of an update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientUpdate {
    pub name: String,
    pub family_phone: Option<String>,
    pub department: Department,
    pub daily_rate: Decimal,
    pub allowance: ConsumableAllowance,
}

impl From<&Patient> for PatientUpdate {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            family_phone: patient.family_phone.clone(),
            department: patient.department,
            daily_rate: patient.daily_rate,
            allowance: patient.allowance,
        }
    }
}
