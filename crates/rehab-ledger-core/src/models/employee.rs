//! Employee and payroll transaction models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employment status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "active" => Some(EmployeeStatus::Active),
            "inactive" => Some(EmployeeStatus::Inactive),
            _ => None,
        }
    }
}

/// A staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    /// Monthly base salary
    pub base_salary: Decimal,
    pub status: EmployeeStatus,
    pub created_at: String,
}

/// Fields required to hire (or edit) an employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    pub base_salary: Decimal,
}

/// Payroll transaction kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Salary paid out
    Salary,
    /// Deduction from pay
    Deduction,
    /// Advance against future pay
    Advance,
    /// Bonus paid out
    Bonus,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Salary => "salary",
            TransactionKind::Deduction => "deduction",
            TransactionKind::Advance => "advance",
            TransactionKind::Bonus => "bonus",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "salary" => Some(TransactionKind::Salary),
            "deduction" => Some(TransactionKind::Deduction),
            "advance" => Some(TransactionKind::Advance),
            "bonus" => Some(TransactionKind::Bonus),
            _ => None,
        }
    }
}

/// A payroll transaction for one employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeTransaction {
    pub id: i64,
    pub employee_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Fields required to record a payroll transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEmployeeTransaction {
    pub employee_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
}

/// Per-kind payroll totals for one employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmployeeBalance {
    pub salary_paid: Decimal,
    pub deductions: Decimal,
    pub advances: Decimal,
    pub bonuses: Decimal,
    /// salary + bonuses - deductions - advances
    pub total: Decimal,
}

impl EmployeeBalance {
    /// Fold a transaction history into per-kind totals.
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a EmployeeTransaction>,
    {
        let mut balance = Self::default();
        for tx in transactions {
            match tx.kind {
                TransactionKind::Salary => balance.salary_paid += tx.amount,
                TransactionKind::Deduction => balance.deductions += tx.amount,
                TransactionKind::Advance => balance.advances += tx.amount,
                TransactionKind::Bonus => balance.bonuses += tx.amount,
            }
        }
        balance.total = balance.salary_paid + balance.bonuses - balance.deductions - balance.advances;
        balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionKind, amount: i64) -> EmployeeTransaction {
        EmployeeTransaction {
            id: 0,
            employee_id: 1,
            kind,
            amount: Decimal::from(amount),
            transaction_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            notes: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_balance_from_transactions() {
        let history = vec![
            tx(TransactionKind::Salary, 3000),
            tx(TransactionKind::Salary, 3000),
            tx(TransactionKind::Bonus, 500),
            tx(TransactionKind::Deduction, 200),
            tx(TransactionKind::Advance, 1000),
        ];

        let balance = EmployeeBalance::from_transactions(&history);
        assert_eq!(balance.salary_paid, Decimal::from(6000));
        assert_eq!(balance.bonuses, Decimal::from(500));
        assert_eq!(balance.deductions, Decimal::from(200));
        assert_eq!(balance.advances, Decimal::from(1000));
        assert_eq!(balance.total, Decimal::from(5300));
    }

    #[test]
    fn test_empty_history_is_zero() {
        let history: Vec<EmployeeTransaction> = Vec::new();
        let balance = EmployeeBalance::from_transactions(&history);
        assert_eq!(balance, EmployeeBalance::default());
    }

    #[test]
    fn test_kind_labels_round_trip() {
        for kind in [
            TransactionKind::Salary,
            TransactionKind::Deduction,
            TransactionKind::Advance,
            TransactionKind::Bonus,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::parse("loan"), None);
    }
}
