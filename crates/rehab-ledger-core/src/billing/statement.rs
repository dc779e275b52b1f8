//! Patient statements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{format_amount, round_display, Department, Payment};

/// Everything a printed or on-screen statement shows.
///
/// Amounts are exact. Use [`Statement::rounded`] for the two-decimal view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub patient_id: i64,
    pub patient_name: String,
    pub department: Department,
    pub daily_rate: Decimal,
    /// Consumable units per day (0 without an allowance)
    pub daily_units: u32,
    pub admission_date: NaiveDate,
    /// Only set for discharged patients
    pub discharge_date: Option<NaiveDate>,
    pub elapsed_days: i64,
    pub accommodation_cost: Decimal,
    pub consumable_cost: Decimal,
    pub total_expenses: Decimal,
    /// Most recent first
    pub payments: Vec<Payment>,
    pub total_paid: Decimal,
    /// Positive: patient owes. Negative: credit.
    pub balance: Decimal,
    /// Date the statement was computed for
    pub computed_on: NaiveDate,
}

impl Statement {
    /// Display view, two decimals, half away from zero.
    ///
    /// Every figure is rounded from its own exact value, so each displayed
    /// total is within half a cent of the exact one. Rounded lines may
    /// therefore differ from a displayed total by a cent.
    pub fn rounded(&self) -> Statement {
        let payments: Vec<Payment> = self
            .payments
            .iter()
            .map(|payment| Payment {
                amount: round_display(payment.amount),
                ..payment.clone()
            })
            .collect();

        Statement {
            daily_rate: round_display(self.daily_rate),
            accommodation_cost: round_display(self.accommodation_cost),
            consumable_cost: round_display(self.consumable_cost),
            total_expenses: round_display(self.total_expenses),
            total_paid: round_display(self.total_paid),
            balance: round_display(self.balance),
            payments,
            patient_name: self.patient_name.clone(),
            ..*self
        }
    }

    /// Nothing left to pay.
    pub fn is_settled(&self) -> bool {
        self.balance <= Decimal::ZERO
    }

    /// Export the rounded view to JSON. Same figures as [`Statement::to_csv`].
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rounded())
    }

    /// Export to CSV, one row per statement line, using the rounded view.
    pub fn to_csv(&self) -> String {
        let view = self.rounded();
        let mut csv = String::new();

        // Header
        csv.push_str("patient_id,patient_name,line,date,quantity,amount\n");

        let mut push = |line: &str, date: Option<NaiveDate>, quantity: String, amount: Decimal| {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                view.patient_id,
                escape_csv(&view.patient_name),
                escape_csv(line),
                date.map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                quantity,
                format_amount(amount),
            ));
        };

        push(
            "accommodation",
            Some(view.admission_date),
            view.elapsed_days.to_string(),
            view.accommodation_cost,
        );
        push(
            "consumables",
            Some(view.admission_date),
            (i64::from(view.daily_units) * view.elapsed_days).to_string(),
            view.consumable_cost,
        );
        push("total_expenses", None, String::new(), view.total_expenses);

        for payment in &view.payments {
            let line = match &payment.notes {
                Some(notes) => format!("payment: {}", notes),
                None => "payment".to_string(),
            };
            push(&line, Some(payment.payment_date), String::new(), payment.amount);
        }

        push("total_paid", None, String::new(), view.total_paid);
        push("balance", Some(view.computed_on), String::new(), view.balance);

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_statement() -> Statement {
        let payments = vec![
            Payment {
                id: 2,
                patient_id: 1,
                amount: Decimal::new(100005, 3),
                payment_date: date(2024, 1, 3),
                notes: Some("cash, front desk".into()),
                created_at: String::new(),
            },
            Payment {
                id: 1,
                patient_id: 1,
                amount: Decimal::new(50005, 3),
                payment_date: date(2024, 1, 2),
                notes: None,
                created_at: String::new(),
            },
        ];
        let accommodation_cost = Decimal::new(333335, 3);
        let consumable_cost = Decimal::new(66665, 3);
        let total_expenses = accommodation_cost + consumable_cost;
        let total_paid = Decimal::new(150010, 3);

        Statement {
            patient_id: 1,
            patient_name: "Omar".into(),
            department: Department::Detox,
            daily_rate: Decimal::new(66667, 3),
            daily_units: 3,
            admission_date: date(2024, 1, 1),
            discharge_date: None,
            elapsed_days: 5,
            accommodation_cost,
            consumable_cost,
            total_expenses,
            payments,
            total_paid,
            balance: total_expenses - total_paid,
            computed_on: date(2024, 1, 5),
        }
    }

    #[test]
    fn test_rounded_totals_come_from_exact_totals() {
        let statement = make_statement();
        let view = statement.rounded();

        assert_eq!(view.accommodation_cost, Decimal::new(33334, 2));
        assert_eq!(view.consumable_cost, Decimal::new(6667, 2));
        // 400.000 exactly, not 333.34 + 66.67
        assert_eq!(view.total_expenses, Decimal::new(40000, 2));
        assert_eq!(view.payments[0].amount, Decimal::new(10001, 2));
        assert_eq!(view.payments[1].amount, Decimal::new(5001, 2));
        assert_eq!(view.total_paid, Decimal::new(15001, 2));
        assert_eq!(view.balance, Decimal::new(24999, 2));

        let half_cent = Decimal::new(5, 3);
        for (shown, exact) in [
            (view.total_expenses, statement.total_expenses),
            (view.total_paid, statement.total_paid),
            (view.balance, statement.balance),
        ] {
            assert!((shown - exact).abs() <= half_cent);
        }
    }

    #[test]
    fn test_rounding_the_view_is_stable() {
        let view = make_statement().rounded();
        assert_eq!(view.rounded(), view);
    }

    #[test]
    fn test_is_settled() {
        let mut statement = make_statement();
        assert!(!statement.is_settled());
        statement.balance = Decimal::ZERO;
        assert!(statement.is_settled());
    }

    #[test]
    fn test_statement_json() {
        let json = make_statement().to_json().unwrap();
        assert!(json.contains("\"patient_name\": \"Omar\""));
        assert!(json.contains("2024-01-05"));
    }

    #[test]
    fn test_json_carries_the_rounded_view() {
        let statement = make_statement();
        let parsed: Statement = serde_json::from_str(&statement.to_json().unwrap()).unwrap();
        assert_eq!(parsed, statement.rounded());
    }

    #[test]
    fn test_statement_csv() {
        let csv = make_statement().to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        // Header + accommodation, consumables, total, 2 payments, paid, balance
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("patient_id"));
        assert_eq!(lines[1], "1,Omar,accommodation,2024-01-01,5,333.34");
        assert_eq!(lines[2], "1,Omar,consumables,2024-01-01,15,66.67");
        assert_eq!(lines[3], "1,Omar,total_expenses,,,400.00");
        assert!(lines[4].contains("\"payment: cash, front desk\""));
        assert_eq!(lines[6], "1,Omar,total_paid,,,150.01");
        assert_eq!(lines[7], "1,Omar,balance,2024-01-05,,249.99");
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }
}
