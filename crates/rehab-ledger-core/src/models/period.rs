//! Reporting periods.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A reporting window. Day and range bounds are inclusive; months and years
/// are calendar buckets, never rolling windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Day { date: NaiveDate },
    Range { start: NaiveDate, end: NaiveDate },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl Period {
    pub fn day(date: NaiveDate) -> Self {
        Period::Day { date }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Period::Range { start, end }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Period::Month { year, month }
    }

    pub fn year(year: i32) -> Self {
        Period::Year { year }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Short human label, e.g. `2024-01`, `2024-01-01..2024-01-07`.
    pub fn label(&self) -> String {
        match self {
            Period::Day { date } => date.format("%Y-%m-%d").to_string(),
            Period::Range { start, end } => {
                format!("{}..{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
            }
            Period::Month { year, month } => format!("{:04}-{:02}", year, month),
            Period::Year { year } => format!("{:04}", year),
        }
    }

    /// Whether the period is well formed (range ordered, month in 1..=12).
    pub fn is_valid(&self) -> bool {
        match self {
            Period::Range { start, end } => start <= end,
            Period::Month { month, .. } => (1..=12).contains(month),
            _ => true,
        }
    }
}
