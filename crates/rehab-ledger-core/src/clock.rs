//! Injectable time source.
//!
//! Elapsed-day counts for active patients depend on "today", so every
//! computation that needs it takes a [`Clock`] instead of reading the system
//! time directly.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Clock abstracts access to the current time so billing stays deterministic in tests.
pub trait Clock: Send + Sync {
    /// Current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock. `today` is the facility's local date, not the UTC one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Build from `y-m-d`; `None` if the date doesn't exist.
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.today.and_time(NaiveTime::default()))
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
