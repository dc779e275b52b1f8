//! Monetary helpers shared by the ledger, billing and reporting layers.
//!
//! Amounts are `rust_decimal::Decimal` end to end and are stored in SQLite as
//! TEXT so no value ever round-trips through a binary float.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits shown on screen and on printed statements.
pub const DISPLAY_SCALE: u32 = 2;

/// Round an amount to display precision (half away from zero).
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two decimals, e.g. `1234.50`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_display(amount))
}

/// Parse a user or storage supplied amount, tolerating surrounding whitespace.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// Sum amounts exactly. An empty iterator sums to zero; `None` if the total
/// leaves the `Decimal` range.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}
