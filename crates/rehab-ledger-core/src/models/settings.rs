//! Pricing settings snapshot.
//!
//! Settings live in the `settings` table as string values. The billing engine
//! never reads the table itself; callers take a [`PricingSettings`] snapshot
//! and pass it in. Every statement prices the whole stay at the snapshot's
//! current pack price, so a price change applies retroactively to all
//! unbilled days of every active patient.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::parse_amount;

/// Retail price of one consumable pack.
pub const PACK_PRICE_KEY: &str = "consumable_pack_price";
/// Purchase cost of one pack. Tracked, not used in balances.
pub const PACK_COST_KEY: &str = "consumable_pack_cost";
/// Units (cigarettes) per pack.
pub const UNITS_PER_PACK_KEY: &str = "consumable_units_per_pack";

pub const DEFAULT_PACK_PRICE: i64 = 40;
pub const DEFAULT_PACK_COST: i64 = 40;
pub const DEFAULT_UNITS_PER_PACK: u32 = 20;

/// Values seeded into a fresh database.
pub const DEFAULT_SETTINGS: [(&str, &str); 3] = [
    (PACK_PRICE_KEY, "40"),
    (PACK_COST_KEY, "40"),
    (UNITS_PER_PACK_KEY, "20"),
];

/// A raw settings row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

/// The consumable pricing in effect at computation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricingSettings {
    pub pack_price: Decimal,
    pub pack_cost: Decimal,
    pub units_per_pack: u32,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            pack_price: Decimal::from(DEFAULT_PACK_PRICE),
            pack_cost: Decimal::from(DEFAULT_PACK_COST),
            units_per_pack: DEFAULT_UNITS_PER_PACK,
        }
    }
}

impl PricingSettings {
    /// Build a snapshot from a key lookup.
    ///
    /// Absent keys take their default. Values that don't parse fall back to
    /// the default as well and are reported with a warning.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let pack_price = lookup(PACK_PRICE_KEY)
            .map(|raw| parse_price(PACK_PRICE_KEY, &raw, defaults.pack_price))
            .unwrap_or(defaults.pack_price);
        let pack_cost = lookup(PACK_COST_KEY)
            .map(|raw| parse_price(PACK_COST_KEY, &raw, defaults.pack_cost))
            .unwrap_or(defaults.pack_cost);
        let units_per_pack = lookup(UNITS_PER_PACK_KEY)
            .map(|raw| parse_units(&raw, defaults.units_per_pack))
            .unwrap_or(defaults.units_per_pack);

        Self {
            pack_price,
            pack_cost,
            units_per_pack,
        }
    }

    /// Price of a single unit (`pack_price / units_per_pack`).
    pub fn unit_price(&self) -> Decimal {
        self.pack_price / Decimal::from(self.units_per_pack)
    }

    /// Packs needed for `units` (fractional).
    pub fn packs_for(&self, units: u32) -> Decimal {
        Decimal::from(units) / Decimal::from(self.units_per_pack)
    }

    /// Cost of `units` per day over `days` days, or `None` if it doesn't fit
    /// in a `Decimal`.
    ///
    /// Multiplies before dividing so whole-pack prices stay exact.
    pub fn cost_of(&self, units: u32, days: i64) -> Option<Decimal> {
        Decimal::from(units)
            .checked_mul(Decimal::from(days))?
            .checked_mul(self.pack_price)?
            .checked_div(Decimal::from(self.units_per_pack))
    }
}

fn parse_price(key: &str, raw: &str, fallback: Decimal) -> Decimal {
    match parse_amount(raw) {
        Some(value) => value,
        None => {
            tracing::warn!(key, value = raw, %fallback, "Malformed setting, using default");
            fallback
        }
    }
}

fn parse_units(raw: &str, fallback: u32) -> u32 {
    // Stored values may carry a fractional part ("20.0"); only whole,
    // positive counts are usable as a divisor.
    let parsed = parse_amount(raw)
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_u32())
        .filter(|units| *units > 0);

    match parsed {
        Some(units) => units,
        None => {
            tracing::warn!(
                key = UNITS_PER_PACK_KEY,
                value = raw,
                fallback,
                "Malformed setting, using default"
            );
            fallback
        }
    }
}

/// Financial impact of changing the pack price, computed before the write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceChangeImpact {
    pub old_price: Decimal,
    pub new_price: Decimal,
    /// new - old
    pub price_difference: Decimal,
    /// Active patients with an enabled allowance
    pub affected_patients: u32,
    /// Their combined daily units
    pub daily_units: u32,
    /// Change in the facility's daily consumable cost
    pub daily_cost_difference: Decimal,
}
