//! Settings store.
//!
//! A plain key/value table. The store validates nothing; callers check
//! ranges before writing. Reads always return the latest committed value.

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{require_positive, Database, DbError, DbResult};
use crate::models::{PriceChangeImpact, PricingSettings, Setting, PACK_PRICE_KEY};

impl Database {
    /// Get a setting value.
    pub fn get_setting(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT setting_value FROM settings WHERE setting_key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert or overwrite a setting, stamping `updated_at`.
    pub fn set_setting(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO settings (setting_key, setting_value)
            VALUES (?1, ?2)
            ON CONFLICT(setting_key) DO UPDATE SET
                setting_value = excluded.setting_value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        tracing::info!(key, value, "Updated setting");
        Ok(())
    }

    /// All settings rows, ordered by key.
    pub fn list_settings(&self) -> DbResult<Vec<Setting>> {
        let mut stmt = self.conn.prepare(
            "SELECT setting_key, setting_value, updated_at FROM settings ORDER BY setting_key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Setting {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Snapshot of the consumable pricing as currently stored.
    pub fn pricing_settings(&self) -> DbResult<PricingSettings> {
        let stored = self.list_settings()?;
        Ok(PricingSettings::from_lookup(|key| {
            stored
                .iter()
                .find(|setting| setting.key == key)
                .map(|setting| setting.value.clone())
        }))
    }

    /// Change the pack price and report what the change does to the daily
    /// consumable bill of currently active patients.
    pub fn update_pack_price(&self, new_price: Decimal) -> DbResult<PriceChangeImpact> {
        require_positive("pack price", new_price)?;

        let current = self.pricing_settings()?;
        let (affected_patients, daily_units): (u32, u32) = self.conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(consumable_units), 0)
            FROM patients
            WHERE status = 'active' AND receives_consumables = 1
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let price_difference = new_price.checked_sub(current.pack_price);
        let daily_cost_difference =
            price_difference.and_then(|diff| current.packs_for(daily_units).checked_mul(diff));
        let (Some(price_difference), Some(daily_cost_difference)) =
            (price_difference, daily_cost_difference)
        else {
            return Err(DbError::Constraint(format!("pack price {} is out of range", new_price)));
        };

        let impact = PriceChangeImpact {
            old_price: current.pack_price,
            new_price,
            price_difference,
            affected_patients,
            daily_units,
            daily_cost_difference,
        };

        self.set_setting(PACK_PRICE_KEY, &new_price.to_string())?;
        tracing::info!(
            old_price = %impact.old_price,
            new_price = %impact.new_price,
            affected_patients = impact.affected_patients,
            daily_cost_difference = %impact.daily_cost_difference,
            "Consumable pack price changed"
        );

        Ok(impact)
    }
}
