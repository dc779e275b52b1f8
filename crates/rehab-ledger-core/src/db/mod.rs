//! Database layer for rehab-ledger.

mod employees;
mod expenses;
mod patients;
mod payments;
mod reports;
mod schema;
mod settings;

#[allow(unused_imports)]
pub use employees::*;
#[allow(unused_imports)]
pub use expenses::*;
#[allow(unused_imports)]
pub use patients::*;
#[allow(unused_imports)]
pub use payments::*;
#[allow(unused_imports)]
pub use reports::*;
pub use schema::*;
#[allow(unused_imports)]
pub use settings::*;

use std::path::Path;

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{parse_amount, DEFAULT_SETTINGS};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self { conn };
        db.initialize()?;
        tracing::info!(path = %path.as_ref().display(), "Opened ledger database");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema and seed default settings that are not present yet.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        for (key, value) in DEFAULT_SETTINGS {
            self.conn.execute(
                "INSERT OR IGNORE INTO settings (setting_key, setting_value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse a TEXT money column.
pub(crate) fn decode_amount(column: &str, raw: &str) -> DbResult<Decimal> {
    parse_amount(raw)
        .ok_or_else(|| DbError::InvalidData(format!("{} is not a decimal: {:?}", column, raw)))
}

/// Reject non-positive amounts before they reach the ledger.
pub(crate) fn require_positive(field: &str, amount: Decimal) -> DbResult<()> {
    if amount <= Decimal::ZERO {
        return Err(DbError::Constraint(format!(
            "{} must be greater than zero, got {}",
            field, amount
        )));
    }
    Ok(())
}

/// Reject blank required text.
pub(crate) fn require_text(field: &str, value: &str) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(DbError::Constraint(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"payments".to_string()));
        assert!(tables.contains(&"expenses".to_string()));
        assert!(tables.contains(&"employees".to_string()));
        assert!(tables.contains(&"employee_transactions".to_string()));
        assert!(tables.contains(&"settings".to_string()));
    }

    #[test]
    fn test_default_settings_seeded() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, DEFAULT_SETTINGS.len() as i64);
    }

    #[test]
    fn test_reopen_keeps_existing_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let db = Database::open(&path).unwrap();
            db.conn()
                .execute(
                    "UPDATE settings SET setting_value = '55' WHERE setting_key = 'consumable_pack_price'",
                    [],
                )
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let value: String = db
            .conn()
            .query_row(
                "SELECT setting_value FROM settings WHERE setting_key = 'consumable_pack_price'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(value, "55");
    }

    #[test]
    fn test_decode_amount() {
        assert_eq!(decode_amount("amount", "12.50").unwrap(), Decimal::new(1250, 2));
        assert!(matches!(
            decode_amount("amount", "n/a"),
            Err(DbError::InvalidData(_))
        ));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("amount", Decimal::ONE).is_ok());
        assert!(matches!(
            require_positive("amount", Decimal::ZERO),
            Err(DbError::Constraint(_))
        ));
    }
}
