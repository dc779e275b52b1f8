//! Patient database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{decode_amount, require_positive, require_text, Database, DbError, DbResult};
use crate::models::{
    ConsumableAllowance, Department, NewPatient, Patient, PatientStatus, PatientUpdate,
};

const SELECT_PATIENTS: &str = r#"
    SELECT id, name, family_phone, admission_date, department, daily_rate,
           receives_consumables, consumable_units, status, discharge_date, created_at
    FROM patients
"#;

impl Database {
    /// Admit a new patient. The patient starts active with no discharge date.
    ///
    /// `today` is the admitting clock's date; admissions dated after it are
    /// rejected so every active patient has at least one billable day.
    pub fn insert_patient(&self, new: &NewPatient, today: NaiveDate) -> DbResult<Patient> {
        require_text("patient name", &new.name)?;
        require_positive("daily rate", new.daily_rate)?;
        if new.admission_date > today {
            return Err(DbError::Constraint(format!(
                "admission date {} is after today ({})",
                new.admission_date, today
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO patients (
                name, family_phone, admission_date, department, daily_rate,
                receives_consumables, consumable_units, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active')
            "#,
            params![
                new.name.trim(),
                new.family_phone,
                new.admission_date,
                new.department.as_str(),
                new.daily_rate.to_string(),
                new.allowance.is_enabled(),
                new.allowance.daily_units(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(patient_id = id, department = new.department.as_str(), "Admitted patient");

        self.get_patient(id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", id)))
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_PATIENTS),
                [id],
                read_patient_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// List patients, newest first, optionally filtered by status.
    pub fn list_patients(&self, status: Option<PatientStatus>) -> DbResult<Vec<Patient>> {
        let rows = match status {
            Some(status) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{} WHERE status = ? ORDER BY id DESC", SELECT_PATIENTS))?;
                let rows = stmt.query_map([status.as_str()], read_patient_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{} ORDER BY id DESC", SELECT_PATIENTS))?;
                let rows = stmt.query_map([], read_patient_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        rows.into_iter().map(Patient::try_from).collect()
    }

    /// Search patients by name (prefix match). `%` and `_` in the query match
    /// themselves.
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", escape_like(query.trim()));
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE name LIKE ? ESCAPE '\\' ORDER BY name LIMIT ?",
            SELECT_PATIENTS
        ))?;

        let rows = stmt
            .query_map(params![pattern, limit as i64], read_patient_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Patient::try_from).collect()
    }

    /// Update the editable fields of a patient in one statement.
    pub fn update_patient(&self, id: i64, update: &PatientUpdate) -> DbResult<bool> {
        require_text("patient name", &update.name)?;
        require_positive("daily rate", update.daily_rate)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                family_phone = ?3,
                department = ?4,
                daily_rate = ?5,
                receives_consumables = ?6,
                consumable_units = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                update.name.trim(),
                update.family_phone,
                update.department.as_str(),
                update.daily_rate.to_string(),
                update.allowance.is_enabled(),
                update.allowance.daily_units(),
            ],
        )?;

        if rows_affected > 0 {
            tracing::info!(patient_id = id, "Updated patient");
        }
        Ok(rows_affected > 0)
    }

    /// Enable, change or disable a patient's consumable allowance.
    ///
    /// Flag and count are written by the same statement, so no reader can
    /// observe one without the other.
    pub fn set_consumable_allowance(
        &self,
        id: i64,
        allowance: ConsumableAllowance,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET receives_consumables = ?2, consumable_units = ?3 WHERE id = ?1",
            params![id, allowance.is_enabled(), allowance.daily_units()],
        )?;

        if rows_affected > 0 {
            tracing::info!(
                patient_id = id,
                enabled = allowance.is_enabled(),
                daily_units = allowance.daily_units(),
                "Changed consumable allowance"
            );
        }
        Ok(rows_affected > 0)
    }

    /// Discharge an active patient on `date`.
    ///
    /// Status and discharge date are set together. Discharging twice, or
    /// before the admission date, is rejected.
    pub fn discharge_patient(&self, id: i64, date: NaiveDate) -> DbResult<Patient> {
        let patient = self
            .get_patient(id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", id)))?;

        if !patient.is_active() {
            return Err(DbError::Constraint(format!(
                "patient {} is already discharged",
                id
            )));
        }
        if date < patient.admission_date {
            return Err(DbError::Constraint(format!(
                "discharge date {} precedes admission date {}",
                date, patient.admission_date
            )));
        }

        self.conn.execute(
            "UPDATE patients SET status = 'discharged', discharge_date = ?2 WHERE id = ?1 AND status = 'active'",
            params![id, date],
        )?;
        tracing::info!(patient_id = id, %date, "Discharged patient");

        self.get_patient(id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", id)))
    }

    /// Count patients in a given status.
    pub fn count_patients(&self, status: PatientStatus) -> DbResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE status = ?",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Combined daily units for active patients with an enabled allowance.
    pub fn total_daily_consumables(&self) -> DbResult<u32> {
        let total: u32 = self.conn.query_row(
            r#"
            SELECT COALESCE(SUM(consumable_units), 0)
            FROM patients
            WHERE status = 'active' AND receives_consumables = 1
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn read_patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        family_phone: row.get(2)?,
        admission_date: row.get(3)?,
        department: row.get(4)?,
        daily_rate: row.get(5)?,
        receives_consumables: row.get(6)?,
        consumable_units: row.get(7)?,
        status: row.get(8)?,
        discharge_date: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    name: String,
    family_phone: Option<String>,
    admission_date: NaiveDate,
    department: String,
    daily_rate: String,
    receives_consumables: bool,
    consumable_units: u32,
    status: String,
    discharge_date: Option<NaiveDate>,
    created_at: String,
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let department = Department::parse(&row.department).ok_or_else(|| {
            DbError::InvalidData(format!("Unknown department: {}", row.department))
        })?;
        let status = PatientStatus::parse(&row.status)
            .ok_or_else(|| DbError::InvalidData(format!("Unknown patient status: {}", row.status)))?;

        Ok(Patient {
            id: row.id,
            name: row.name,
            family_phone: row.family_phone,
            admission_date: row.admission_date,
            department,
            daily_rate: decode_amount("daily_rate", &row.daily_rate)?,
            allowance: ConsumableAllowance::from_parts(
                row.receives_consumables,
                row.consumable_units,
            ),
            status,
            discharge_date: row.discharge_date,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admit(db: &Database, name: &str) -> Patient {
        db.insert_patient(
            &NewPatient::new(name, date(2024, 1, 1), Department::Detox, Decimal::from(100)),
            date(2024, 12, 31),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let new = NewPatient::new("Omar", date(2024, 1, 1), Department::Recovery, Decimal::new(15050, 2))
            .with_family_phone("0100000000")
            .with_allowance(ConsumableAllowance::daily(10));
        let patient = db.insert_patient(&new, date(2024, 12, 31)).unwrap();

        let retrieved = db.get_patient(patient.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Omar");
        assert_eq!(retrieved.family_phone, Some("0100000000".into()));
        assert_eq!(retrieved.department, Department::Recovery);
        assert_eq!(retrieved.daily_rate, Decimal::new(15050, 2));
        assert_eq!(retrieved.allowance, ConsumableAllowance::daily(10));
        assert_eq!(retrieved.status, PatientStatus::Active);
        assert_eq!(retrieved.discharge_date, None);
    }

    #[test]
    fn test_get_missing_patient() {
        let db = setup_db();
        assert!(db.get_patient(42).unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_blank_name_and_bad_rate() {
        let db = setup_db();

        let blank = NewPatient::new("  ", date(2024, 1, 1), Department::Detox, Decimal::from(100));
        let result = db.insert_patient(&blank, date(2024, 12, 31));
        assert!(matches!(result, Err(DbError::Constraint(_))));

        let free = NewPatient::new("Ali", date(2024, 1, 1), Department::Detox, Decimal::ZERO);
        let result = db.insert_patient(&free, date(2024, 12, 31));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_insert_rejects_future_admission() {
        let db = setup_db();
        let early = NewPatient::new("Fady", date(2024, 1, 11), Department::Detox, Decimal::from(100));

        let result = db.insert_patient(&early, date(2024, 1, 10));
        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert!(db.list_patients(None).unwrap().is_empty());

        // Admitted today is one billable day, so it is accepted
        let patient = db.insert_patient(&early, date(2024, 1, 11)).unwrap();
        assert_eq!(patient.admission_date, date(2024, 1, 11));
    }

    #[test]
    fn test_ids_are_assigned_in_order() {
        let db = setup_db();
        let first = admit(&db, "Ali");
        let second = admit(&db, "Bassem");
        assert!(second.id > first.id);

        let listed = db.list_patients(None).unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();
        let patient = admit(&db, "Karim");

        let mut update = PatientUpdate::from(&patient);
        update.name = "Karim Adel".into();
        update.daily_rate = Decimal::from(120);
        update.department = Department::Recovery;
        assert!(db.update_patient(patient.id, &update).unwrap());

        let retrieved = db.get_patient(patient.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Karim Adel");
        assert_eq!(retrieved.daily_rate, Decimal::from(120));
        assert_eq!(retrieved.department, Department::Recovery);
        assert_eq!(retrieved.admission_date, patient.admission_date);
    }

    #[test]
    fn test_update_missing_patient_reports_false() {
        let db = setup_db();
        let update = PatientUpdate {
            name: "Nobody".into(),
            family_phone: None,
            department: Department::Detox,
            daily_rate: Decimal::from(10),
            allowance: ConsumableAllowance::none(),
        };
        assert!(!db.update_patient(99, &update).unwrap());
    }

    #[test]
    fn test_toggle_allowance_off_zeroes_count() {
        let db = setup_db();
        let patient = admit(&db, "Hany");

        db.set_consumable_allowance(patient.id, ConsumableAllowance::daily(25))
            .unwrap();
        let on = db.get_patient(patient.id).unwrap().unwrap();
        assert!(on.allowance.is_enabled());
        assert_eq!(on.allowance.daily_units(), 25);

        db.set_consumable_allowance(patient.id, ConsumableAllowance::none())
            .unwrap();
        let off = db.get_patient(patient.id).unwrap().unwrap();
        assert!(!off.allowance.is_enabled());
        assert_eq!(off.allowance.daily_units(), 0);
    }

    #[test]
    fn test_schema_rejects_half_toggled_row() {
        let db = setup_db();
        let patient = admit(&db, "Sameh");

        let result = db.conn().execute(
            "UPDATE patients SET receives_consumables = 0, consumable_units = 5 WHERE id = ?",
            [patient.id],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_discharge_sets_status_and_date() {
        let db = setup_db();
        let patient = admit(&db, "Tamer");

        let discharged = db.discharge_patient(patient.id, date(2024, 1, 5)).unwrap();
        assert_eq!(discharged.status, PatientStatus::Discharged);
        assert_eq!(discharged.discharge_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_discharge_twice_is_rejected() {
        let db = setup_db();
        let patient = admit(&db, "Tamer");

        db.discharge_patient(patient.id, date(2024, 1, 5)).unwrap();
        let again = db.discharge_patient(patient.id, date(2024, 1, 9));
        assert!(matches!(again, Err(DbError::Constraint(_))));

        let retrieved = db.get_patient(patient.id).unwrap().unwrap();
        assert_eq!(retrieved.discharge_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_discharge_before_admission_is_rejected() {
        let db = setup_db();
        let patient = admit(&db, "Walid");

        let result = db.discharge_patient(patient.id, date(2023, 12, 31));
        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert!(db.get_patient(patient.id).unwrap().unwrap().is_active());
    }

    #[test]
    fn test_discharge_missing_patient() {
        let db = setup_db();
        let result = db.discharge_patient(7, date(2024, 1, 5));
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_list_by_status_and_counts() {
        let db = setup_db();
        let a = admit(&db, "A");
        admit(&db, "B");
        admit(&db, "C");
        db.discharge_patient(a.id, date(2024, 2, 1)).unwrap();

        assert_eq!(db.list_patients(Some(PatientStatus::Active)).unwrap().len(), 2);
        assert_eq!(db.list_patients(Some(PatientStatus::Discharged)).unwrap().len(), 1);
        assert_eq!(db.count_patients(PatientStatus::Active).unwrap(), 2);
        assert_eq!(db.count_patients(PatientStatus::Discharged).unwrap(), 1);
    }

    #[test]
    fn test_search_patients() {
        let db = setup_db();
        admit(&db, "Mahmoud");
        admit(&db, "Mahmoud Ali");
        admit(&db, "Youssef");

        let results = db.search_patients("Mah", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|p| p.name.starts_with("Mahmoud")));
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let db = setup_db();
        admit(&db, "Mahmoud");
        admit(&db, "100% Sober");
        admit(&db, "Nour_Ali");

        assert!(db.search_patients("%", 10).unwrap().is_empty());
        assert!(db.search_patients("_", 10).unwrap().is_empty());

        let percent = db.search_patients("100%", 10).unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% Sober");

        let underscore = db.search_patients("Nour_", 10).unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].name, "Nour_Ali");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_total_daily_consumables_counts_active_enabled_only() {
        let db = setup_db();
        let a = admit(&db, "A");
        let b = admit(&db, "B");
        let c = admit(&db, "C");
        admit(&db, "D");

        db.set_consumable_allowance(a.id, ConsumableAllowance::daily(20)).unwrap();
        db.set_consumable_allowance(b.id, ConsumableAllowance::daily(10)).unwrap();
        db.set_consumable_allowance(c.id, ConsumableAllowance::daily(5)).unwrap();
        db.discharge_patient(c.id, date(2024, 1, 3)).unwrap();

        assert_eq!(db.total_daily_consumables().unwrap(), 30);
    }

    #[test]
    fn test_total_daily_consumables_empty() {
        let db = setup_db();
        assert_eq!(db.total_daily_consumables().unwrap(), 0);
    }
}
