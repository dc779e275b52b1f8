//! Consumable usage overview.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Patient, PricingSettings};

/// One active patient's daily consumption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumerLine {
    pub patient_id: i64,
    pub patient_name: String,
    pub daily_units: u32,
    pub packs_per_day: Decimal,
    /// At the current retail pack price
    pub daily_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumablesOverview {
    pub pack_price: Decimal,
    pub pack_cost: Decimal,
    pub units_per_pack: u32,
    pub patients: Vec<ConsumerLine>,
    pub total_units: u32,
    pub total_packs: Decimal,
    /// Charged to patients per day
    pub total_daily_cost: Decimal,
    /// Paid by the facility per day, at `pack_cost`
    pub total_daily_purchase_cost: Decimal,
}

impl ConsumablesOverview {
    /// `None` if a cost leaves the `Decimal` range.
    pub(crate) fn build<I>(settings: &PricingSettings, consumers: I) -> Option<Self>
    where
        I: IntoIterator<Item = Patient>,
    {
        let patients: Vec<ConsumerLine> = consumers
            .into_iter()
            .map(|patient| {
                let units = patient.allowance.daily_units();
                Some(ConsumerLine {
                    daily_cost: settings.cost_of(units, 1)?,
                    patient_id: patient.id,
                    patient_name: patient.name,
                    daily_units: units,
                    packs_per_day: settings.packs_for(units),
                })
            })
            .collect::<Option<_>>()?;

        let total_units = patients
            .iter()
            .try_fold(0u32, |acc, line| acc.checked_add(line.daily_units))?;
        let total_packs = settings.packs_for(total_units);

        Some(Self {
            pack_price: settings.pack_price,
            pack_cost: settings.pack_cost,
            units_per_pack: settings.units_per_pack,
            total_daily_cost: settings.cost_of(total_units, 1)?,
            total_daily_purchase_cost: total_packs.checked_mul(settings.pack_cost)?,
            total_units,
            total_packs,
            patients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{ConsumableAllowance, Department, NewPatient, PACK_COST_KEY};
    use crate::reports::ReportService;
    use chrono::NaiveDate;

    #[test]
    fn test_overview_only_counts_active_consumers() {
        let db = Database::open_in_memory().unwrap();
        let admission = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let admit = |name: &str, allowance: ConsumableAllowance| {
            db.insert_patient(
                &NewPatient::new(name, admission, Department::Detox, Decimal::from(100))
                    .with_allowance(allowance),
                admission,
            )
            .unwrap()
        };

        admit("Smoker", ConsumableAllowance::daily(30));
        admit("Non-smoker", ConsumableAllowance::none());
        let gone = admit("Discharged", ConsumableAllowance::daily(20));
        db.discharge_patient(gone.id, admission).unwrap();
        db.set_setting(PACK_COST_KEY, "30").unwrap();

        let overview = ReportService::new(&db).consumables_overview().unwrap();
        assert_eq!(overview.patients.len(), 1);
        assert_eq!(overview.patients[0].patient_name, "Smoker");
        assert_eq!(overview.patients[0].packs_per_day, Decimal::new(15, 1));
        assert_eq!(overview.patients[0].daily_cost, Decimal::from(60));
        assert_eq!(overview.total_units, 30);
        assert_eq!(overview.total_daily_cost, Decimal::from(60));
        assert_eq!(overview.total_daily_purchase_cost, Decimal::from(45));
    }

    #[test]
    fn test_empty_overview() {
        let overview = ConsumablesOverview::build(&PricingSettings::default(), Vec::new()).unwrap();
        assert!(overview.patients.is_empty());
        assert_eq!(overview.total_packs, Decimal::ZERO);
        assert_eq!(overview.total_daily_cost, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_price_is_reported() {
        let db = Database::open_in_memory().unwrap();
        let admission = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        db.insert_patient(
            &NewPatient::new("Smoker", admission, Department::Detox, Decimal::from(100))
                .with_allowance(ConsumableAllowance::daily(40)),
            admission,
        )
        .unwrap();
        db.set_setting(crate::models::PACK_PRICE_KEY, &Decimal::MAX.to_string())
            .unwrap();

        let result = ReportService::new(&db).consumables_overview();
        assert!(matches!(result, Err(crate::db::DbError::InvalidData(_))));
    }
}
