//! Persistence boundary for per-owner sales history.
//!
//! The durable store is an external collaborator. [`SalesStore`] is the
//! contract it must meet: a batch upsert is all-or-nothing, and a record
//! replaces any earlier record with the same id wholesale.

use crate::error::{Result, SalesHistoryError};
use crate::schema::{DailySales, OwnerId};
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

pub trait SalesStore: Send + Sync {
    /// Every record for the owner, in any order.
    fn load_all(&self, owner: &OwnerId) -> Result<Vec<DailySales>>;

    /// Atomically writes the batch, returning the number of records written.
    fn upsert_batch(&self, owner: &OwnerId, records: &[DailySales]) -> Result<usize>;
}

/// Reference [`SalesStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemorySalesStore {
    owners: RwLock<HashMap<OwnerId, BTreeMap<String, DailySales>>>,
}

impl InMemorySalesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The owner's records as a JSON array ordered by id.
    pub fn export_json(&self, owner: &OwnerId) -> Result<String> {
        let records = self.load_all(owner)?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Loads a JSON array produced by [`Self::export_json`] as one batch.
    ///
    /// Every record is rebuilt from its date and slot figures, so derived
    /// fields are recomputed. The whole batch is rejected if any record has
    /// no sales, a negative or non-finite figure, or an id that is not its
    /// date.
    pub fn import_json(&self, owner: &OwnerId, json: &str) -> Result<usize> {
        let imported: Vec<DailySales> = serde_json::from_str(json)?;
        let records = imported
            .iter()
            .map(rebuild_record)
            .collect::<Result<Vec<_>>>()?;
        self.upsert_batch(owner, &records)
    }
}

fn rebuild_record(record: &DailySales) -> Result<DailySales> {
    if record
        .sales
        .iter()
        .any(|value| !value.is_finite() || *value < 0.0)
    {
        return Err(SalesHistoryError::InvalidRecord(format!(
            "{} has a negative or non-finite slot figure",
            record.id
        )));
    }

    let rebuilt = DailySales::new(record.calendar_date(), record.sales).ok_or_else(|| {
        SalesHistoryError::InvalidRecord(format!("{} has no sales", record.id))
    })?;

    if rebuilt.id != record.id {
        return Err(SalesHistoryError::InvalidRecord(format!(
            "id {} does not match its date {}",
            record.id, rebuilt.id
        )));
    }
    Ok(rebuilt)
}

impl SalesStore for InMemorySalesStore {
    fn load_all(&self, owner: &OwnerId) -> Result<Vec<DailySales>> {
        let owners = self
            .owners
            .read()
            .map_err(|e| SalesHistoryError::StoreUnavailable(e.to_string()))?;

        Ok(owners
            .get(owner)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn upsert_batch(&self, owner: &OwnerId, records: &[DailySales]) -> Result<usize> {
        let mut owners = self
            .owners
            .write()
            .map_err(|e| SalesHistoryError::StoreUnavailable(e.to_string()))?;

        let stored = owners.entry(owner.clone()).or_default();
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }

        info!("Saved {} records for owner {}", records.len(), owner);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_grid::SLOT_COUNT;
    use chrono::NaiveDate;

    fn record(y: i32, m: u32, d: u32, first_slot: f64) -> DailySales {
        let mut sales = [0.0; SLOT_COUNT];
        sales[0] = first_slot;
        DailySales::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), sales).unwrap()
    }

    #[test]
    fn test_upsert_replaces_wholesale() {
        let store = InMemorySalesStore::new();
        let owner = OwnerId::new("user-1");

        store
            .upsert_batch(&owner, &[record(2024, 3, 1, 10.0), record(2024, 3, 2, 5.0)])
            .unwrap();
        store.upsert_batch(&owner, &[record(2024, 3, 1, 99.0)]).unwrap();

        let all = store.load_all(&owner).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "2024-03-01");
        assert_eq!(all[0].total_sales, 99.0);
    }

    #[test]
    fn test_owners_are_isolated() {
        let store = InMemorySalesStore::new();
        store
            .upsert_batch(&OwnerId::new("a"), &[record(2024, 3, 1, 10.0)])
            .unwrap();

        assert!(store.load_all(&OwnerId::new("b")).unwrap().is_empty());
    }

    #[test]
    fn test_json_export_import() {
        let store = InMemorySalesStore::new();
        let owner = OwnerId::new("a");
        store.upsert_batch(&owner, &[record(2024, 3, 1, 10.0)]).unwrap();

        let json = store.export_json(&owner).unwrap();
        let copy = InMemorySalesStore::new();
        assert_eq!(copy.import_json(&owner, &json).unwrap(), 1);
        assert_eq!(copy.load_all(&owner).unwrap(), store.load_all(&owner).unwrap());

        assert!(copy.import_json(&owner, "{").is_err());
    }

    fn record_json(id: &str, date: &str, day_of_week: &str, sales: &[f64], total: f64) -> String {
        let mut slots = vec![0.0; SLOT_COUNT];
        slots[..sales.len()].copy_from_slice(sales);
        serde_json::json!([{
            "id": id,
            "date": date,
            "dayOfWeek": day_of_week,
            "sales": slots,
            "totalSales": total,
        }])
        .to_string()
    }

    #[test]
    fn test_import_rejects_inconsistent_records() {
        let store = InMemorySalesStore::new();
        let owner = OwnerId::new("a");

        let empty_day = record_json("2024-03-01", "2024-03-05T00:00:00Z", "Sunday", &[], 0.0);
        assert!(matches!(
            store.import_json(&owner, &empty_day),
            Err(SalesHistoryError::InvalidRecord(_))
        ));

        let wrong_id = record_json("2024-03-01", "2024-03-05T00:00:00Z", "Tuesday", &[5.0], 5.0);
        assert!(matches!(
            store.import_json(&owner, &wrong_id),
            Err(SalesHistoryError::InvalidRecord(_))
        ));

        let negative = record_json("2024-03-05", "2024-03-05T00:00:00Z", "Tuesday", &[5.0, -1.0], 4.0);
        assert!(matches!(
            store.import_json(&owner, &negative),
            Err(SalesHistoryError::InvalidRecord(_))
        ));

        assert!(store.load_all(&owner).unwrap().is_empty());
    }

    #[test]
    fn test_import_recomputes_derived_fields() {
        let store = InMemorySalesStore::new();
        let owner = OwnerId::new("a");

        let stale = record_json("2024-03-05", "2024-03-05T00:00:00Z", "Sunday", &[5.0, 2.5], 99.0);
        assert_eq!(store.import_json(&owner, &stale).unwrap(), 1);

        let stored = store.load_all(&owner).unwrap();
        assert_eq!(stored[0].day_of_week, "Tuesday");
        assert!((stored[0].total_sales - 7.5).abs() < 1e-9);
    }
}
