//! The in-memory historical dataset and the handle that allows swapping it atomically.

use crate::history::record::HistoricalRecord;
use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An immutable collection of historical observations, grouped by country.
///
/// Country names are matched exactly (case-sensitive). A store never changes after
/// construction; to pick up new data, build a new store and swap it in through a
/// [`StoreHandle`].
#[derive(Debug, Clone, Default)]
pub struct HistoricalStore {
    by_country: HashMap<String, Vec<HistoricalRecord>>,
    len: usize,
}

impl HistoricalStore {
    /// Builds a store from records in any order. Within a country, records keep their
    /// input order.
    pub fn new(records: impl IntoIterator<Item = HistoricalRecord>) -> Self {
        let mut by_country: HashMap<String, Vec<HistoricalRecord>> = HashMap::new();
        let mut len = 0;
        for record in records {
            len += 1;
            by_country
                .entry(record.country.clone())
                .or_default()
                .push(record);
        }
        Self { by_country, len }
    }

    /// All records whose country equals `country` exactly. Empty for unknown countries.
    pub fn records_for(&self, country: &str) -> &[HistoricalRecord] {
        self.by_country
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.by_country.contains_key(country)
    }

    /// Country names in lexicographic order.
    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = self.by_country.keys().map(String::as_str).collect();
        countries.sort_unstable();
        countries
    }

    /// Earliest and latest observation date, or `None` for an empty store.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.iter().map(|r| r.timestamp);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricalRecord> {
        self.by_country.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<HistoricalRecord> for HistoricalStore {
    fn from_iter<I: IntoIterator<Item = HistoricalRecord>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Default)]
struct Current {
    generation: u64,
    store: Arc<HistoricalStore>,
}

/// Shared, swappable reference to the current [`HistoricalStore`].
///
/// Readers take a cheap [`Arc`] snapshot and keep using it for as long as they need;
/// [`StoreHandle::swap`] replaces the whole store in a single pointer write, so a reader
/// sees either the old dataset or the new one, never a mix. Every swap bumps a
/// generation number that identifies which dataset a snapshot came from.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    current: Arc<RwLock<Current>>,
}

impl StoreHandle {
    pub fn new(store: HistoricalStore) -> Self {
        Self {
            current: Arc::new(RwLock::new(Current {
                generation: 0,
                store: Arc::new(store),
            })),
        }
    }

    /// The store as of now. Later swaps do not affect the returned snapshot.
    pub async fn snapshot(&self) -> Arc<HistoricalStore> {
        self.current.read().await.store.clone()
    }

    /// Like [`StoreHandle::snapshot`], together with the generation of the store.
    pub async fn versioned_snapshot(&self) -> (u64, Arc<HistoricalStore>) {
        let current = self.current.read().await;
        (current.generation, current.store.clone())
    }

    /// Installs `store` and returns the one it replaced.
    pub async fn swap(&self, store: HistoricalStore) -> Arc<HistoricalStore> {
        let next = Arc::new(store);
        let (records, countries) = (next.len(), next.by_country.len());
        let (generation, previous) = {
            let mut current = self.current.write().await;
            current.generation += 1;
            (current.generation, std::mem::replace(&mut current.store, next))
        };
        info!(
            "Swapped historical store (generation {}): {} records across {} countries (was {} records)",
            generation,
            records,
            countries,
            previous.len()
        );
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, y: i32, m: u32, d: u32) -> HistoricalRecord {
        HistoricalRecord::builder()
            .country(country)
            .timestamp(NaiveDate::from_ymd_opt(y, m, d).unwrap())
            .temperature_celsius(12.0)
            .build()
    }

    #[test]
    fn groups_records_by_exact_country() {
        let store: HistoricalStore = vec![
            record("Japan", 2024, 7, 7),
            record("japan", 2024, 7, 8),
            record("Japan", 2023, 1, 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.len(), 3);
        assert_eq!(store.records_for("Japan").len(), 2);
        assert_eq!(store.records_for("japan").len(), 1);
        assert!(store.records_for("JAPAN").is_empty());
        assert_eq!(store.countries(), vec!["Japan", "japan"]);
    }

    #[test]
    fn date_range_spans_all_countries() {
        let store = HistoricalStore::new(vec![
            record("Chile", 2024, 5, 1),
            record("Peru", 2022, 3, 9),
            record("Chile", 2025, 1, 2),
        ]);
        assert_eq!(
            store.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2022, 3, 9).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
            ))
        );
        assert_eq!(HistoricalStore::default().date_range(), None);
    }

    #[tokio::test]
    async fn swap_does_not_affect_existing_snapshots() {
        let handle = StoreHandle::new(HistoricalStore::new(vec![record("Chile", 2024, 5, 1)]));
        let before = handle.snapshot().await;

        let previous = handle
            .swap(HistoricalStore::new(vec![
                record("Peru", 2024, 5, 1),
                record("Peru", 2024, 5, 2),
            ]))
            .await;

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(handle.versioned_snapshot().await.0, 1);
        assert!(before.contains_country("Chile"));
        let after = handle.snapshot().await;
        assert!(!after.contains_country("Chile"));
        assert_eq!(after.records_for("Peru").len(), 2);
    }
}
