//! Memoization of prediction summaries for repeated requests.

use crate::prediction::summary::PredictionSummary;
use chrono::{Local, NaiveDate};
use log::debug;
use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::Mutex;

/// Identifies one prediction request: country, target date and kernel bandwidth, plus
/// the generation of the historical store it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionKey {
    country: String,
    date: NaiveDate,
    sigma_bits: u64,
    generation: u64,
}

impl PredictionKey {
    pub fn new(country: &str, date: NaiveDate, sigma_days: f64) -> Self {
        Self {
            country: country.to_string(),
            date,
            sigma_bits: sigma_days.to_bits(),
            generation: 0,
        }
    }

    /// Ties the key to a store generation, see [`StoreHandle`](crate::StoreHandle).
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

struct CachedSummary {
    computed_on: NaiveDate,
    summary: PredictionSummary,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PredictionKey, CachedSummary>,
    /// Day of the last sweep over all entries.
    swept_on: Option<NaiveDate>,
}

impl CacheState {
    /// Drops entries computed before `today`, at most once per day.
    fn sweep_if_new_day(&mut self, today: NaiveDate) {
        if self.swept_on.is_some_and(|day| day >= today) {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.computed_on >= today);
        self.swept_on = Some(today);
        if before > self.entries.len() {
            debug!(
                "Evicted {} prediction cache entries from earlier days",
                before - self.entries.len()
            );
        }
    }
}

/// Cache of prediction summaries that expires at the end of the calendar day.
///
/// An entry is only served on the (local) calendar day it was computed. The first insert
/// of a new day drops every entry from earlier days, so the cache never holds more than
/// one day of summaries for long. [`PredictionCache::evict_expired`] does the same on
/// demand.
#[derive(Default)]
pub struct PredictionCache {
    state: Mutex<CacheState>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached summary for `key`, or computes and caches it.
    ///
    /// `compute` runs without holding the lock. If another task inserted the same key in
    /// the meantime, its summary wins and is returned instead. Errors are not cached.
    pub async fn get_or_compute<E>(
        &self,
        key: PredictionKey,
        compute: impl FnOnce() -> Result<PredictionSummary, E>,
    ) -> Result<PredictionSummary, E> {
        self.get_or_compute_on(key, today(), compute).await
    }

    async fn get_or_compute_on<E>(
        &self,
        key: PredictionKey,
        today: NaiveDate,
        compute: impl FnOnce() -> Result<PredictionSummary, E>,
    ) -> Result<PredictionSummary, E> {
        // --- Fast path: a summary computed today ---
        {
            let mut state = self.state.lock().await;
            if let Some(cached) = state.entries.get(&key) {
                if cached.computed_on == today {
                    debug!("Prediction cache hit for {:?}", key);
                    return Ok(cached.summary.clone());
                }
                state.entries.remove(&key);
            }
        }

        // --- Slow path: compute outside the lock ---
        debug!("Prediction cache miss for {:?}", key);
        let summary = compute()?;

        let mut state = self.state.lock().await;
        state.sweep_if_new_day(today);
        match state.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                // Another task got here first; keep its summary unless it is stale.
                if entry.get().computed_on != today {
                    entry.insert(CachedSummary {
                        computed_on: today,
                        summary: summary.clone(),
                    });
                }
                Ok(entry.get().summary.clone())
            }
            Entry::Vacant(entry) => {
                entry.insert(CachedSummary {
                    computed_on: today,
                    summary: summary.clone(),
                });
                Ok(summary)
            }
        }
    }

    /// Drops every entry computed before today. Returns how many were dropped.
    pub async fn evict_expired(&self) -> usize {
        self.evict_before(today()).await
    }

    async fn evict_before(&self, today: NaiveDate) -> usize {
        let mut state = self.state.lock().await;
        let before = state.entries.len();
        state.entries.retain(|_, cached| cached.computed_on >= today);
        before - state.entries.len()
    }

    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::record::HistoricalRecord;
    use crate::history::store::HistoricalStore;
    use crate::prediction::error::PredictionError;
    use crate::prediction::predictor::predict;
    use std::cell::Cell;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> HistoricalStore {
        HistoricalStore::new(vec![HistoricalRecord::builder()
            .country("Chile")
            .timestamp(date(2023, 5, 1))
            .temperature_celsius(14.0)
            .build()])
    }

    #[tokio::test]
    async fn second_request_on_the_same_day_is_served_from_cache(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let cache = PredictionCache::new();
        let store = store();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            predict(&store, "Chile", date(2025, 5, 1), 15.0)
        };

        let key = PredictionKey::new("Chile", date(2025, 5, 1), 15.0);
        let today = date(2025, 1, 1);
        let first = cache.get_or_compute_on(key.clone(), today, compute).await?;
        let second = cache.get_or_compute_on(key, today, compute).await?;

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn bandwidth_is_part_of_the_key() -> Result<(), Box<dyn std::error::Error>> {
        let cache = PredictionCache::new();
        let store = store();
        let today = date(2025, 1, 1);
        for sigma in [15.0, 30.0] {
            let key = PredictionKey::new("Chile", date(2025, 5, 1), sigma);
            cache
                .get_or_compute_on(key, today, || {
                    predict(&store, "Chile", date(2025, 5, 1), sigma)
                })
                .await?;
        }
        assert_eq!(cache.len().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn entries_expire_with_the_calendar_day() -> Result<(), Box<dyn std::error::Error>> {
        let cache = PredictionCache::new();
        let store = store();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            predict(&store, "Chile", date(2025, 5, 1), 15.0)
        };
        let key = PredictionKey::new("Chile", date(2025, 5, 1), 15.0);

        cache.get_or_compute_on(key.clone(), date(2025, 1, 1), compute).await?;
        cache.get_or_compute_on(key.clone(), date(2025, 1, 2), compute).await?;
        assert_eq!(calls.get(), 2);

        let other = PredictionKey::new("Chile", date(2025, 6, 1), 15.0);
        cache
            .get_or_compute_on(other, date(2025, 1, 1), || {
                predict(&store, "Chile", date(2025, 6, 1), 15.0)
            })
            .await?;
        assert_eq!(cache.evict_before(date(2025, 1, 2)).await, 1);
        assert_eq!(cache.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn first_insert_of_a_new_day_drops_earlier_entries(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let cache = PredictionCache::new();
        let store = store();
        for (month, today) in [(5, date(2025, 1, 1)), (6, date(2025, 1, 1))] {
            let key = PredictionKey::new("Chile", date(2025, month, 1), 15.0);
            cache
                .get_or_compute_on(key, today, || {
                    predict(&store, "Chile", date(2025, month, 1), 15.0)
                })
                .await?;
        }
        assert_eq!(cache.len().await, 2);

        let key = PredictionKey::new("Chile", date(2025, 7, 1), 15.0);
        cache
            .get_or_compute_on(key, date(2025, 1, 2), || {
                predict(&store, "Chile", date(2025, 7, 1), 15.0)
            })
            .await?;
        assert_eq!(cache.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = PredictionCache::new();
        let store = store();
        let key = PredictionKey::new("Atlantis", date(2025, 5, 1), 15.0);
        let result = cache
            .get_or_compute(key, || predict(&store, "Atlantis", date(2025, 5, 1), 15.0))
            .await;
        assert!(matches!(result, Err(PredictionError::UnknownCountry { .. })));
        assert!(cache.is_empty().await);
    }
}
