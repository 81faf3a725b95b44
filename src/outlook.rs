//! The main entry point: a client that owns a historical dataset and answers
//! climatological prediction requests against it.

use crate::error::OutlookError;
use crate::history::columns::ColumnMapping;
use crate::history::loader::HistoryLoader;
use crate::history::store::{HistoricalStore, StoreHandle};
use crate::prediction::kernel::DEFAULT_SIGMA_DAYS;
use crate::prediction::predictor;
use crate::prediction::summary::PredictionSummary;
use crate::prediction_cache::{PredictionCache, PredictionKey};
use crate::types::target_date::TargetDate;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::debug;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Client for climatological weather predictions.
///
/// An `Outlook` holds one [`HistoricalStore`] at a time and memoizes the summaries it
/// computes for the rest of the calendar day. The dataset can be replaced while the client
/// is in use with [`Outlook::reload_csv`] or [`Outlook::reload_url`]; requests running at
/// that moment finish against the dataset they started with.
///
/// Create one with [`Outlook::from_csv`] or [`Outlook::from_url`] to load a dataset
/// straight away, with [`Outlook::from_store`] for records you already have in memory, or
/// with [`Outlook::new`] / [`Outlook::with_cache_folder`] for an empty client to reload
/// into later.
///
/// # Examples
///
/// ```rust,no_run
/// # use seasonal_outlook::{Outlook, OutlookError};
/// # use std::path::Path;
/// # #[tokio::main]
/// # async fn main() -> Result<(), OutlookError> {
/// let outlook = Outlook::from_csv(Path::new("GlobalWeatherRepository.csv"))
///     .call()
///     .await?;
///
/// let summary = outlook.predict("Japan", "2025-07-07").call().await?;
/// println!("{}: {}", summary.country, summary.pred_headline);
/// # Ok(())
/// # }
/// ```
pub struct Outlook {
    loader: HistoryLoader,
    store: StoreHandle,
    cache: PredictionCache,
}

#[bon]
impl Outlook {
    /// Creates an empty client that caches downloaded and parsed datasets in
    /// `cache_folder`. The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`OutlookError::CacheDirCreation`] if the directory cannot be created.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, OutlookError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| OutlookError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self::assemble(
            HistoryLoader::new(&cache_folder),
            HistoricalStore::default(),
        ))
    }

    /// Creates an empty client using the default cache directory
    /// (`seasonal_outlook_cache` inside the platform cache directory).
    ///
    /// # Errors
    ///
    /// Returns [`OutlookError::CacheDirResolution`] if the platform cache directory is
    /// unknown, and [`OutlookError::CacheDirCreation`] if it cannot be created.
    pub async fn new() -> Result<Self, OutlookError> {
        let cache_folder = get_cache_dir().map_err(OutlookError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Creates a client over records that are already in memory.
    ///
    /// Nothing is written to disk until a later reload. When no platform cache directory
    /// exists, reloads cache into the system temporary directory instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seasonal_outlook::{HistoricalRecord, HistoricalStore, Outlook, OutlookError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), OutlookError> {
    /// let store = HistoricalStore::new(vec![HistoricalRecord::builder()
    ///     .country("Testland")
    ///     .timestamp(NaiveDate::from_ymd_opt(2023, 4, 10).unwrap())
    ///     .temperature_celsius(18.0)
    ///     .build()]);
    /// let outlook = Outlook::from_store(store);
    ///
    /// let summary = outlook.predict("Testland", "2025-04-10").call().await?;
    /// assert_eq!(summary.pred_temp_c, Some(18.0));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_store(store: HistoricalStore) -> Self {
        let cache_folder = get_cache_dir().unwrap_or_else(|_| {
            std::env::temp_dir().join("seasonal_outlook_cache")
        });
        Self::assemble(HistoryLoader::new(&cache_folder), store)
    }

    /// Creates a client and loads a local CSV dataset into it.
    ///
    /// # Arguments
    ///
    /// * `path` - **Required.** CSV file to load; a `.gz` suffix means gzip-compressed.
    /// * `.columns(ColumnMapping)` - Optional. Source column names, see [`ColumnMapping`].
    /// * `.cache_folder(PathBuf)` - Optional. Where the parsed dataset is cached. Defaults
    ///   to the platform cache directory.
    ///
    /// # Errors
    ///
    /// Returns the cache directory errors of [`Outlook::with_cache_folder`] and
    /// [`OutlookError::History`] if the file cannot be read or lacks a required column.
    #[builder]
    pub async fn from_csv(
        #[builder(start_fn)] path: &Path,
        columns: Option<ColumnMapping>,
        cache_folder: Option<PathBuf>,
    ) -> Result<Self, OutlookError> {
        let loader = Self::configured_loader(cache_folder, columns, None).await?;
        let store = loader.load_file(path).await?;
        Ok(Self::assemble(loader, store))
    }

    /// Creates a client and loads a dataset from a URL into it.
    ///
    /// Downloads are cached; the cache is reused until it is older than `max_cache_age`
    /// (default 30 days).
    ///
    /// # Arguments
    ///
    /// * `url` - **Required.** Location of the CSV, optionally gzip-compressed (`.gz`).
    /// * `.columns(ColumnMapping)` - Optional. Source column names.
    /// * `.cache_folder(PathBuf)` - Optional. Where downloads are cached.
    /// * `.max_cache_age(Duration)` - Optional. Age after which a download is refreshed.
    ///
    /// # Errors
    ///
    /// Returns the cache directory errors of [`Outlook::with_cache_folder`] and
    /// [`OutlookError::History`] on network, HTTP status or parsing failures.
    #[builder]
    pub async fn from_url(
        #[builder(start_fn)] url: &str,
        columns: Option<ColumnMapping>,
        cache_folder: Option<PathBuf>,
        max_cache_age: Option<Duration>,
    ) -> Result<Self, OutlookError> {
        let loader = Self::configured_loader(cache_folder, columns, max_cache_age).await?;
        let store = loader.load_url(url).await?;
        Ok(Self::assemble(loader, store))
    }

    /// Predicts the weather for `country` on `date` from the loaded history.
    ///
    /// The date may be anything implementing [`TargetDate`]: a `chrono` date or
    /// date-time, or a string such as `"2025-07-07"`, `"2025/07/07"` or
    /// `"2025-07-07T18:30:00Z"`. Summaries are cached for the rest of the calendar day.
    ///
    /// # Arguments
    ///
    /// * `country` - **Required.** Exact, case-sensitive country name.
    /// * `date` - **Required.** The target date.
    /// * `.sigma_days(f64)` - Optional. Kernel bandwidth in days. Defaults to
    ///   [`DEFAULT_SIGMA_DAYS`].
    ///
    /// # Errors
    ///
    /// * [`OutlookError::DateParsing`] if `date` is not a recognizable calendar date.
    /// * [`OutlookError::Prediction`] wrapping
    ///   [`PredictionError::UnknownCountry`](crate::PredictionError::UnknownCountry) when
    ///   the dataset has no records for `country`, or
    ///   [`PredictionError::InvalidBandwidth`](crate::PredictionError::InvalidBandwidth)
    ///   for a bandwidth that is not a positive finite number.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use seasonal_outlook::{Outlook, OutlookError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), OutlookError> {
    /// # let outlook = Outlook::new().await?;
    /// let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
    /// let summary = outlook
    ///     .predict("Finland", date)
    ///     .sigma_days(7.0)
    ///     .call()
    ///     .await?;
    /// println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn predict<D: TargetDate + Display>(
        &self,
        #[builder(start_fn)] country: &str,
        #[builder(start_fn)] date: D,
        #[builder(default = DEFAULT_SIGMA_DAYS)] sigma_days: f64,
    ) -> Result<PredictionSummary, OutlookError> {
        let target_date = date
            .to_target_date()
            .ok_or_else(|| OutlookError::DateParsing(date.to_string()))?;
        let (generation, store) = self.store.versioned_snapshot().await;
        let key = PredictionKey::new(country, target_date, sigma_days).with_generation(generation);

        let summary = self
            .cache
            .get_or_compute(key, || {
                predictor::predict(&store, country, target_date, sigma_days)
            })
            .await?;
        Ok(summary)
    }

    /// Replaces the dataset with the contents of a local CSV file, using the column
    /// mapping and cache folder this client was created with.
    ///
    /// The new dataset is loaded completely before it is swapped in. Cached summaries are
    /// dropped. Returns the number of records now loaded.
    pub async fn reload_csv(&self, path: &Path) -> Result<usize, OutlookError> {
        let store = self.loader.load_file(path).await?;
        Ok(self.install(store).await)
    }

    /// Like [`Outlook::reload_csv`], for a dataset at a URL.
    pub async fn reload_url(&self, url: &str) -> Result<usize, OutlookError> {
        let store = self.loader.load_url(url).await?;
        Ok(self.install(store).await)
    }

    /// Deletes the parsed datasets cached on disk. The loaded dataset is unaffected.
    pub async fn clear_history_cache(&self) -> Result<usize, OutlookError> {
        Ok(self.loader.clear_cache().await?)
    }

    /// Drops summaries computed on earlier days. Returns how many were dropped.
    pub async fn evict_expired_predictions(&self) -> usize {
        self.cache.evict_expired().await
    }

    /// The dataset currently loaded.
    pub async fn store(&self) -> Arc<HistoricalStore> {
        self.store.snapshot().await
    }

    /// Countries with at least one record, in lexicographic order.
    pub async fn countries(&self) -> Vec<String> {
        self.store
            .snapshot()
            .await
            .countries()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn assemble(loader: HistoryLoader, store: HistoricalStore) -> Self {
        Self {
            loader,
            store: StoreHandle::new(store),
            cache: PredictionCache::new(),
        }
    }

    async fn configured_loader(
        cache_folder: Option<PathBuf>,
        columns: Option<ColumnMapping>,
        max_cache_age: Option<Duration>,
    ) -> Result<HistoryLoader, OutlookError> {
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().map_err(OutlookError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| OutlookError::CacheDirCreation(cache_folder.clone(), e))?;

        let mut loader = HistoryLoader::new(&cache_folder);
        if let Some(columns) = columns {
            loader = loader.with_columns(columns);
        }
        if let Some(max_cache_age) = max_cache_age {
            loader = loader.with_max_cache_age(max_cache_age);
        }
        Ok(loader)
    }

    async fn install(&self, store: HistoricalStore) -> usize {
        let records = store.len();
        self.store.swap(store).await;
        // Keys carry the store generation, so entries for the old dataset are unreachable.
        self.cache.clear().await;
        debug!("Prediction cache cleared after reload");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::record::HistoricalRecord;
    use crate::prediction::error::PredictionError;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
    use tempfile::TempDir;

    const CSV: &str = "\
country,last_updated,temperature_celsius,precip_mm,wind_kph,air_quality_gb-defra-index,condition_text
Testland,2021-04-10 12:00,10.0,0.0,5.0,1,Sunny
Testland,2022-04-10 12:00,20.0,0.0,5.0,1,Sunny
Testland,2023-04-10 12:00,30.0,0.0,5.0,1,Sunny
";

    const CSV_RELOADED: &str = "\
country,last_updated,temperature_celsius,precip_mm,wind_kph,air_quality_gb-defra-index,condition_text
Otherland,2023-04-10 12:00,5.0,1.0,30.0,2,Light rain
";

    fn testland() -> HistoricalStore {
        [10.0, 20.0, 30.0]
            .into_iter()
            .zip(2021..)
            .map(|(temp, year)| {
                HistoricalRecord::builder()
                    .country("Testland")
                    .timestamp(NaiveDate::from_ymd_opt(year, 4, 10).unwrap())
                    .temperature_celsius(temp)
                    .build()
            })
            .collect()
    }

    #[tokio::test]
    async fn predicts_for_every_date_input_format() -> Result<(), Box<dyn std::error::Error>> {
        let outlook = Outlook::from_store(testland());
        let expected = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();

        let from_date = outlook.predict("Testland", expected).call().await?;
        let from_datetime = outlook
            .predict(
                "Testland",
                NaiveDateTime::parse_from_str("2025-04-10 23:59:00", "%Y-%m-%d %H:%M:%S")?,
            )
            .call()
            .await?;
        let from_utc = outlook
            .predict("Testland", Utc.with_ymd_and_hms(2025, 4, 10, 6, 0, 0).unwrap())
            .call()
            .await?;
        let from_str = outlook.predict("Testland", "2025/04/10").call().await?;
        let from_string = outlook
            .predict("Testland", String::from("2025-04-10T08:00:00Z"))
            .call()
            .await?;

        for summary in [&from_date, &from_datetime, &from_utc, &from_str, &from_string] {
            assert_eq!(summary.date, expected);
            assert_eq!(summary.pred_temp_c, Some(20.0));
        }
        assert_eq!(serde_json::to_value(&from_str)?["date"], "2025-04-10");
        Ok(())
    }

    #[tokio::test]
    async fn unparseable_date_is_reported_with_its_input() {
        let outlook = Outlook::from_store(testland());
        let err = outlook.predict("Testland", "10.04.2025").call().await;
        assert!(matches!(err, Err(OutlookError::DateParsing(ref s)) if s == "10.04.2025"));
    }

    #[tokio::test]
    async fn prediction_errors_are_wrapped() {
        let outlook = Outlook::from_store(testland());

        let unknown = outlook.predict("Atlantis", "2025-04-10").call().await;
        assert!(matches!(
            unknown,
            Err(OutlookError::Prediction(PredictionError::UnknownCountry { ref country }))
                if country == "Atlantis"
        ));

        let bandwidth = outlook
            .predict("Testland", "2025-04-10")
            .sigma_days(0.0)
            .call()
            .await;
        assert!(matches!(
            bandwidth,
            Err(OutlookError::Prediction(PredictionError::InvalidBandwidth(_)))
        ));
    }

    #[tokio::test]
    async fn repeated_requests_are_cached_per_bandwidth() -> Result<(), Box<dyn std::error::Error>>
    {
        let outlook = Outlook::from_store(testland());
        let first = outlook.predict("Testland", "2025-04-10").call().await?;
        let again = outlook.predict("Testland", "2025-04-10").call().await?;
        assert_eq!(first, again);
        assert_eq!(outlook.cache.len().await, 1);

        outlook
            .predict("Testland", "2025-04-10")
            .sigma_days(30.0)
            .call()
            .await?;
        assert_eq!(outlook.cache.len().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn reload_swaps_dataset_and_clears_cache() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        tokio::fs::write(&first, CSV).await?;
        tokio::fs::write(&second, CSV_RELOADED).await?;

        let outlook = Outlook::from_csv(&first)
            .cache_folder(dir.path().join("cache"))
            .call()
            .await?;
        assert_eq!(outlook.countries().await, vec!["Testland"]);
        let before = outlook.predict("Testland", "2025-04-10").call().await?;
        assert_eq!(before.pred_temp_c, Some(20.0));
        let snapshot = outlook.store().await;

        assert_eq!(outlook.reload_csv(&second).await?, 1);

        assert!(outlook.cache.is_empty().await);
        assert_eq!(outlook.countries().await, vec!["Otherland"]);
        assert!(matches!(
            outlook.predict("Testland", "2025-04-10").call().await,
            Err(OutlookError::Prediction(PredictionError::UnknownCountry { .. }))
        ));
        let after = outlook.predict("Otherland", "2025-04-10").call().await?;
        assert_eq!(after.prob_rain_pct, Some(100.0));
        // Earlier snapshots still see the old dataset.
        assert!(snapshot.contains_country("Testland"));

        assert_eq!(outlook.clear_history_cache().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn creates_the_cache_folder() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let cache = dir.path().join("nested").join("cache");
        let outlook = Outlook::with_cache_folder(cache.clone()).await?;
        assert!(cache.is_dir());
        assert!(outlook.store().await.is_empty());
        Ok(())
    }
}
