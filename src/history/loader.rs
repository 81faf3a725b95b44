use crate::history::columns::{
    ColumnMapping, Presence, COL_CONDITION, COL_COUNTRY, COL_TIMESTAMP, FALLBACK_TIMESTAMP,
};
use crate::history::error::HistoryError;
use crate::history::extractor::extract_records;
use crate::history::store::HistoricalStore;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::{fs, task};
use tokio_util::io::StreamReader;

const CACHE_FILE_PREFIX: &str = "history-";
const CACHE_FILE_EXTENSION: &str = "parquet";

/// Downloaded datasets are refreshed once their cache is older than this.
pub const DEFAULT_MAX_CACHE_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Loads historical observations from CSV files or URLs into a [`HistoricalStore`].
///
/// The raw table is normalized according to a [`ColumnMapping`] and cached as parquet in
/// the cache directory, so later loads of the same source skip CSV parsing. A cache built
/// from a local file is reused while it is at least as new as the file; a cache built from
/// a URL is reused until it is older than the configured maximum age.
pub struct HistoryLoader {
    cache_dir: PathBuf,
    download_client: Client,
    columns: ColumnMapping,
    max_cache_age: Duration,
}

impl HistoryLoader {
    pub fn new(cache_dir: &Path) -> HistoryLoader {
        HistoryLoader {
            cache_dir: cache_dir.to_path_buf(),
            download_client: Client::new(),
            columns: ColumnMapping::default(),
            max_cache_age: DEFAULT_MAX_CACHE_AGE,
        }
    }

    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_max_cache_age(mut self, max_cache_age: Duration) -> Self {
        self.max_cache_age = max_cache_age;
        self
    }

    /// Loads a local CSV file. Files ending in `.gz` are decompressed first.
    pub async fn load_file(&self, path: &Path) -> Result<HistoricalStore, HistoryError> {
        let parquet_path = self.cache_path(&path.to_string_lossy());

        let df = if self.file_cache_is_fresh(path, &parquet_path).await? {
            info!("Cache hit for {:?} at {:?}", path, parquet_path);
            Self::read_cached(&parquet_path).await?
        } else {
            warn!("Cache miss for {:?}. Parsing and caching.", path);
            let source_name = path.display().to_string();
            let df = if is_gzip(&source_name) {
                let compressed = fs::read(path)
                    .await
                    .map_err(|e| HistoryError::SourceRead(path.to_path_buf(), e))?;
                let bytes = Self::gunzip(&compressed).await?;
                self.csv_bytes_to_dataframe(bytes, source_name).await?
            } else {
                self.csv_file_to_dataframe(path.to_path_buf(), source_name)
                    .await?
            };
            self.store_cache(df, &parquet_path).await?
        };

        Self::into_store(df).await
    }

    /// Downloads a CSV dataset. URLs ending in `.gz` are decompressed while streaming.
    pub async fn load_url(&self, url: &str) -> Result<HistoricalStore, HistoryError> {
        let parquet_path = self.cache_path(url);

        let df = if self.url_cache_is_fresh(&parquet_path).await? {
            info!("Cache hit for {} at {:?}", url, parquet_path);
            Self::read_cached(&parquet_path).await?
        } else {
            warn!("Cache miss for {}. Downloading and caching.", url);
            let bytes = self.download(url).await?;
            let df = self.csv_bytes_to_dataframe(bytes, url.to_string()).await?;
            self.store_cache(df, &parquet_path).await?
        };

        Self::into_store(df).await
    }

    /// Deletes every cached history file. Returns how many were removed.
    pub async fn clear_cache(&self) -> Result<usize, HistoryError> {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(HistoryError::CacheMetadataRead(self.cache_dir.clone(), e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HistoryError::CacheMetadataRead(self.cache_dir.clone(), e))?
        {
            let path = entry.path();
            let is_history_cache = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n.starts_with(CACHE_FILE_PREFIX) && n.ends_with(CACHE_FILE_EXTENSION)
                });
            if is_history_cache {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| HistoryError::CacheDeletion(path.clone(), e))?;
                removed += 1;
            }
        }
        info!("Removed {} cached history files from {:?}", removed, self.cache_dir);
        Ok(removed)
    }

    /// Cache file for a source: a readable slug of its name plus a hash of the full name
    /// and of the column mapping, since the cache holds the already-normalized frame.
    fn cache_path(&self, source: &str) -> PathBuf {
        let name = source
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(source);
        let slug: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(48)
            .collect();
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        self.columns.hash(&mut hasher);
        self.cache_dir.join(format!(
            "{}{}-{:016x}.{}",
            CACHE_FILE_PREFIX,
            slug,
            hasher.finish(),
            CACHE_FILE_EXTENSION
        ))
    }

    async fn file_cache_is_fresh(
        &self,
        source: &Path,
        parquet_path: &Path,
    ) -> Result<bool, HistoryError> {
        let Some(cached) = Self::modified(parquet_path).await? else {
            return Ok(false);
        };
        let Some(source_modified) = Self::modified(source).await? else {
            return Err(HistoryError::SourceRead(
                source.to_path_buf(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "source file not found"),
            ));
        };
        Ok(cached >= source_modified)
    }

    async fn url_cache_is_fresh(&self, parquet_path: &Path) -> Result<bool, HistoryError> {
        let Some(cached) = Self::modified(parquet_path).await? else {
            return Ok(false);
        };
        let age = SystemTime::now()
            .duration_since(cached)
            .map_err(|e| HistoryError::SystemTimeCalculation(parquet_path.to_path_buf(), e))?;
        Ok(age <= self.max_cache_age)
    }

    /// Modification time of `path`, or `None` if it does not exist.
    async fn modified(path: &Path) -> Result<Option<SystemTime>, HistoryError> {
        match fs::metadata(path).await {
            Ok(metadata) => metadata
                .modified()
                .map(Some)
                .map_err(|e| HistoryError::CacheMetadataRead(path.to_path_buf(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HistoryError::CacheMetadataRead(path.to_path_buf(), e)),
        }
    }

    /// Downloads the body of `url`, decompressing gzip on the fly.
    async fn download(&self, url: &str) -> Result<Vec<u8>, HistoryError> {
        info!("Downloading history from {}", url);

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| HistoryError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    HistoryError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    HistoryError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut stream_reader = StreamReader::new(stream);
        let mut body = Vec::new();
        if is_gzip(url) {
            GzipDecoder::new(stream_reader)
                .read_to_end(&mut body)
                .await?;
        } else {
            stream_reader.read_to_end(&mut body).await?;
        }
        info!("Downloaded {} bytes of history from {}", body.len(), url);
        Ok(body)
    }

    async fn gunzip(compressed: &[u8]) -> Result<Vec<u8>, HistoryError> {
        let mut decoder = GzipDecoder::new(BufReader::new(compressed));
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).await?;
        Ok(decompressed)
    }

    /// Writes raw CSV bytes to a temporary file and parses them in a blocking task.
    async fn csv_bytes_to_dataframe(
        &self,
        bytes: Vec<u8>,
        source_name: String,
    ) -> Result<DataFrame, HistoryError> {
        let columns = self.columns.clone();
        task::spawn_blocking(move || {
            let csv_io_error = |e| HistoryError::CsvReadIo {
                source_name: source_name.clone(),
                source: e,
            };
            let mut temp_file = NamedTempFile::new().map_err(csv_io_error)?;
            temp_file.write_all(&bytes).map_err(csv_io_error)?;
            temp_file.flush().map_err(csv_io_error)?;

            let raw = read_csv(temp_file.path(), &source_name)?;
            normalize(raw, &columns, &source_name)
        })
        .await?
    }

    async fn csv_file_to_dataframe(
        &self,
        path: PathBuf,
        source_name: String,
    ) -> Result<DataFrame, HistoryError> {
        let columns = self.columns.clone();
        task::spawn_blocking(move || {
            let raw = read_csv(&path, &source_name)?;
            normalize(raw, &columns, &source_name)
        })
        .await?
    }

    /// Writes the normalized frame to the parquet cache and hands it back.
    async fn store_cache(
        &self,
        df: DataFrame,
        parquet_path: &Path,
    ) -> Result<DataFrame, HistoryError> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| HistoryError::CacheDirCreation(self.cache_dir.clone(), e))?;
        let path_buf = parquet_path.to_path_buf();
        let df = task::spawn_blocking(move || {
            let mut df = df;
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| HistoryError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| HistoryError::ParquetWritePolars(path_buf, e))?;
            Ok::<DataFrame, HistoryError>(df)
        })
        .await??;
        info!("Cached {} normalized rows to {:?}", df.height(), parquet_path);
        Ok(df)
    }

    async fn read_cached(parquet_path: &Path) -> Result<DataFrame, HistoryError> {
        let path_buf = parquet_path.to_path_buf();
        task::spawn_blocking(move || {
            LazyFrame::scan_parquet(&path_buf, Default::default())
                .and_then(LazyFrame::collect)
                .map_err(|e| HistoryError::ParquetScan(path_buf, e))
        })
        .await?
    }

    async fn into_store(df: DataFrame) -> Result<HistoricalStore, HistoryError> {
        let store = task::spawn_blocking(move || {
            extract_records(&df).map(|extracted| HistoricalStore::new(extracted.records))
        })
        .await??;
        info!(
            "Loaded {} historical records for {} countries",
            store.len(),
            store.countries().len()
        );
        Ok(store)
    }
}

fn is_gzip(source: &str) -> bool {
    source.to_ascii_lowercase().ends_with(".gz")
}

fn read_csv(path: &Path, source_name: &str) -> Result<DataFrame, HistoryError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| HistoryError::CsvReadPolars {
            source_name: source_name.to_string(),
            source: e,
        })
}

/// Selects the mapped columns under their normalized names and types.
///
/// Optional columns that are absent from the source become all-null columns.
fn normalize(
    raw: DataFrame,
    columns: &ColumnMapping,
    source_name: &str,
) -> Result<DataFrame, HistoryError> {
    let present: HashSet<String> = raw
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let missing = |column: &str| HistoryError::MissingColumn {
        source_name: source_name.to_string(),
        column: column.to_string(),
    };

    if !present.contains(&columns.country) {
        return Err(missing(&columns.country));
    }
    let timestamp = if present.contains(&columns.timestamp) {
        columns.timestamp.as_str()
    } else if present.contains(FALLBACK_TIMESTAMP) {
        FALLBACK_TIMESTAMP
    } else {
        return Err(missing(&columns.timestamp));
    };

    let mut selection = vec![
        col(columns.country.as_str())
            .cast(DataType::String)
            .alias(COL_COUNTRY),
        col(timestamp).cast(DataType::String).alias(COL_TIMESTAMP),
    ];
    for numeric in columns.numeric_columns() {
        let expr = if present.contains(numeric.source) {
            col(numeric.source).cast(DataType::Float64)
        } else if numeric.presence == Presence::Optional {
            lit(NULL).cast(DataType::Float64)
        } else {
            return Err(missing(numeric.source));
        };
        selection.push(expr.alias(numeric.target));
    }
    let condition = if present.contains(&columns.condition) {
        col(columns.condition.as_str()).cast(DataType::String)
    } else {
        lit(NULL).cast(DataType::String)
    };
    selection.push(condition.alias(COL_CONDITION));

    Ok(raw.lazy().select(selection).collect()?)
}
