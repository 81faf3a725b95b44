use polars::error::PolarsError;
use std::path::PathBuf;
use std::time::SystemTimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to delete cache '{0}'")]
    CacheDeletion(PathBuf, #[source] std::io::Error),

    #[error("Failed to calculate the age of '{0}'")]
    SystemTimeCalculation(PathBuf, #[source] SystemTimeError),

    // Errors during parquet writing (inside blocking task)
    #[error("I/O error writing parquet cache file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing parquet cache file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to scan parquet cache file '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Failed to read source file '{0}'")]
    SourceRead(PathBuf, #[source] std::io::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Data download or decompression failed")]
    DownloadIo(#[from] std::io::Error),

    // Errors during CSV reading (inside blocking task)
    #[error("I/O error processing CSV data from '{source_name}'")]
    CsvReadIo {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing error processing CSV data from '{source_name}'")]
    CsvReadPolars {
        source_name: String,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Missing required column '{column}' in '{source_name}'")]
    MissingColumn { source_name: String, column: String },
}
