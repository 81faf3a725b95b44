use crate::history::error::HistoryError;
use crate::prediction::error::PredictionError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlookError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Could not parse '{0}' as a calendar date")]
    DateParsing(String),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
