mod error;
mod history;
mod outlook;
mod prediction;
mod prediction_cache;
mod types;
mod utils;

pub use error::OutlookError;
pub use outlook::*;

pub use prediction::classify::{
    AirQualityClass, CloudCover, TemperatureClass, WetClass, WindClass, WindRegime,
};
pub use prediction::error::PredictionError;
pub use prediction::headline::{headline, HeadlineParts, TYPICAL_HEADLINE};
pub use prediction::kernel::{circular_day_distance, seasonal_weight, DEFAULT_SIGMA_DAYS};
pub use prediction::predictor::predict;
pub use prediction::stats::{indicator, weighted_mean, weighted_mode, weighted_quantiles};
pub use prediction::summary::PredictionSummary;
pub use prediction_cache::{PredictionCache, PredictionKey};

pub use history::columns::ColumnMapping;
pub use history::error::HistoryError;
pub use history::loader::{HistoryLoader, DEFAULT_MAX_CACHE_AGE};
pub use history::record::HistoricalRecord;
pub use history::store::{HistoricalStore, StoreHandle};

pub use types::season::Season;
pub use types::target_date::{parse_calendar_date, TargetDate};
