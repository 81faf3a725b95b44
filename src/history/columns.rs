//! Column names of the raw historical dataset and of its normalized form.

use bon::Builder;

// Normalized column names, used in the parquet cache.
pub(crate) const COL_COUNTRY: &str = "country";
pub(crate) const COL_TIMESTAMP: &str = "timestamp";
pub(crate) const COL_TEMP: &str = "temperature_celsius";
pub(crate) const COL_FEELS_LIKE: &str = "feels_like_celsius";
pub(crate) const COL_PRECIP: &str = "precip_mm";
pub(crate) const COL_WIND: &str = "wind_kph";
pub(crate) const COL_AQI: &str = "air_quality_index";
pub(crate) const COL_CLOUD: &str = "cloud_pct";
pub(crate) const COL_CONDITION: &str = "condition_text";

/// Timestamp column tried when the configured one is absent.
pub(crate) const FALLBACK_TIMESTAMP: &str = "date";

/// Maps the columns of a raw dataset onto the fields of a
/// [`HistoricalRecord`](crate::HistoricalRecord).
///
/// The defaults match the Global Weather Repository CSV export. `feels_like`, `cloud` and
/// `condition` are optional in the source: when such a column is missing every record
/// simply has no value for it. All other columns are required.
///
/// # Examples
///
/// ```
/// use seasonal_outlook::ColumnMapping;
///
/// let columns = ColumnMapping::builder()
///     .air_quality("aqi")
///     .timestamp("observed_at")
///     .build();
/// assert_eq!(columns.air_quality, "aqi");
/// assert_eq!(columns.country, "country");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Builder)]
pub struct ColumnMapping {
    #[builder(into, default = String::from("country"))]
    pub country: String,
    /// Observation timestamp. If missing, a column named `date` is used instead.
    #[builder(into, default = String::from("last_updated"))]
    pub timestamp: String,
    #[builder(into, default = String::from("temperature_celsius"))]
    pub temperature: String,
    #[builder(into, default = String::from("feels_like_celsius"))]
    pub feels_like: String,
    #[builder(into, default = String::from("precip_mm"))]
    pub precipitation: String,
    #[builder(into, default = String::from("wind_kph"))]
    pub wind: String,
    #[builder(into, default = String::from("air_quality_gb-defra-index"))]
    pub air_quality: String,
    #[builder(into, default = String::from("cloud"))]
    pub cloud: String,
    #[builder(into, default = String::from("condition_text"))]
    pub condition: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Whether a source column must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    Optional,
}

/// A numeric source column and the normalized name it is stored under.
pub(crate) struct NumericColumn<'a> {
    pub source: &'a str,
    pub target: &'static str,
    pub presence: Presence,
}

impl ColumnMapping {
    pub(crate) fn numeric_columns(&self) -> [NumericColumn<'_>; 6] {
        use Presence::*;
        [
            NumericColumn {
                source: &self.temperature,
                target: COL_TEMP,
                presence: Required,
            },
            NumericColumn {
                source: &self.feels_like,
                target: COL_FEELS_LIKE,
                presence: Optional,
            },
            NumericColumn {
                source: &self.precipitation,
                target: COL_PRECIP,
                presence: Required,
            },
            NumericColumn {
                source: &self.wind,
                target: COL_WIND,
                presence: Required,
            },
            NumericColumn {
                source: &self.air_quality,
                target: COL_AQI,
                presence: Required,
            },
            NumericColumn {
                source: &self.cloud,
                target: COL_CLOUD,
                presence: Optional,
            },
        ]
    }
}
