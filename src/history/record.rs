use bon::Builder;
use chrono::NaiveDate;

/// One historical observation for a country.
///
/// Numeric readings are optional: a reading that was not recorded (or that holds a
/// non-finite value) never contributes to a prediction.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use seasonal_outlook::HistoricalRecord;
///
/// let record = HistoricalRecord::builder()
///     .country("Japan")
///     .timestamp(NaiveDate::from_ymd_opt(2024, 7, 7).unwrap())
///     .temperature_celsius(29.5)
///     .precip_mm(0.0)
///     .condition_text("Sunny")
///     .build();
///
/// assert_eq!(record.country, "Japan");
/// assert_eq!(record.wind_kph, None);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct HistoricalRecord {
    #[builder(into)]
    pub country: String,
    /// Calendar date of the observation.
    pub timestamp: NaiveDate,
    pub temperature_celsius: Option<f64>,
    pub feels_like_celsius: Option<f64>,
    pub precip_mm: Option<f64>,
    pub wind_kph: Option<f64>,
    /// Ordinal air quality index (UK DEFRA scale, 1–10).
    pub air_quality_index: Option<f64>,
    /// Cloud cover in percent.
    pub cloud_pct: Option<f64>,
    #[builder(into)]
    pub condition_text: Option<String>,
}
