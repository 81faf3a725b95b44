//! The flat result of a prediction.

use crate::prediction::classify::{AirQualityClass, TemperatureClass, WetClass, WindClass};
use crate::types::season::Season;
use chrono::NaiveDate;
use serde::Serialize;

/// Expected weather for one country on one calendar date.
///
/// Every numeric field is `None` (serialized as `null`) when the underlying weighted
/// statistic had no finite sample to work with. Probabilities are percentages in
/// `0..=100`. Temperatures, probabilities, wind and the air quality index are rounded to
/// one decimal, rain to two decimals and cloud cover to whole percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub country: String,
    /// The target date. Serialized as ISO-8601 (`YYYY-MM-DD`).
    pub date: NaiveDate,
    pub season: Season,

    /// Weighted mean temperature.
    pub pred_temp_c: Option<f64>,
    /// 25th percentile of temperature.
    pub temp_likely_min_c: Option<f64>,
    /// 75th percentile of temperature.
    pub temp_likely_max_c: Option<f64>,
    /// 5th percentile of temperature.
    pub temp_possible_min_c: Option<f64>,
    /// 95th percentile of temperature.
    pub temp_possible_max_c: Option<f64>,

    pub prob_rain_pct: Option<f64>,
    pub pred_rain_mm: Option<f64>,

    pub prob_calm_pct: Option<f64>,
    pub prob_lightbreeze_pct: Option<f64>,
    pub prob_windy_pct: Option<f64>,
    pub prob_gale_pct: Option<f64>,
    pub pred_wind_kph: Option<f64>,

    pub aq_low_pct: Option<f64>,
    pub aq_moderate_pct: Option<f64>,
    pub aq_high_pct: Option<f64>,
    pub aq_veryhigh_pct: Option<f64>,
    pub pred_aq_index: Option<f64>,

    /// Weighted mean feels-like temperature, falling back to `pred_temp_c`.
    pub pred_feelslike_c: Option<f64>,
    pub pred_cloud_pct: Option<f64>,
    /// Condition text with the largest total weight.
    pub pred_condition: Option<String>,

    pub pred_temp_class: Option<TemperatureClass>,
    pub pred_wind_class: Option<WindClass>,
    pub pred_wet_class: Option<WetClass>,
    pub pred_aq_class: Option<AirQualityClass>,
    pub pred_headline: String,
}

/// Rounds to `decimals` places, dropping non-finite values.
pub(crate) fn round_to(value: Option<f64>, decimals: i32) -> Option<f64> {
    let factor = 10f64.powi(decimals);
    value
        .filter(|v| v.is_finite())
        .map(|v| (v * factor).round() / factor)
}

/// Converts a probability in `0..=1` to a percentage rounded to one decimal.
pub(crate) fn percent(probability: Option<f64>) -> Option<f64> {
    round_to(probability.map(|p| p * 100.0), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_drops_non_finite_values() {
        assert_eq!(round_to(Some(12.345), 1), Some(12.3));
        assert_eq!(round_to(Some(0.456), 2), Some(0.46));
        assert_eq!(round_to(Some(67.5), 0), Some(68.0));
        assert_eq!(round_to(Some(f64::NAN), 1), None);
        assert_eq!(round_to(None, 1), None);
    }

    #[test]
    fn probabilities_become_percentages() {
        assert_eq!(percent(Some(1.0 / 3.0)), Some(33.3));
        assert_eq!(percent(Some(1.0)), Some(100.0));
        assert_eq!(percent(None), None);
    }
}
