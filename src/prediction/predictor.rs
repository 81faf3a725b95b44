//! Climatological prediction for a single country and calendar date.

use crate::history::record::HistoricalRecord;
use crate::history::store::HistoricalStore;
use crate::prediction::classify::{
    AirQualityClass, CloudCover, TemperatureClass, WetClass, WindClass, WindRegime,
};
use crate::prediction::error::PredictionError;
use crate::prediction::headline::{headline, HeadlineParts};
use crate::prediction::kernel::seasonal_weight;
use crate::prediction::stats::{indicator, weighted_mean, weighted_mode, weighted_quantiles};
use crate::prediction::summary::{percent, round_to, PredictionSummary};
use crate::types::season::Season;
use chrono::NaiveDate;
use log::debug;

const LIKELY_BAND: [f64; 2] = [0.25, 0.75];
const POSSIBLE_BAND: [f64; 2] = [0.05, 0.95];

/// The records of one country paired with their seasonal weight for one target date.
///
/// Lives only for the duration of a single [`predict`] call.
struct WeightedSamples<'a> {
    records: &'a [HistoricalRecord],
    weights: Vec<f64>,
}

impl<'a> WeightedSamples<'a> {
    fn new(records: &'a [HistoricalRecord], target_date: NaiveDate, sigma_days: f64) -> Self {
        let weights = records
            .iter()
            .map(|r| seasonal_weight(r.timestamp, target_date, sigma_days))
            .collect();
        Self { records, weights }
    }

    fn values(&self, field: impl Fn(&HistoricalRecord) -> Option<f64>) -> Vec<Option<f64>> {
        self.records.iter().map(field).collect()
    }

    fn mean(&self, field: impl Fn(&HistoricalRecord) -> Option<f64>) -> Option<f64> {
        weighted_mean(&self.values(field), &self.weights)
    }

    fn quantiles(
        &self,
        field: impl Fn(&HistoricalRecord) -> Option<f64>,
        probs: &[f64],
    ) -> Vec<Option<f64>> {
        weighted_quantiles(&self.values(field), &self.weights, probs)
    }

    /// Weighted share of all records for which `event` holds. Records without a finite
    /// `field` count against the event.
    fn probability(
        &self,
        field: impl Fn(&HistoricalRecord) -> Option<f64>,
        event: impl Fn(f64) -> bool,
    ) -> Option<f64> {
        let indicators: Vec<Option<f64>> = self
            .records
            .iter()
            .map(|r| Some(indicator(field(r), &event)))
            .collect();
        weighted_mean(&indicators, &self.weights)
    }

    fn most_likely_condition(&self) -> Option<String> {
        let labels: Vec<Option<&str>> = self
            .records
            .iter()
            .map(|r| r.condition_text.as_deref())
            .collect();
        weighted_mode(&labels, &self.weights)
    }
}

/// Estimates the expected weather in `country` on `target_date`.
///
/// Every record of the country contributes with a Gaussian weight on its circular
/// day-of-year distance to `target_date` (bandwidth `sigma_days`). The store is only
/// read.
///
/// # Errors
///
/// * [`PredictionError::InvalidBandwidth`] if `sigma_days` is not a positive finite number.
/// * [`PredictionError::UnknownCountry`] if the store holds no record for `country`
///   (matched exactly, case-sensitive).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use seasonal_outlook::{predict, HistoricalRecord, HistoricalStore};
///
/// let day = NaiveDate::from_ymd_opt(2024, 4, 9).unwrap();
/// let store: HistoricalStore = [10.0, 20.0, 30.0]
///     .into_iter()
///     .map(|t| {
///         HistoricalRecord::builder()
///             .country("Testland")
///             .timestamp(day)
///             .temperature_celsius(t)
///             .build()
///     })
///     .collect();
///
/// let summary = predict(&store, "Testland", day, 15.0)?;
/// assert_eq!(summary.pred_temp_c, Some(20.0));
/// assert_eq!(summary.date.to_string(), "2024-04-09");
/// # Ok::<(), seasonal_outlook::PredictionError>(())
/// ```
pub fn predict(
    store: &HistoricalStore,
    country: &str,
    target_date: NaiveDate,
    sigma_days: f64,
) -> Result<PredictionSummary, PredictionError> {
    if !sigma_days.is_finite() || sigma_days <= 0.0 {
        return Err(PredictionError::InvalidBandwidth(sigma_days));
    }
    let records = store.records_for(country);
    if records.is_empty() {
        return Err(PredictionError::UnknownCountry {
            country: country.to_string(),
        });
    }
    debug!(
        "Predicting {} on {} from {} records (sigma {} days)",
        country,
        target_date,
        records.len(),
        sigma_days
    );

    let samples = WeightedSamples::new(records, target_date, sigma_days);
    let temperature = |r: &HistoricalRecord| r.temperature_celsius;
    let precipitation = |r: &HistoricalRecord| r.precip_mm;
    let wind = |r: &HistoricalRecord| r.wind_kph;
    let air_quality = |r: &HistoricalRecord| r.air_quality_index;

    // Temperature
    let pred_temp_c = samples.mean(temperature);
    let likely = samples.quantiles(temperature, &LIKELY_BAND);
    let possible = samples.quantiles(temperature, &POSSIBLE_BAND);

    // Rain
    let prob_rain = samples.probability(precipitation, |mm| mm > 0.0);
    let rain_mm = samples.mean(precipitation);

    // Wind
    let wind_regime = |regime: WindRegime| {
        samples.probability(wind, move |kph| WindRegime::of(kph) == Some(regime))
    };
    let prob_calm = wind_regime(WindRegime::Calm);
    let prob_light_breeze = wind_regime(WindRegime::LightBreeze);
    let prob_windy = wind_regime(WindRegime::Windy);
    let prob_gale = wind_regime(WindRegime::Gale);
    let pred_wind_kph = samples.mean(wind);

    // Air quality
    let aq_regime = |class: AirQualityClass| {
        samples.probability(air_quality, move |index| {
            AirQualityClass::classify(index) == Some(class)
        })
    };
    let prob_aq_low = aq_regime(AirQualityClass::Low);
    let prob_aq_moderate = aq_regime(AirQualityClass::Moderate);
    let prob_aq_high = aq_regime(AirQualityClass::High);
    let prob_aq_very_high = aq_regime(AirQualityClass::VeryHigh);
    let pred_aq_index = samples.mean(air_quality);

    // Descriptives
    let pred_feels_c = samples
        .mean(|r: &HistoricalRecord| r.feels_like_celsius)
        .or(pred_temp_c);
    let pred_cloud_pct = samples.mean(|r: &HistoricalRecord| r.cloud_pct);
    let pred_condition = samples.most_likely_condition();

    let temp_class = pred_feels_c.and_then(TemperatureClass::classify);
    let wind_class = pred_wind_kph.and_then(WindClass::classify);
    let wet_class = rain_mm.and_then(WetClass::classify);
    let aq_class = pred_aq_index.and_then(AirQualityClass::classify);
    let cloud = pred_cloud_pct.and_then(CloudCover::classify);

    let pred_headline = headline(&HeadlineParts {
        temperature: temp_class,
        wind: wind_class,
        wet: wet_class,
        air_quality: aq_class,
        cloud,
        condition: pred_condition.as_deref(),
    });

    Ok(PredictionSummary {
        country: country.to_string(),
        date: target_date,
        season: Season::of(target_date),
        pred_temp_c: round_to(pred_temp_c, 1),
        temp_likely_min_c: round_to(likely[0], 1),
        temp_likely_max_c: round_to(likely[1], 1),
        temp_possible_min_c: round_to(possible[0], 1),
        temp_possible_max_c: round_to(possible[1], 1),
        prob_rain_pct: percent(prob_rain),
        pred_rain_mm: round_to(rain_mm, 2),
        prob_calm_pct: percent(prob_calm),
        prob_lightbreeze_pct: percent(prob_light_breeze),
        prob_windy_pct: percent(prob_windy),
        prob_gale_pct: percent(prob_gale),
        pred_wind_kph: round_to(pred_wind_kph, 1),
        aq_low_pct: percent(prob_aq_low),
        aq_moderate_pct: percent(prob_aq_moderate),
        aq_high_pct: percent(prob_aq_high),
        aq_veryhigh_pct: percent(prob_aq_very_high),
        pred_aq_index: round_to(pred_aq_index, 1),
        pred_feelslike_c: round_to(pred_feels_c, 1),
        pred_cloud_pct: round_to(pred_cloud_pct, 0),
        pred_condition,
        pred_temp_class: temp_class,
        pred_wind_class: wind_class,
        pred_wet_class: wet_class,
        pred_aq_class: aq_class,
        pred_headline,
    })
}
