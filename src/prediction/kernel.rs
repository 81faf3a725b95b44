//! Seasonal kernel weighting.
//!
//! A historical record is relevant to a target date in proportion to how close its
//! calendar day-of-year is to the target's day-of-year, regardless of the year it was
//! observed in. December and January are treated as neighbours.

use chrono::{Datelike, NaiveDate};

/// Bandwidth used when a caller does not supply one, in days.
pub const DEFAULT_SIGMA_DAYS: f64 = 15.0;

/// Length of the seasonal cycle used for the wraparound. Leap years are not special-cased.
const DAYS_IN_CYCLE: i64 = 365;

/// Returns the circular day-of-year distance between two dates.
///
/// The distance is `min(|Δ|, 365 - |Δ|)` where `Δ` is the difference between the
/// ordinal days of both dates, so the result is always in `0..=182`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use seasonal_outlook::circular_day_distance;
///
/// let dec_30 = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
/// let jan_2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// assert_eq!(circular_day_distance(dec_30, jan_2), 3);
/// ```
pub fn circular_day_distance(a: NaiveDate, b: NaiveDate) -> u32 {
    let delta = (i64::from(a.ordinal()) - i64::from(b.ordinal())).abs();
    delta.min(DAYS_IN_CYCLE - delta).max(0) as u32
}

/// Gaussian relevance weight of a record observed on `record_date` for `target_date`.
///
/// The weight is `exp(-d² / (2σ²))` with `d` the [`circular_day_distance`]. It is exactly
/// `1.0` when both dates share a day-of-year, and strictly positive otherwise: distant
/// records are down-weighted, never excluded.
///
/// A non-finite or non-positive `sigma_days` produces non-finite weights; callers are
/// expected to validate the bandwidth first.
pub fn seasonal_weight(record_date: NaiveDate, target_date: NaiveDate, sigma_days: f64) -> f64 {
    let distance = f64::from(circular_day_distance(record_date, target_date));
    (-(distance * distance) / (2.0 * sigma_days * sigma_days)).exp()
}
