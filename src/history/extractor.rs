//! Turns a normalized history `DataFrame` into [`HistoricalRecord`]s.

use crate::history::columns::{
    COL_AQI, COL_CLOUD, COL_CONDITION, COL_COUNTRY, COL_FEELS_LIKE, COL_PRECIP, COL_TEMP,
    COL_TIMESTAMP, COL_WIND,
};
use crate::history::error::HistoryError;
use crate::history::record::HistoricalRecord;
use crate::types::target_date::parse_calendar_date;
use log::warn;
use polars::prelude::*;

/// Retrieves a column by name from a DataFrame.
fn get_column<'a>(df: &'a DataFrame, col: &str) -> Result<&'a Column, HistoryError> {
    df.column(col)
        .map_err(|e| HistoryError::ColumnNotFound(col.to_string(), e))
}

fn get_f64<'a>(df: &'a DataFrame, col: &str) -> Result<&'a Float64Chunked, HistoryError> {
    Ok(get_column(df, col)?.f64()?)
}

fn get_str<'a>(df: &'a DataFrame, col: &str) -> Result<&'a StringChunked, HistoryError> {
    Ok(get_column(df, col)?.str()?)
}

/// Records read from a frame, plus the number of rows that could not be used.
#[derive(Debug, Default)]
pub(crate) struct Extracted {
    pub records: Vec<HistoricalRecord>,
    pub skipped: usize,
}

/// Reads every row of a normalized frame.
///
/// Rows without a country or without a parseable timestamp are skipped. Missing
/// numeric readings become `None`. Condition texts are kept verbatim.
pub(crate) fn extract_records(df: &DataFrame) -> Result<Extracted, HistoryError> {
    let country = get_str(df, COL_COUNTRY)?;
    let timestamp = get_str(df, COL_TIMESTAMP)?;
    let temperature = get_f64(df, COL_TEMP)?;
    let feels_like = get_f64(df, COL_FEELS_LIKE)?;
    let precipitation = get_f64(df, COL_PRECIP)?;
    let wind = get_f64(df, COL_WIND)?;
    let air_quality = get_f64(df, COL_AQI)?;
    let cloud = get_f64(df, COL_CLOUD)?;
    let condition = get_str(df, COL_CONDITION)?;

    let mut extracted = Extracted {
        records: Vec::with_capacity(df.height()),
        skipped: 0,
    };
    for idx in 0..df.height() {
        let country = country.get(idx).filter(|c| !c.trim().is_empty());
        let date = timestamp.get(idx).and_then(parse_calendar_date);
        let (Some(country), Some(date)) = (country, date) else {
            extracted.skipped += 1;
            continue;
        };

        extracted.records.push(HistoricalRecord {
            country: country.to_string(),
            timestamp: date,
            temperature_celsius: temperature.get(idx),
            feels_like_celsius: feels_like.get(idx),
            precip_mm: precipitation.get(idx),
            wind_kph: wind.get(idx),
            air_quality_index: air_quality.get(idx),
            cloud_pct: cloud.get(idx),
            condition_text: condition.get(idx).map(str::to_string),
        });
    }

    if extracted.skipped > 0 {
        warn!(
            "Skipped {} of {} rows without a country or a parseable timestamp",
            extracted.skipped,
            df.height()
        );
    }
    Ok(extracted)
}
