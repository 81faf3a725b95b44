//! Meteorological seasons.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Meteorological season of a calendar month, using northern-hemisphere naming.
///
/// Winter is December–February, Spring March–May, Summer June–August and Autumn
/// September–November.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use seasonal_outlook::Season;
///
/// let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
/// assert_eq!(Season::of(date), Season::Winter);
/// assert_eq!(Season::from_month(4), Some(Season::Spring));
/// assert_eq!(Season::from_month(13), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season of a month number (1 = January). `None` outside `1..=12`.
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Autumn),
            _ => None,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        };
        f.write_str(name)
    }
}
