use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses the calendar date of a date or timestamp string.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]`
/// and RFC 3339. For timestamps with an offset, the date as written (in that offset) is
/// returned. Surrounding whitespace is ignored.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Anything that can be resolved to the calendar date a prediction is made for.
///
/// ```
/// use chrono::NaiveDate;
/// use seasonal_outlook::TargetDate;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 7, 7);
/// assert_eq!("2025-07-07".to_target_date(), expected);
/// assert_eq!("2025/07/07".to_target_date(), expected);
/// assert_eq!("2025-07-07T18:30:00+09:00".to_target_date(), expected);
/// assert_eq!("07-07-2025".to_target_date(), None);
/// ```
pub trait TargetDate {
    /// The resolved calendar date, or `None` when the input cannot be parsed.
    fn to_target_date(&self) -> Option<NaiveDate>;
}

impl TargetDate for NaiveDate {
    fn to_target_date(&self) -> Option<NaiveDate> {
        Some(*self)
    }
}

impl TargetDate for NaiveDateTime {
    fn to_target_date(&self) -> Option<NaiveDate> {
        Some(self.date())
    }
}

impl TargetDate for DateTime<Utc> {
    fn to_target_date(&self) -> Option<NaiveDate> {
        Some(self.date_naive())
    }
}

impl TargetDate for &str {
    fn to_target_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(self)
    }
}

impl TargetDate for String {
    fn to_target_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn every_accepted_format_resolves_to_the_same_day() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 16);
        for input in [
            "2024-05-16",
            " 2024-05-16 ",
            "2024/05/16",
            "2024-05-16 13:15",
            "2024-05-16 13:15:42",
            "2024-05-16T13:15",
            "2024-05-16T13:15:42",
            "2024-05-16T13:15:42Z",
            "2024-05-16T23:59:00-05:00",
        ] {
            assert_eq!(parse_calendar_date(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        for input in ["", "tomorrow", "2024-13-01", "2024-02-30", "16/05/2024"] {
            assert_eq!(parse_calendar_date(input), None, "input {input:?}");
        }
    }

    #[test]
    fn typed_dates_resolve_directly() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(date.to_target_date(), Some(date));
        assert_eq!(
            date.and_hms_opt(23, 0, 0).unwrap().to_target_date(),
            Some(date)
        );
        let utc = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(utc.to_target_date(), Some(date));
        assert_eq!(String::from("2023-12-31").to_target_date(), Some(date));
    }
}
