//! Text parsing helpers
//!
//! Shared by result conversion and request parameter processing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO date, accepting a datetime and keeping its date part
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(text).map(|dt| dt.date()))
}

/// Parse an ISO datetime; RFC 3339 offsets are normalized to UTC and a bare
/// date means midnight
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(parse_date("2023-12-31"), Some(expected));
        assert_eq!(parse_date("2023-12-31 23:10:00"), Some(expected));
        assert_eq!(parse_date("31/12/2023"), None);
    }

    #[test]
    fn test_parse_datetime_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(parse_datetime("2024-01-02T03:04:05"), Some(expected));
        assert_eq!(parse_datetime("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_datetime("2024-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(
            parse_datetime("2024-01-02"),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime("yesterday"), None);
    }
}
