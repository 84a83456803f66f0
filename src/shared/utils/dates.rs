//! Parsing helpers for the date formats accepted over HTTP and in spreadsheets.

use crate::domain::errors::{DomainError, DomainResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted for dates typed into spreadsheets, in lookup order.
const SPREADSHEET_DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Years a stored `YYYY-MM-DD` can hold.
fn four_digit_year(date: &NaiveDate) -> bool {
    (1..=9999).contains(&date.year())
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .filter(four_digit_year)
}

/// Strict variant of [`parse_iso_date`] for fields where a bad value is a client error.
pub fn require_iso_date(raw: &str, field: &str) -> DomainResult<NaiveDate> {
    parse_iso_date(raw).ok_or_else(|| {
        DomainError::ValidationError(format!("Invalid {} format. Use YYYY-MM-DD", field))
    })
}

/// Parses `raw` and renders it back canonically; empty or invalid input yields `None`.
pub fn normalize_iso_date(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_iso_date).map(format_date)
}

pub fn parse_spreadsheet_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    SPREADSHEET_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .filter(four_digit_year)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(at: NaiveDateTime) -> String {
    at.format(DATE_TIME_FORMAT).to_string()
}

/// Resolves the time of a contact.
///
/// `HH:MM` is combined with the contact date; a full `YYYY-MM-DD HH:MM:SS`
/// is taken as is. Missing or unparsable input falls back to `now`.
pub fn resolve_contact_time(raw: Option<&str>, contact_date: NaiveDate, now: NaiveDateTime) -> NaiveDateTime {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return now;
    };

    if raw.contains(':') && raw.len() <= 5 {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map(|time| contact_date.and_time(time))
            .unwrap_or(now)
    } else {
        NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_iso_date(" 2025-02-28 "), Some(d(2025, 2, 28)));
        assert_eq!(parse_iso_date("2025-02-30"), None);
        assert_eq!(parse_iso_date("28/02/2025"), None);
        assert!(require_iso_date("tomorrow", "date").is_err());
        assert_eq!(normalize_iso_date(Some("2025-3-5")), Some("2025-03-05".to_string()));
        assert_eq!(normalize_iso_date(Some("")), None);
    }

    #[test]
    fn test_out_of_range_years_are_rejected() {
        assert_eq!(parse_iso_date("+262142-12-30"), None);
        assert_eq!(parse_iso_date("0000-01-01"), None);
        assert_eq!(parse_iso_date("9999-12-31"), Some(d(9999, 12, 31)));
        assert!(require_iso_date("+262142-12-30", "contact_date").is_err());
        assert_eq!(parse_spreadsheet_date("01/01/+262142"), None);
    }

    #[test]
    fn test_spreadsheet_formats() {
        assert_eq!(parse_spreadsheet_date("25/12/2025"), Some(d(2025, 12, 25)));
        assert_eq!(parse_spreadsheet_date("2025-12-25"), Some(d(2025, 12, 25)));
        assert_eq!(parse_spreadsheet_date("25-12-2025"), Some(d(2025, 12, 25)));
        assert_eq!(parse_spreadsheet_date("12/25/2025"), None);
    }

    #[test]
    fn test_contact_time_resolution() {
        let date = d(2025, 1, 1);
        let now = d(2025, 6, 1).and_hms_opt(10, 0, 0).unwrap();

        assert_eq!(
            resolve_contact_time(Some("14:30"), date, now),
            date.and_hms_opt(14, 30, 0).unwrap()
        );
        assert_eq!(
            resolve_contact_time(Some("2025-01-02 08:15:00"), date, now),
            d(2025, 1, 2).and_hms_opt(8, 15, 0).unwrap()
        );
        assert_eq!(resolve_contact_time(Some("25:99"), date, now), now);
        assert_eq!(resolve_contact_time(None, date, now), now);
    }
}
