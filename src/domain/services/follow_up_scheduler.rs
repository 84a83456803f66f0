//! Next-contact scheduling.
//!
//! A client's classification code sets how many calendar days pass before the
//! next follow-up. The raw target is then pushed forward past weekends and
//! holidays so that a follow-up always lands on a business day.

use crate::domain::entities::Holiday;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashSet;

/// Interval applied to unknown or empty classification codes.
pub const DEFAULT_INTERVAL_DAYS: u64 = 30;

/// A client classification, normalized for interval lookup.
///
/// Codes are not validated against a closed set: anything outside the
/// interval table falls back to [`DEFAULT_INTERVAL_DAYS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassificationCode(String);

impl ClassificationCode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn interval_days(&self) -> u64 {
        match self.0.as_str() {
            "AA" => 7,
            "AM" => 15,
            "AF" | "BM" | "BF" | "ZZ" => 30,
            "QQ" | "SC" => 60,
            _ => DEFAULT_INTERVAL_DAYS,
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Stops at [`NaiveDate::MAX`] if the calendar runs out first.
fn skip_weekend(mut date: NaiveDate) -> NaiveDate {
    while is_weekend(date) {
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    date
}

/// Computes the follow-up date for a contact made on `contact_date` with a
/// client classified as `classification_code`.
///
/// The result is never a Saturday, a Sunday or a member of `holidays`, and is
/// always at least the classification interval after `contact_date`. Near the
/// end of the representable calendar the result saturates at the last date
/// reached instead of overflowing.
pub fn compute_next_contact(
    contact_date: NaiveDate,
    classification_code: &str,
    holidays: &HashSet<NaiveDate>,
) -> NaiveDate {
    let interval = ClassificationCode::new(classification_code).interval_days();

    let raw = contact_date
        .checked_add_days(Days::new(interval))
        .unwrap_or(NaiveDate::MAX);

    let mut candidate = skip_weekend(raw);
    while holidays.contains(&candidate) {
        let Some(next) = candidate.succ_opt() else {
            break;
        };
        candidate = skip_weekend(next);
    }

    candidate
}

/// Builds the holiday set used when scheduling from `contact_date`.
///
/// Exact-date holidays are taken as stored. Recurring holidays are expanded
/// onto the contact year and the following one, which covers every interval
/// in the table. Rows with an unparsable date are ignored, as are recurring
/// February 29ths in non-leap years.
pub fn holiday_set_for(holidays: &[Holiday], contact_date: NaiveDate) -> HashSet<NaiveDate> {
    let years = [contact_date.year(), contact_date.year() + 1];
    holidays
        .iter()
        .flat_map(|holiday| holiday.occurrences(&years))
        .collect()
}
