use chrono::{NaiveDate, NaiveDateTime};

/// Source of "now" for date-relative queries (agenda, dashboard, defaults).
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
