use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A non-business day excluded from follow-up scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holiday {
    pub id: String,
    pub name: String,
    pub date: String, // YYYY-MM-DD
    pub recurring: bool, // repeats every year on the same month-day
    pub created_at: String,
    pub updated_at: String,
}

impl Holiday {
    pub fn new(name: String, date: String, recurring: bool) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            date,
            recurring,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Concrete dates this holiday blocks within `years`. A recurring 02-29
    /// only lands in leap years; an unparsable date blocks nothing.
    pub fn occurrences(&self, years: &[i32]) -> Vec<NaiveDate> {
        let Ok(date) = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") else {
            return Vec::new();
        };
        if !self.recurring {
            return vec![date];
        }
        years
            .iter()
            .filter_map(|&year| NaiveDate::from_ymd_opt(year, date.month(), date.day()))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHolidayRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String, // YYYY-MM-DD
    #[serde(default)]
    pub recurring: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateHolidayRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub recurring: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HolidayListResponse {
    pub holidays: Vec<Holiday>,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holiday(date: &str, recurring: bool) -> Holiday {
        Holiday::new("Feriado".to_string(), date.to_string(), recurring)
    }

    #[test]
    fn test_fixed_holiday_ignores_years() {
        let dates = holiday("2025-04-18", false).occurrences(&[2030]);
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2025, 4, 18).unwrap()]);
    }

    #[test]
    fn test_recurring_leap_day_skips_common_years() {
        let dates = holiday("2024-02-29", true).occurrences(&[2027, 2028]);
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()]);
        assert!(holiday("not-a-date", true).occurrences(&[2025]).is_empty());
    }
}
