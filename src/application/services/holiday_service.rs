use crate::domain::entities::{CreateHolidayRequest, Holiday, UpdateHolidayRequest};
use crate::domain::ports::holiday_repository::HolidayRepository;
use crate::domain::services::holiday_set_for;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::dates::{format_date, require_iso_date};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct HolidayService {
    holiday_repo: Arc<dyn HolidayRepository>,
}

impl HolidayService {
    pub fn new(holiday_repo: Arc<dyn HolidayRepository>) -> Self {
        Self { holiday_repo }
    }

    pub async fn list_holidays(&self) -> ApiResult<Vec<Holiday>> {
        self.holiday_repo.list_holidays().await
    }

    pub async fn get_holiday(&self, id: &str) -> ApiResult<Holiday> {
        self.holiday_repo
            .get_holiday(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Holiday {} not found", id)))
    }

    async fn ensure_date_available(&self, date: &str, except_id: Option<&str>) -> ApiResult<()> {
        match self.holiday_repo.get_holiday_by_date(date).await? {
            Some(existing) if Some(existing.id.as_str()) != except_id => Err(ApiError::Conflict(
                format!("A holiday already exists on {}", date),
            )),
            _ => Ok(()),
        }
    }

    pub async fn create_holiday(&self, request: CreateHolidayRequest) -> ApiResult<Holiday> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        let date = format_date(require_iso_date(&request.date, "date")?);
        self.ensure_date_available(&date, None).await?;

        let holiday = Holiday::new(name, date, request.recurring);
        self.holiday_repo.create_holiday(&holiday).await?;
        tracing::info!("Created holiday {} on {}", holiday.name, holiday.date);

        Ok(holiday)
    }

    pub async fn update_holiday(&self, id: &str, request: UpdateHolidayRequest) -> ApiResult<Holiday> {
        let mut holiday = self.get_holiday(id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
            }
            holiday.name = name;
        }
        if let Some(date) = request.date {
            let date = format_date(require_iso_date(&date, "date")?);
            self.ensure_date_available(&date, Some(&holiday.id)).await?;
            holiday.date = date;
        }
        if let Some(recurring) = request.recurring {
            holiday.recurring = recurring;
        }

        holiday.updated_at = chrono::Utc::now().to_rfc3339();
        self.holiday_repo.update_holiday(&holiday).await?;
        tracing::info!("Updated holiday {}", holiday.id);

        Ok(holiday)
    }

    pub async fn delete_holiday(&self, id: &str) -> ApiResult<()> {
        let holiday = self.get_holiday(id).await?;
        self.holiday_repo.delete_holiday(&holiday.id).await?;
        tracing::info!("Deleted holiday {} on {}", holiday.name, holiday.date);
        Ok(())
    }

    /// Non-business days relevant to a follow-up computed from `contact_date`.
    pub async fn holiday_set(&self, contact_date: NaiveDate) -> ApiResult<HashSet<NaiveDate>> {
        let holidays = self.holiday_repo.list_holidays().await?;
        Ok(holiday_set_for(&holidays, contact_date))
    }
}
