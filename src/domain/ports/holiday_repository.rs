use crate::domain::entities::Holiday;
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait HolidayRepository: Send + Sync {
    async fn create_holiday(&self, holiday: &Holiday) -> ApiResult<()>;
    async fn get_holiday(&self, id: &str) -> ApiResult<Option<Holiday>>;
    async fn get_holiday_by_date(&self, date: &str) -> ApiResult<Option<Holiday>>;
    /// Every holiday ordered by date.
    async fn list_holidays(&self) -> ApiResult<Vec<Holiday>>;
    async fn update_holiday(&self, holiday: &Holiday) -> ApiResult<()>;
    async fn delete_holiday(&self, id: &str) -> ApiResult<()>;
}
