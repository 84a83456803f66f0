use crate::domain::entities::{User, UserFilter, UserStats};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> ApiResult<()>;
    async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> ApiResult<Option<User>>;
    /// Persists every mutable column of `user`.
    async fn update_user(&self, user: &User) -> ApiResult<()>;
    async fn update_last_login(&self, id: &str, at: &str) -> ApiResult<()>;
    async fn list_users(&self, filter: &UserFilter, limit: i64, offset: i64) -> ApiResult<Vec<User>>;
    async fn count_users(&self, filter: &UserFilter) -> ApiResult<i64>;
    async fn user_stats(&self) -> ApiResult<UserStats>;
}
