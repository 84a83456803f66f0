use crate::domain::entities::Session;
use crate::infrastructure::http::middleware::error::ApiResult;

/// Bearer sessions, keyed by their token.
#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(&self, session: &Session) -> ApiResult<()>;
    async fn find_session(&self, token: &str) -> ApiResult<Option<Session>>;
    async fn remove_session(&self, token: &str) -> ApiResult<()>;
    /// Returns the number of sessions removed.
    async fn remove_user_sessions(&self, user_id: &str) -> ApiResult<u64>;
    async fn touch_session(&self, token: &str, accessed_at: &str) -> ApiResult<()>;
    /// Removes sessions whose expiry is before `now` (RFC3339).
    async fn remove_expired_sessions(&self, now: &str) -> ApiResult<u64>;
}
