use crate::domain::entities::Session;
use crate::domain::ports::session_repository::SessionRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;

use super::auth_service::generate_session_token;

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Opens, resolves and expires bearer sessions.
#[derive(Clone)]
pub struct SessionService {
    session_repo: Arc<dyn SessionRepository>,
    duration_hours: i64,
}

impl SessionService {
    pub fn new(session_repo: Arc<dyn SessionRepository>, duration_hours: i64) -> Self {
        Self {
            session_repo,
            duration_hours,
        }
    }

    /// Starts a session with a fresh token for `user_id`.
    pub async fn open(&self, user_id: &str) -> ApiResult<Session> {
        let session = Session::new(
            user_id.to_string(),
            generate_session_token(),
            self.duration_hours,
        );
        self.session_repo.insert_session(&session).await?;
        Ok(session)
    }

    /// The live session behind `token`. An expired one is deleted on sight.
    pub async fn resolve(&self, token: &str) -> ApiResult<Session> {
        let session = self
            .session_repo
            .find_session(token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

        if session.is_expired() {
            if let Err(e) = self.session_repo.remove_session(token).await {
                tracing::warn!("Failed to drop expired session: {}", e);
            }
            return Err(ApiError::Unauthorized("Session expired".to_string()));
        }

        Ok(session)
    }

    /// Best effort; a failed update never rejects the request.
    pub async fn touch(&self, session: &Session) {
        if let Err(e) = self
            .session_repo
            .touch_session(&session.token, &now_rfc3339())
            .await
        {
            tracing::warn!("Failed to touch session of user {}: {}", session.user_id, e);
        }
    }

    pub async fn close(&self, token: &str) -> ApiResult<()> {
        self.session_repo.remove_session(token).await
    }

    /// Signs the user out everywhere.
    pub async fn revoke_user(&self, user_id: &str) -> ApiResult<u64> {
        self.session_repo.remove_user_sessions(user_id).await
    }

    pub async fn sweep_expired(&self) -> ApiResult<u64> {
        self.session_repo
            .remove_expired_sessions(&now_rfc3339())
            .await
    }
}
