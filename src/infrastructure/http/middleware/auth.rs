use crate::application::services::{
    AgendaService, AuthService, ClientService, ContactService, DashboardService, HolidayService,
    SessionService, SpreadsheetService, UserService,
};
use crate::domain::entities::AuthenticatedUser;
use crate::infrastructure::http::middleware::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

#[derive(Clone)]
pub struct AppState {
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; empty or `*` allows any.
    pub cors_origins: Vec<String>,
    pub auth_service: AuthService,
    pub session_service: SessionService,
    pub user_service: UserService,
    pub client_service: ClientService,
    pub contact_service: ContactService,
    pub agenda_service: AgendaService,
    pub dashboard_service: DashboardService,
    pub holiday_service: HolidayService,
    pub spreadsheet_service: SpreadsheetService,
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Extract and validate the session token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let session = state.session_service.resolve(&token).await?;

    let user = state
        .user_service
        .get_user_by_id(&session.user_id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    if !user.active {
        return Err(ApiError::Unauthorized("User is inactive".to_string()));
    }

    state.session_service.touch(&session).await;

    request.extensions_mut().insert(AuthenticatedUser {
        user,
        session,
        token,
    });

    Ok(next.run(request).await)
}
