use super::MessageResponse;
use crate::domain::entities::{
    AuthenticatedUser, ChangePasswordRequest, LoginRequest, LoginResponse, UserResponse,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{extract::State, http::StatusCode, Json};

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.auth_service.logout(&auth_user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> Json<UserResponse> {
    Json(auth_user.user.into())
}

pub async fn change_password(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth_service.change_password(&auth_user, request).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
