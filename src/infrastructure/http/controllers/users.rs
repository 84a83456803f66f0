use super::MessageResponse;
use crate::application::services::user_service::DEFAULT_USERS_PER_PAGE;
use crate::domain::entities::{
    AuthenticatedUser, CreateUserRequest, PageRequest, Paginated, Permission,
    ResetPasswordRequest, UpdateUserRequest, UserFilter, UserResponse, UserStats,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list_users(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<UserListParams>,
) -> ApiResult<Json<Paginated<UserResponse>>> {
    auth_user.require(Permission::ManageUsers)?;

    let filter = UserFilter {
        search: params.search,
        active_only: params.active_only,
    };
    let page = PageRequest::new(params.page, params.per_page, DEFAULT_USERS_PER_PAGE);
    Ok(Json(state.user_service.list_users(&filter, page).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(Permission::ManageUsers)?;
    Ok(Json(state.user_service.get_user(&id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    auth_user.require(Permission::ManageUsers)?;
    let user = state.user_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(Permission::ManageUsers)?;
    Ok(Json(state.user_service.update_user(&id, request).await?))
}

/// Soft delete: the user is deactivated and their sessions revoked.
pub async fn delete_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(Permission::ManageUsers)?;
    Ok(Json(state.user_service.deactivate_user(&auth_user, &id).await?))
}

pub async fn toggle_user_status(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(Permission::ManageUsers)?;
    Ok(Json(
        state.user_service.toggle_user_status(&auth_user, &id).await?,
    ))
}

pub async fn reset_password(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    auth_user.require(Permission::ManageUsers)?;
    state.user_service.reset_password(&id, request).await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

pub async fn user_stats(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<UserStats>> {
    auth_user.require(Permission::ManageUsers)?;
    Ok(Json(state.user_service.user_stats().await?))
}
