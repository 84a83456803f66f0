use crate::domain::entities::{
    AuthenticatedUser, CreateHolidayRequest, Holiday, HolidayListResponse, ImportResponse,
    Permission, UpdateHolidayRequest,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list_holidays(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<HolidayListResponse>> {
    let holidays = state.holiday_service.list_holidays().await?;
    let count = holidays.len() as i64;
    Ok(Json(HolidayListResponse { holidays, count }))
}

pub async fn get_holiday(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Holiday>> {
    Ok(Json(state.holiday_service.get_holiday(&id).await?))
}

pub async fn create_holiday(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateHolidayRequest>,
) -> ApiResult<(StatusCode, Json<Holiday>)> {
    auth_user.require(Permission::ManageUsers)?;
    let holiday = state.holiday_service.create_holiday(request).await?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

pub async fn update_holiday(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateHolidayRequest>,
) -> ApiResult<Json<Holiday>> {
    auth_user.require(Permission::ManageUsers)?;
    Ok(Json(state.holiday_service.update_holiday(&id, request).await?))
}

pub async fn delete_holiday(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(Permission::ManageUsers)?;
    state.holiday_service.delete_holiday(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// CSV body with a `DATA`/`DATE` column and an optional `DESCRICAO`/`NAME` column.
pub async fn import_holidays(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    auth_user.require(Permission::ManageUsers)?;
    let stats = state.spreadsheet_service.import_holidays(&body).await?;
    Ok(Json(ImportResponse {
        message: format!(
            "{} holidays imported, {} already registered",
            stats.imported, stats.skipped
        ),
        stats,
    }))
}
