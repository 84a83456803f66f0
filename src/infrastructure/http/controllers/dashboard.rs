use crate::domain::entities::{AuthenticatedUser, DashboardFilter, DashboardStats};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::shared::utils::dates::normalize_iso_date;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub seller: Option<String>,
    pub branch: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<DashboardParams>,
) -> ApiResult<Json<DashboardStats>> {
    let filter = DashboardFilter {
        seller: params.seller,
        branch: params.branch,
        start_date: normalize_iso_date(params.start_date.as_deref()),
        end_date: normalize_iso_date(params.end_date.as_deref()),
    };
    Ok(Json(state.dashboard_service.stats(&auth_user, filter).await?))
}
