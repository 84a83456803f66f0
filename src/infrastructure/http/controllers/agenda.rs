use crate::application::services::agenda_service::DEFAULT_AGENDA_PER_PAGE;
use crate::domain::entities::{
    AgendaEntry, AgendaFilter, AgendaNotification, AgendaStats, AuthenticatedUser, GroupedAgenda,
    PageRequest, Paginated,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::shared::utils::dates::normalize_iso_date;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgendaListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub seller: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub overdue_only: bool,
}

pub async fn list_agenda(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<AgendaListParams>,
) -> ApiResult<Json<Paginated<AgendaEntry>>> {
    let filter = AgendaFilter {
        seller: params.seller,
        start_date: normalize_iso_date(params.start_date.as_deref()),
        end_date: normalize_iso_date(params.end_date.as_deref()),
        ..Default::default()
    };
    let page = PageRequest::new(params.page, params.per_page, DEFAULT_AGENDA_PER_PAGE);

    let agenda = state
        .agenda_service
        .list_agenda(&auth_user, filter, params.overdue_only, page)
        .await?;
    Ok(Json(agenda))
}

pub async fn grouped_agenda(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<GroupedAgenda>> {
    Ok(Json(state.agenda_service.grouped_agenda(&auth_user).await?))
}

pub async fn agenda_stats(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<AgendaStats>> {
    Ok(Json(state.agenda_service.agenda_stats(&auth_user).await?))
}

pub async fn notifications(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<AgendaNotification>>> {
    Ok(Json(state.agenda_service.notifications(&auth_user).await?))
}
