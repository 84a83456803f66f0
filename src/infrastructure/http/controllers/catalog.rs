use crate::domain::entities::{AuthenticatedUser, CatalogEntry, CatalogKind};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{extract::State, Json};

pub async fn list_contact_types(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<CatalogEntry>>> {
    let entries = state
        .contact_service
        .list_catalog(CatalogKind::ContactTypes)
        .await?;
    Ok(Json(entries))
}

pub async fn list_contact_results(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<CatalogEntry>>> {
    let entries = state
        .contact_service
        .list_catalog(CatalogKind::ContactResults)
        .await?;
    Ok(Json(entries))
}
