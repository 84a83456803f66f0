use super::{contacts::ContactListParams, csv_attachment};
use crate::domain::entities::{
    AuthenticatedUser, ImportMode, ImportResponse, Permission,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub mode: String,
}

pub async fn import_clients(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    auth_user.require(Permission::UploadSpreadsheets)?;
    let mode: ImportMode = params.mode.parse()?;

    let stats = state.spreadsheet_service.import_clients(&body, mode).await?;
    let message = match mode {
        ImportMode::Add => format!(
            "Clients added successfully. {} existing clients were skipped",
            stats.skipped
        ),
        ImportMode::Replace => "Client base replaced successfully".to_string(),
    };

    Ok(Json(ImportResponse { message, stats }))
}

pub async fn client_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Response> {
    auth_user.require(Permission::UploadSpreadsheets)?;
    let body = state.spreadsheet_service.client_template()?;
    Ok(csv_attachment("clients_template.csv", body))
}

pub async fn export_clients(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Response> {
    auth_user.require(Permission::ExportData)?;
    let body = state.spreadsheet_service.export_clients().await?;
    Ok(csv_attachment("clients.csv", body))
}

/// Accepts the same filters as the contact list.
pub async fn export_contacts(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<ContactListParams>,
) -> ApiResult<Response> {
    auth_user.require(Permission::ExportData)?;
    let body = state
        .spreadsheet_service
        .export_contacts(&params.filter())
        .await?;
    Ok(csv_attachment("contacts.csv", body))
}
