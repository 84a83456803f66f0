use crate::application::services::client_service::DEFAULT_CLIENTS_PER_PAGE;
use crate::domain::entities::{
    AuthenticatedUser, Client, ClientFilter, ClientStats, ClientSummary, CreateClientRequest,
    PageRequest, Paginated, Permission, UpdateClientRequest,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ClientListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub branch: Option<String>,
    pub classification: Option<String>,
    pub parts_consultant: Option<String>,
    pub service_consultant: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClientSearchParams {
    pub q: Option<String>,
    pub code: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_clients(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<ClientListParams>,
) -> ApiResult<Json<Paginated<Client>>> {
    auth_user.require(Permission::ViewClients)?;

    let filter = ClientFilter {
        search: params.search,
        code: None,
        branch: params.branch,
        classification: params.classification,
        parts_consultant: params.parts_consultant,
        service_consultant: params.service_consultant,
    };
    let page = PageRequest::new(params.page, params.per_page, DEFAULT_CLIENTS_PER_PAGE);
    Ok(Json(state.client_service.list_clients(&filter, page).await?))
}

pub async fn search_clients(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<ClientSearchParams>,
) -> ApiResult<Json<Vec<ClientSummary>>> {
    auth_user.require(Permission::ViewClients)?;
    let clients = state
        .client_service
        .search_clients(params.q, params.code, params.limit)
        .await?;
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    auth_user.require(Permission::ViewClients)?;
    Ok(Json(state.client_service.get_client(&id).await?))
}

pub async fn get_client_by_code(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(code): Path<i64>,
) -> ApiResult<Json<Client>> {
    auth_user.require(Permission::ViewClients)?;
    Ok(Json(state.client_service.get_client_by_code(code).await?))
}

pub async fn create_client(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    auth_user.require(Permission::EditClients)?;
    let client = state.client_service.create_client(request).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateClientRequest>,
) -> ApiResult<Json<Client>> {
    auth_user.require(Permission::EditClients)?;
    Ok(Json(state.client_service.update_client(&id, request).await?))
}

pub async fn delete_client(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(Permission::EditClients)?;
    state.client_service.delete_client(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn client_stats(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<ClientStats>> {
    auth_user.require(Permission::ViewClients)?;
    Ok(Json(state.client_service.client_stats().await?))
}

pub async fn list_branches(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<String>>> {
    auth_user.require(Permission::ViewClients)?;
    Ok(Json(state.client_service.list_branches().await?))
}
