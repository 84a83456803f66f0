use crate::application::services::contact_service::DEFAULT_CONTACTS_PER_PAGE;
use crate::domain::entities::{
    AuthenticatedUser, ContactEventFilter, ContactEventView, CreateContactEventRequest,
    PageRequest, Paginated, Permission, UpdateContactEventRequest,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::shared::utils::dates::normalize_iso_date;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ContactListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub seller: Option<String>,
    pub contact_type: Option<String>,
    pub contact_result: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ContactListParams {
    /// Malformed dates are dropped rather than rejected.
    pub fn filter(&self) -> ContactEventFilter {
        ContactEventFilter {
            search: self.search.clone(),
            seller: self.seller.clone(),
            contact_type: self.contact_type.clone(),
            contact_result: self.contact_result.clone(),
            start_date: normalize_iso_date(self.start_date.as_deref()),
            end_date: normalize_iso_date(self.end_date.as_deref()),
            ..Default::default()
        }
    }
}

pub async fn list_contacts(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<ContactListParams>,
) -> ApiResult<Json<Paginated<ContactEventView>>> {
    auth_user.require(Permission::ViewClients)?;

    let page = PageRequest::new(params.page, params.per_page, DEFAULT_CONTACTS_PER_PAGE);
    let contacts = state
        .contact_service
        .list_contacts(&auth_user, params.filter(), page)
        .await?;
    Ok(Json(contacts))
}

pub async fn create_contact(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateContactEventRequest>,
) -> ApiResult<(StatusCode, Json<ContactEventView>)> {
    auth_user.require(Permission::CreateContacts)?;
    let contact = state
        .contact_service
        .create_contact(&auth_user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn get_contact(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContactEventView>> {
    auth_user.require(Permission::ViewClients)?;
    Ok(Json(state.contact_service.get_contact(&auth_user, &id).await?))
}

pub async fn update_contact(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateContactEventRequest>,
) -> ApiResult<Json<ContactEventView>> {
    auth_user.require(Permission::EditContacts)?;
    let contact = state
        .contact_service
        .update_contact(&auth_user, &id, request)
        .await?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(Permission::DeleteContacts)?;
    state.contact_service.delete_contact(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sellers(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<String>>> {
    auth_user.require(Permission::ViewClients)?;
    Ok(Json(state.contact_service.list_sellers().await?))
}
