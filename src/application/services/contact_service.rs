use crate::domain::entities::{
    AuthenticatedUser, CatalogEntry, CatalogKind, ContactEvent, ContactEventFilter,
    ContactEventView, CreateContactEventRequest, PageRequest, Paginated,
    UpdateContactEventRequest,
};
use crate::domain::ports::{Clock, ClientRepository, ContactEventRepository};
use crate::domain::services::compute_next_contact;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::dates::{
    format_date, format_date_time, parse_iso_date, resolve_contact_time,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;

use super::HolidayService;

pub const DEFAULT_CONTACTS_PER_PAGE: i64 = 50;

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Field {} is required", field)))
}

#[derive(Clone)]
pub struct ContactService {
    contact_repo: Arc<dyn ContactEventRepository>,
    client_repo: Arc<dyn ClientRepository>,
    holiday_service: HolidayService,
    clock: Arc<dyn Clock>,
}

impl ContactService {
    pub fn new(
        contact_repo: Arc<dyn ContactEventRepository>,
        client_repo: Arc<dyn ClientRepository>,
        holiday_service: HolidayService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contact_repo,
            client_repo,
            holiday_service,
            clock,
        }
    }

    /// Holidays for scheduling; an unavailable calendar only costs the
    /// holiday adjustment, never the contact.
    async fn holidays_for(&self, contact_date: NaiveDate) -> HashSet<NaiveDate> {
        match self.holiday_service.holiday_set(contact_date).await {
            Ok(holidays) => holidays,
            Err(e) => {
                tracing::warn!(
                    "Holiday lookup failed, scheduling with weekends only: {}",
                    e
                );
                HashSet::new()
            }
        }
    }

    /// Records a contact and schedules its follow-up. Callers restricted to
    /// their own contacts always log under their own name.
    pub async fn create_contact(
        &self,
        actor: &AuthenticatedUser,
        request: CreateContactEventRequest,
    ) -> ApiResult<ContactEventView> {
        let client_id = required(request.client_id, "client_id")?;
        let contact_type = required(request.contact_type, "contact_type")?;
        let contact_result = required(request.contact_result.or(request.result), "contact_result")?;
        let seller = match actor.contact_owner() {
            Some(owner) => owner,
            None => required(request.seller, "seller")?,
        };

        let client = self
            .client_repo
            .get_client_by_id(&client_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

        let now = self.clock.now();
        let contact_date = request
            .contact_date
            .as_deref()
            .and_then(parse_iso_date)
            .unwrap_or(now.date());
        let contact_time = resolve_contact_time(request.contact_time.as_deref(), contact_date, now);

        let mut event = ContactEvent::new(
            client.id.clone(),
            format_date(contact_date),
            contact_type,
            contact_result,
            seller,
            format_date_time(contact_time),
        );
        event.notes = request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let explicit_next = request.next_contact_date.as_deref().and_then(parse_iso_date);
        event.next_contact_date = match (explicit_next, client.classification_code()) {
            (Some(next), _) => Some(format_date(next)),
            (None, Some(code)) => {
                let holidays = self.holidays_for(contact_date).await;
                let next = compute_next_contact(contact_date, code, &holidays);
                metrics::counter!("oxicrm_follow_ups_scheduled_total").increment(1);
                tracing::debug!(
                    "Scheduled follow-up for client {} ({}) on {}",
                    client.id,
                    code,
                    next
                );
                Some(format_date(next))
            }
            (None, None) => None,
        };

        self.contact_repo.create_contact_event(&event).await?;
        metrics::counter!("oxicrm_contacts_created_total").increment(1);
        tracing::info!(
            "Contact {} registered for client {} by {}",
            event.id,
            client.id,
            event.seller
        );

        Ok(ContactEventView {
            event,
            client_name: Some(client.name),
            client_code: Some(client.code),
        })
    }

    pub async fn list_contacts(
        &self,
        actor: &AuthenticatedUser,
        mut filter: ContactEventFilter,
        page: PageRequest,
    ) -> ApiResult<Paginated<ContactEventView>> {
        filter.owner = actor.contact_owner();

        let contacts = self
            .contact_repo
            .list_contact_events(&filter, page.limit(), page.offset())
            .await?;
        let total = self.contact_repo.count_contact_events(&filter).await?;

        Ok(Paginated::new(contacts, page, total))
    }

    async fn require_contact(&self, id: &str) -> ApiResult<ContactEventView> {
        self.contact_repo
            .get_contact_event(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))
    }

    pub async fn get_contact(
        &self,
        actor: &AuthenticatedUser,
        id: &str,
    ) -> ApiResult<ContactEventView> {
        let contact = self.require_contact(id).await?;
        if !actor.owns_contact(&contact.event.seller) {
            return Err(ApiError::Forbidden(
                "You can only view your own contacts".to_string(),
            ));
        }
        Ok(contact)
    }

    pub async fn update_contact(
        &self,
        actor: &AuthenticatedUser,
        id: &str,
        request: UpdateContactEventRequest,
    ) -> ApiResult<ContactEventView> {
        let mut contact = self.require_contact(id).await?;
        if !actor.owns_contact(&contact.event.seller) {
            return Err(ApiError::Forbidden(
                "You can only edit your own contacts".to_string(),
            ));
        }

        let event = &mut contact.event;
        if let Some(contact_type) = request.contact_type {
            event.contact_type = contact_type;
        }
        if let Some(contact_result) = request.contact_result {
            event.contact_result = contact_result;
        }
        if let Some(notes) = request.notes {
            event.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }
        if let Some(seller) = request.seller {
            let seller = required(Some(seller), "seller")?;
            if !actor.owns_contact(&seller) {
                return Err(ApiError::Forbidden(
                    "You cannot reassign contacts to another seller".to_string(),
                ));
            }
            event.seller = seller;
        }
        match request.next_contact_date {
            None => {}
            Some(None) => event.next_contact_date = None,
            Some(Some(raw)) if raw.trim().is_empty() => event.next_contact_date = None,
            // unparsable dates leave the current value alone
            Some(Some(raw)) => {
                if let Some(next) = parse_iso_date(&raw) {
                    event.next_contact_date = Some(format_date(next));
                }
            }
        }

        event.updated_at = chrono::Utc::now().to_rfc3339();
        self.contact_repo.update_contact_event(event).await?;
        tracing::info!("Updated contact {}", event.id);

        Ok(contact)
    }

    pub async fn delete_contact(&self, id: &str) -> ApiResult<()> {
        let contact = self.require_contact(id).await?;
        self.contact_repo.delete_contact_event(&contact.event.id).await?;
        tracing::info!("Deleted contact {}", contact.event.id);
        Ok(())
    }

    pub async fn list_sellers(&self) -> ApiResult<Vec<String>> {
        self.contact_repo.list_sellers().await
    }

    pub async fn list_catalog(&self, kind: CatalogKind) -> ApiResult<Vec<CatalogEntry>> {
        self.contact_repo.list_catalog(kind).await
    }
}
