use crate::domain::entities::{
    AgendaFilter, CatalogEntry, CatalogKind, ContactEvent, ContactEventFilter, ContactEventView,
    ContactGroupField, GroupCount,
};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait ContactEventRepository: Send + Sync {
    async fn create_contact_event(&self, event: &ContactEvent) -> ApiResult<()>;
    async fn get_contact_event(&self, id: &str) -> ApiResult<Option<ContactEventView>>;
    /// Persists every mutable column of `event`.
    async fn update_contact_event(&self, event: &ContactEvent) -> ApiResult<()>;
    async fn delete_contact_event(&self, id: &str) -> ApiResult<()>;
    /// Ordered by contact date then contact time, newest first.
    async fn list_contact_events(
        &self,
        filter: &ContactEventFilter,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<ContactEventView>>;
    async fn count_contact_events(&self, filter: &ContactEventFilter) -> ApiResult<i64>;
    async fn group_contact_events(
        &self,
        filter: &ContactEventFilter,
        field: ContactGroupField,
    ) -> ApiResult<Vec<GroupCount>>;
    async fn list_sellers(&self) -> ApiResult<Vec<String>>;

    /// Latest event of each client carrying a next contact date, ordered by
    /// that date. `page` is `(limit, offset)`; `None` returns every row.
    async fn list_agenda_events(
        &self,
        filter: &AgendaFilter,
        page: Option<(i64, i64)>,
    ) -> ApiResult<Vec<ContactEventView>>;
    async fn count_agenda_events(&self, filter: &AgendaFilter) -> ApiResult<i64>;

    async fn list_catalog(&self, kind: CatalogKind) -> ApiResult<Vec<CatalogEntry>>;
}
