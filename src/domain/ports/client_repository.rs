use crate::domain::entities::{Client, ClientFilter, ClientStats};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create_client(&self, client: &Client) -> ApiResult<()>;
    async fn get_client_by_id(&self, id: &str) -> ApiResult<Option<Client>>;
    async fn get_client_by_code(&self, code: i64) -> ApiResult<Option<Client>>;
    /// Persists every mutable column of `client`.
    async fn update_client(&self, client: &Client) -> ApiResult<()>;
    async fn delete_client(&self, id: &str) -> ApiResult<()>;
    async fn list_clients(
        &self,
        filter: &ClientFilter,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<Client>>;
    async fn count_clients(&self, filter: &ClientFilter) -> ApiResult<i64>;
    /// Every client ordered by code, for exports.
    async fn list_all_clients(&self) -> ApiResult<Vec<Client>>;
    async fn count_client_contacts(&self, client_id: &str) -> ApiResult<i64>;
    async fn client_stats(&self) -> ApiResult<ClientStats>;
    async fn list_branches(&self) -> ApiResult<Vec<String>>;
}
