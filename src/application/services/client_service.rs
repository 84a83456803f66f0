use crate::domain::entities::{
    Client, ClientFilter, ClientStats, ClientSummary, CreateClientRequest, PageRequest, Paginated,
    UpdateClientRequest,
};
use crate::domain::ports::client_repository::ClientRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::dates::normalize_iso_date;
use std::sync::Arc;

pub const DEFAULT_CLIENTS_PER_PAGE: i64 = 50;
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ClientService {
    client_repo: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(client_repo: Arc<dyn ClientRepository>) -> Self {
        Self { client_repo }
    }

    pub async fn list_clients(
        &self,
        filter: &ClientFilter,
        page: PageRequest,
    ) -> ApiResult<Paginated<Client>> {
        let clients = self
            .client_repo
            .list_clients(filter, page.limit(), page.offset())
            .await?;
        let total = self.client_repo.count_clients(filter).await?;

        Ok(Paginated::new(clients, page, total))
    }

    pub async fn get_client(&self, id: &str) -> ApiResult<Client> {
        self.client_repo
            .get_client_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))
    }

    pub async fn get_client_by_code(&self, code: i64) -> ApiResult<Client> {
        self.client_repo
            .get_client_by_code(code)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Client with code {} not found", code)))
    }

    async fn ensure_code_available(&self, code: i64, except_id: Option<&str>) -> ApiResult<()> {
        match self.client_repo.get_client_by_code(code).await? {
            Some(existing) if Some(existing.id.as_str()) != except_id => Err(ApiError::Conflict(
                format!("Client code {} already exists", code),
            )),
            _ => Ok(()),
        }
    }

    pub async fn create_client(&self, request: CreateClientRequest) -> ApiResult<Client> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        let code = request
            .code
            .ok_or_else(|| ApiError::BadRequest("Code is required".to_string()))?;

        self.ensure_code_available(code, None).await?;

        let mut client = Client::new(name, code);
        client.city = clean(request.city);
        client.branch = clean(request.branch);
        client.parts_potential = request.parts_potential.unwrap_or(0.0);
        client.service_potential = request.service_potential.unwrap_or(0.0);
        client.status_6m = clean(request.status_6m);
        client.last_movement = normalize_iso_date(request.last_movement.as_deref());
        client.classification = clean(request.classification);
        client.parts_consultant = clean(request.parts_consultant);
        client.service_consultant = clean(request.service_consultant);

        self.client_repo.create_client(&client).await?;
        tracing::info!("Created client {} (code {})", client.id, client.code);

        Ok(client)
    }

    pub async fn update_client(&self, id: &str, request: UpdateClientRequest) -> ApiResult<Client> {
        let mut client = self.get_client(id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
            }
            client.name = name;
        }

        if let Some(code) = request.code {
            if code != client.code {
                self.ensure_code_available(code, Some(&client.id)).await?;
                client.code = code;
            }
        }

        if request.city.is_some() {
            client.city = clean(request.city);
        }
        if request.branch.is_some() {
            client.branch = clean(request.branch);
        }
        if let Some(potential) = request.parts_potential {
            client.parts_potential = potential;
        }
        if let Some(potential) = request.service_potential {
            client.service_potential = potential;
        }
        if request.status_6m.is_some() {
            client.status_6m = clean(request.status_6m);
        }
        if request.last_movement.is_some() {
            client.last_movement = normalize_iso_date(request.last_movement.as_deref());
        }
        if request.classification.is_some() {
            client.classification = clean(request.classification);
        }
        if request.parts_consultant.is_some() {
            client.parts_consultant = clean(request.parts_consultant);
        }
        if request.service_consultant.is_some() {
            client.service_consultant = clean(request.service_consultant);
        }

        client.updated_at = chrono::Utc::now().to_rfc3339();
        self.client_repo.update_client(&client).await?;
        tracing::info!("Updated client {}", client.id);

        Ok(client)
    }

    /// Clients with logged contacts cannot be deleted.
    pub async fn delete_client(&self, id: &str) -> ApiResult<()> {
        let client = self.get_client(id).await?;

        let contacts = self.client_repo.count_client_contacts(&client.id).await?;
        if contacts > 0 {
            return Err(ApiError::BadRequest(format!(
                "Client has {} registered contacts and cannot be deleted",
                contacts
            )));
        }

        self.client_repo.delete_client(&client.id).await?;
        tracing::info!("Deleted client {} (code {})", client.id, client.code);
        Ok(())
    }

    pub async fn client_stats(&self) -> ApiResult<ClientStats> {
        self.client_repo.client_stats().await
    }

    pub async fn list_branches(&self) -> ApiResult<Vec<String>> {
        self.client_repo.list_branches().await
    }

    /// Quick lookup by name/code (`query`) or by code alone (`code`).
    /// With neither, returns the first clients by name.
    pub async fn search_clients(
        &self,
        query: Option<String>,
        code: Option<String>,
        limit: Option<i64>,
    ) -> ApiResult<Vec<ClientSummary>> {
        let limit = match limit {
            Some(n) if n >= 1 => n.min(PageRequest::MAX_PER_PAGE),
            _ => DEFAULT_SEARCH_LIMIT,
        };

        let filter = match clean(code) {
            Some(code) => ClientFilter {
                code: Some(code),
                ..Default::default()
            },
            None => ClientFilter {
                search: clean(query),
                ..Default::default()
            },
        };

        let clients = self.client_repo.list_clients(&filter, limit, 0).await?;
        Ok(clients.into_iter().map(ClientSummary::from).collect())
    }
}
