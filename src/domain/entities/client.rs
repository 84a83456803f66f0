use super::GroupCount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub code: i64,
    pub city: Option<String>,
    pub branch: Option<String>,
    pub parts_potential: f64,
    pub service_potential: f64,
    pub status_6m: Option<String>,
    /// `YYYY-MM-DD`
    pub last_movement: Option<String>,
    /// Classification code driving the follow-up cadence.
    pub classification: Option<String>,
    pub parts_consultant: Option<String>,
    pub service_consultant: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Client {
    pub fn new(name: String, code: i64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            code,
            city: None,
            branch: None,
            parts_potential: 0.0,
            service_potential: 0.0,
            status_6m: None,
            last_movement: None,
            classification: None,
            parts_consultant: None,
            service_consultant: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The classification with surrounding whitespace removed, if any is left.
    pub fn classification_code(&self) -> Option<&str> {
        self.classification
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateClientRequest {
    #[serde(default)]
    pub name: String,
    pub code: Option<i64>,
    pub city: Option<String>,
    pub branch: Option<String>,
    pub parts_potential: Option<f64>,
    pub service_potential: Option<f64>,
    pub status_6m: Option<String>,
    pub last_movement: Option<String>,
    pub classification: Option<String>,
    pub parts_consultant: Option<String>,
    pub service_consultant: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub code: Option<i64>,
    pub city: Option<String>,
    pub branch: Option<String>,
    pub parts_potential: Option<f64>,
    pub service_potential: Option<f64>,
    pub status_6m: Option<String>,
    pub last_movement: Option<String>,
    pub classification: Option<String>,
    pub parts_consultant: Option<String>,
    pub service_consultant: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Substring over name, code and city.
    pub search: Option<String>,
    /// Substring over the code only.
    pub code: Option<String>,
    pub branch: Option<String>,
    pub classification: Option<String>,
    pub parts_consultant: Option<String>,
    pub service_consultant: Option<String>,
}

/// Compact row returned by the quick search endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: String,
    pub code: i64,
    pub name: String,
    pub city: Option<String>,
    pub branch: Option<String>,
    pub classification: Option<String>,
}

impl From<Client> for ClientSummary {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            code: client.code,
            name: client.name,
            city: client.city,
            branch: client.branch,
            classification: client.classification,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub total_clients: i64,
    pub by_branch: Vec<GroupCount>,
    pub by_classification: Vec<GroupCount>,
    pub by_parts_consultant: Vec<GroupCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_code_trims_and_drops_blank() {
        let mut client = Client::new("Oficina".to_string(), 10);
        assert_eq!(client.classification_code(), None);

        client.classification = Some("   ".to_string());
        assert_eq!(client.classification_code(), None);

        client.classification = Some(" aa ".to_string());
        assert_eq!(client.classification_code(), Some("aa"));
    }
}
