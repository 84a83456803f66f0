use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One logged sales contact with a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactEvent {
    pub id: String,
    pub client_id: String,
    /// `YYYY-MM-DD`
    pub contact_date: String,
    pub contact_type: String,
    pub contact_result: String,
    pub notes: Option<String>,
    pub seller: String,
    /// `YYYY-MM-DD`; never a weekend or holiday when computed by the scheduler.
    pub next_contact_date: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    pub contact_time: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ContactEvent {
    pub fn new(
        client_id: String,
        contact_date: String,
        contact_type: String,
        contact_result: String,
        seller: String,
        contact_time: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            client_id,
            contact_date,
            contact_type,
            contact_result,
            notes: None,
            seller,
            next_contact_date: None,
            contact_time,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A contact event joined with the client it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactEventView {
    #[serde(flatten)]
    pub event: ContactEvent,
    pub client_name: Option<String>,
    pub client_code: Option<i64>,
}

/// Distinguishes an absent field (`None`) from an explicit value (`Some`).
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateContactEventRequest {
    pub client_id: Option<String>,
    pub contact_type: Option<String>,
    pub contact_result: Option<String>,
    /// Older clients send the result under this name.
    pub result: Option<String>,
    pub notes: Option<String>,
    pub seller: Option<String>,
    pub contact_date: Option<String>,
    pub contact_time: Option<String>,
    pub next_contact_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateContactEventRequest {
    pub contact_type: Option<String>,
    pub contact_result: Option<String>,
    pub notes: Option<String>,
    pub seller: Option<String>,
    /// `Some(None)` or `Some(Some(""))` clears the date.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub next_contact_date: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactEventFilter {
    /// Substring over client name, client code and notes.
    pub search: Option<String>,
    /// Substring over the seller name.
    pub seller: Option<String>,
    /// Exact seller restriction for users who only see their own contacts.
    pub owner: Option<String>,
    pub contact_type: Option<String>,
    pub contact_result: Option<String>,
    /// Inclusive bounds over `contact_date`.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Exclusive upper bound over `next_contact_date`.
    pub next_contact_before: Option<String>,
}

/// Columns contact events can be counted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactGroupField {
    Seller,
    ContactType,
    ContactResult,
}

impl ContactGroupField {
    pub fn column(&self) -> &'static str {
        match self {
            ContactGroupField::Seller => "e.seller",
            ContactGroupField::ContactType => "e.contact_type",
            ContactGroupField::ContactResult => "e.contact_result",
        }
    }
}

/// An entry of the contact-type or contact-result catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub code: String,
    pub description: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    ContactTypes,
    ContactResults,
}

impl CatalogKind {
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::ContactTypes => "contact_types",
            CatalogKind::ContactResults => "contact_results",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_absent_and_null() {
        let absent: UpdateContactEventRequest = serde_json::from_str(r#"{"notes":"x"}"#).unwrap();
        assert_eq!(absent.next_contact_date, None);

        let null: UpdateContactEventRequest =
            serde_json::from_str(r#"{"next_contact_date":null}"#).unwrap();
        assert_eq!(null.next_contact_date, Some(None));

        let set: UpdateContactEventRequest =
            serde_json::from_str(r#"{"next_contact_date":"2025-03-10"}"#).unwrap();
        assert_eq!(set.next_contact_date, Some(Some("2025-03-10".to_string())));
    }

    #[test]
    fn test_view_flattens_event_fields() {
        let event = ContactEvent::new(
            "c1".to_string(),
            "2025-01-01".to_string(),
            "V".to_string(),
            "1".to_string(),
            "Joao".to_string(),
            "2025-01-01 09:30:00".to_string(),
        );
        let view = ContactEventView {
            event,
            client_name: Some("Oficina".to_string()),
            client_code: Some(10),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["contact_type"], "V");
        assert_eq!(json["client_name"], "Oficina");
        assert_eq!(json["client_code"], 10);
    }
}
