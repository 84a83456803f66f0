use super::ContactEventView;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgendaStatus {
    Overdue,
    Scheduled,
}

/// A client's latest contact event that carries a pending follow-up.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaEntry {
    #[serde(flatten)]
    pub contact: ContactEventView,
    pub days_overdue: i64,
    pub status: AgendaStatus,
}

impl AgendaEntry {
    /// `None` when the event has no (parsable) next contact date.
    pub fn new(contact: ContactEventView, today: NaiveDate) -> Option<Self> {
        let next = contact
            .event
            .next_contact_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;
        let days_overdue = (today - next).num_days().max(0);
        let status = if days_overdue > 0 {
            AgendaStatus::Overdue
        } else {
            AgendaStatus::Scheduled
        };

        Some(Self {
            contact,
            days_overdue,
            status,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgendaFilter {
    /// Substring over the seller name.
    pub seller: Option<String>,
    /// Exact seller restriction for users who only see their own contacts.
    pub owner: Option<String>,
    /// Inclusive bounds over `next_contact_date`, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Exclusive upper bound over `next_contact_date`.
    pub due_before: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupedAgenda {
    pub scheduled: Vec<ContactEventView>,
    pub overdue: Vec<ContactEventView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AgendaStats {
    pub due_today: i64,
    pub overdue: i64,
    pub next_7_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Overdue,
    Today,
    Tomorrow,
}

impl NotificationKind {
    pub fn urgency(&self) -> Urgency {
        match self {
            NotificationKind::Overdue => Urgency::High,
            NotificationKind::Today => Urgency::Medium,
            NotificationKind::Tomorrow => Urgency::Low,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            NotificationKind::Overdue => "overdue",
            NotificationKind::Today => "today",
            NotificationKind::Tomorrow => "tomorrow",
        }
    }
}

/// Ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaNotification {
    pub id: String,
    pub kind: NotificationKind,
    pub urgency: Urgency,
    pub client_name: Option<String>,
    pub seller: String,
    pub contact_type: String,
    pub next_contact_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl AgendaNotification {
    pub fn new(kind: NotificationKind, contact: &ContactEventView, created_at: &str) -> Self {
        Self {
            id: format!("{}_{}", kind.prefix(), contact.event.id),
            kind,
            urgency: kind.urgency(),
            client_name: contact.client_name.clone(),
            seller: contact.event.seller.clone(),
            contact_type: contact.event.contact_type.clone(),
            next_contact_date: contact.event.next_contact_date.clone(),
            notes: contact.event.notes.clone(),
            created_at: created_at.to_string(),
        }
    }
}
