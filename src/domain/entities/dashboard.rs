use super::GroupCount;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    /// Exact seller; `None` means every seller.
    pub seller: Option<String>,
    /// Applies to the client count only.
    pub branch: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    pub id: String,
    pub client_name: Option<String>,
    pub seller: String,
    pub contact_type: String,
    pub contact_date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_contacts: i64,
    pub overdue_contacts: i64,
    pub contacts_today: i64,
    pub contacts_by_seller: Vec<GroupCount>,
    pub contacts_by_type: Vec<GroupCount>,
    pub recent_activity: Vec<RecentActivity>,
}
