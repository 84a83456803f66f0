use crate::domain::entities::{
    AuthenticatedUser, ClientFilter, ContactEventFilter, ContactEventView, ContactGroupField,
    DashboardFilter, DashboardStats, Permission, RecentActivity,
};
use crate::domain::ports::{Clock, ClientRepository, ContactEventRepository};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::utils::dates::format_date;
use std::sync::Arc;

pub const RECENT_ACTIVITY_LIMIT: i64 = 10;
const NOTES_PREVIEW_CHARS: usize = 100;

/// "todos"/"all" and blanks select every seller or branch.
fn selection(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| {
        !v.is_empty() && !v.eq_ignore_ascii_case("todos") && !v.eq_ignore_ascii_case("all")
    })
}

fn preview(notes: Option<String>) -> Option<String> {
    notes.map(|n| {
        if n.chars().count() > NOTES_PREVIEW_CHARS {
            let cut: String = n.chars().take(NOTES_PREVIEW_CHARS).collect();
            format!("{}...", cut)
        } else {
            n
        }
    })
}

impl From<ContactEventView> for RecentActivity {
    fn from(view: ContactEventView) -> Self {
        Self {
            id: view.event.id,
            client_name: view.client_name,
            seller: view.event.seller,
            contact_type: view.event.contact_type,
            contact_date: view.event.contact_date,
            notes: preview(view.event.notes),
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    contact_repo: Arc<dyn ContactEventRepository>,
    client_repo: Arc<dyn ClientRepository>,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(
        contact_repo: Arc<dyn ContactEventRepository>,
        client_repo: Arc<dyn ClientRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contact_repo,
            client_repo,
            clock,
        }
    }

    pub async fn stats(
        &self,
        actor: &AuthenticatedUser,
        filter: DashboardFilter,
    ) -> ApiResult<DashboardStats> {
        let today = format_date(self.clock.today());

        let seller = if actor.has_permission(Permission::ViewGlobalDashboard) {
            selection(filter.seller)
        } else {
            Some(actor.user.name.clone())
        };

        let contacts = ContactEventFilter {
            owner: seller,
            start_date: filter.start_date,
            end_date: filter.end_date,
            ..Default::default()
        };

        // contact_date == today, on top of the requested range
        let mut contacts_today = contacts.clone();
        contacts_today.start_date = Some(match contacts.start_date.as_deref() {
            Some(start) if start > today.as_str() => start.to_string(),
            _ => today.clone(),
        });
        contacts_today.end_date = Some(match contacts.end_date.as_deref() {
            Some(end) if end < today.as_str() => end.to_string(),
            _ => today.clone(),
        });

        let overdue = ContactEventFilter {
            next_contact_before: Some(today.clone()),
            ..contacts.clone()
        };

        let clients = ClientFilter {
            branch: selection(filter.branch),
            ..Default::default()
        };

        let recent_activity = self
            .contact_repo
            .list_contact_events(&contacts, RECENT_ACTIVITY_LIMIT, 0)
            .await?
            .into_iter()
            .map(RecentActivity::from)
            .collect();

        Ok(DashboardStats {
            total_clients: self.client_repo.count_clients(&clients).await?,
            total_contacts: self.contact_repo.count_contact_events(&contacts).await?,
            overdue_contacts: self.contact_repo.count_contact_events(&overdue).await?,
            contacts_today: self.contact_repo.count_contact_events(&contacts_today).await?,
            contacts_by_seller: self
                .contact_repo
                .group_contact_events(&contacts, ContactGroupField::Seller)
                .await?,
            contacts_by_type: self
                .contact_repo
                .group_contact_events(&contacts, ContactGroupField::ContactType)
                .await?,
            recent_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_treats_all_as_no_filter() {
        assert_eq!(selection(Some("todos".to_string())), None);
        assert_eq!(selection(Some("ALL".to_string())), None);
        assert_eq!(selection(Some(" ".to_string())), None);
        assert_eq!(selection(Some(" Maria ".to_string())), Some("Maria".to_string()));
    }

    #[test]
    fn test_notes_preview_truncates_long_notes() {
        let long = "x".repeat(150);
        let cut = preview(Some(long)).unwrap();
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));

        assert_eq!(preview(Some("curta".to_string())), Some("curta".to_string()));
        assert_eq!(preview(None), None);
    }
}
