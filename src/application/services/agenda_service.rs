use crate::domain::entities::{
    AgendaEntry, AgendaFilter, AgendaNotification, AgendaStats, AuthenticatedUser,
    ContactEventView, GroupedAgenda, NotificationKind, PageRequest, Paginated,
};
use crate::domain::ports::{Clock, ContactEventRepository};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::utils::dates::{format_date, parse_iso_date};
use chrono::{Days, NaiveDate};
use std::sync::Arc;

pub const DEFAULT_AGENDA_PER_PAGE: i64 = 50;
pub const UPCOMING_WINDOW_DAYS: u64 = 7;

fn next_contact(view: &ContactEventView) -> Option<NaiveDate> {
    view.event.next_contact_date.as_deref().and_then(parse_iso_date)
}

/// Follow-ups derived from each client's most recent contact.
#[derive(Clone)]
pub struct AgendaService {
    contact_repo: Arc<dyn ContactEventRepository>,
    clock: Arc<dyn Clock>,
}

impl AgendaService {
    pub fn new(contact_repo: Arc<dyn ContactEventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            contact_repo,
            clock,
        }
    }

    async fn scheduled_for(&self, actor: &AuthenticatedUser) -> ApiResult<Vec<ContactEventView>> {
        let filter = AgendaFilter {
            owner: actor.contact_owner(),
            ..Default::default()
        };
        self.contact_repo.list_agenda_events(&filter, None).await
    }

    pub async fn list_agenda(
        &self,
        actor: &AuthenticatedUser,
        mut filter: AgendaFilter,
        overdue_only: bool,
        page: PageRequest,
    ) -> ApiResult<Paginated<AgendaEntry>> {
        let today = self.clock.today();
        filter.owner = actor.contact_owner();
        if overdue_only {
            filter.due_before = Some(format_date(today));
        }

        let events = self
            .contact_repo
            .list_agenda_events(&filter, Some((page.limit(), page.offset())))
            .await?;
        let total = self.contact_repo.count_agenda_events(&filter).await?;

        let entries = events
            .into_iter()
            .filter_map(|event| AgendaEntry::new(event, today))
            .collect();

        Ok(Paginated::new(entries, page, total))
    }

    /// Upcoming follow-ups ascending, overdue ones most recent first.
    pub async fn grouped_agenda(&self, actor: &AuthenticatedUser) -> ApiResult<GroupedAgenda> {
        let today = self.clock.today();
        let (scheduled, mut overdue): (Vec<_>, Vec<_>) = self
            .scheduled_for(actor)
            .await?
            .into_iter()
            .filter(|view| next_contact(view).is_some())
            .partition(|view| next_contact(view).map_or(false, |next| next >= today));

        overdue.reverse();

        Ok(GroupedAgenda { scheduled, overdue })
    }

    pub async fn agenda_stats(&self, actor: &AuthenticatedUser) -> ApiResult<AgendaStats> {
        let today = self.clock.today();
        let horizon = today + Days::new(UPCOMING_WINDOW_DAYS);
        let dates: Vec<NaiveDate> = self
            .scheduled_for(actor)
            .await?
            .iter()
            .filter_map(next_contact)
            .collect();

        Ok(AgendaStats {
            due_today: dates.iter().filter(|&&d| d == today).count() as i64,
            overdue: dates.iter().filter(|&&d| d < today).count() as i64,
            next_7_days: dates
                .iter()
                .filter(|&&d| d >= today && d <= horizon)
                .count() as i64,
        })
    }

    /// Overdue, due-today and due-tomorrow follow-ups, most urgent first.
    pub async fn notifications(&self, actor: &AuthenticatedUser) -> ApiResult<Vec<AgendaNotification>> {
        let now = self.clock.now();
        let today = now.date();
        let tomorrow = today + Days::new(1);
        let created_at = now.format("%Y-%m-%dT%H:%M:%S").to_string();

        let mut notifications: Vec<AgendaNotification> = self
            .scheduled_for(actor)
            .await?
            .iter()
            .filter_map(|view| {
                let next = next_contact(view)?;
                let kind = if next < today {
                    NotificationKind::Overdue
                } else if next == today {
                    NotificationKind::Today
                } else if next == tomorrow {
                    NotificationKind::Tomorrow
                } else {
                    return None;
                };
                Some(AgendaNotification::new(kind, view, &created_at))
            })
            .collect();

        notifications.sort_by_key(|n| n.urgency);
        Ok(notifications)
    }
}
