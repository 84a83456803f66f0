use crate::domain::entities::{
    AgendaFilter, CatalogEntry, CatalogKind, ContactEvent, ContactEventFilter, ContactEventView,
    ContactGroupField, GroupCount,
};
use crate::domain::ports::contact_event_repository::ContactEventRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{filter_value, like_pattern, nullable, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const EVENT_SELECT: &str = "SELECT e.id, e.client_id, e.contact_date, e.contact_type,
            e.contact_result, e.notes, e.seller, e.next_contact_date, e.contact_time,
            e.created_at, e.updated_at, c.name AS client_name, c.code AS client_code
     FROM contact_events e
     LEFT JOIN clients c ON c.id = e.client_id";

/// Keeps only the most recent event of each client.
const LATEST_PER_CLIENT: &str = " AND e.id = (
         SELECT l.id FROM contact_events l
         WHERE l.client_id = e.client_id
         ORDER BY l.contact_date DESC, l.created_at DESC, l.id DESC
         LIMIT 1)";

fn event_view_from_row(row: &AnyRow) -> ApiResult<ContactEventView> {
    Ok(ContactEventView {
        event: ContactEvent {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            contact_date: row.try_get("contact_date")?,
            contact_type: row.try_get("contact_type")?,
            contact_result: row.try_get("contact_result")?,
            notes: nullable(row, "notes"),
            seller: row.try_get("seller")?,
            next_contact_date: nullable(row, "next_contact_date"),
            contact_time: row.try_get("contact_time")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        client_name: nullable(row, "client_name"),
        client_code: nullable(row, "client_code"),
    })
}

/// Appends the WHERE clause for `filter`; returns the values to bind in order.
fn push_event_filter(sql: &mut String, filter: &ContactEventFilter) -> Vec<String> {
    let mut binds = Vec::new();

    if let Some(search) = filter_value(&filter.search) {
        sql.push_str(
            " AND (LOWER(COALESCE(c.name, '')) LIKE ? OR CAST(c.code AS TEXT) LIKE ?
                   OR LOWER(COALESCE(e.notes, '')) LIKE ?)",
        );
        let pattern = like_pattern(search);
        binds.extend(std::iter::repeat(pattern).take(3));
    }

    if let Some(seller) = filter_value(&filter.seller) {
        sql.push_str(" AND LOWER(e.seller) LIKE ?");
        binds.push(like_pattern(seller));
    }

    if let Some(owner) = filter_value(&filter.owner) {
        sql.push_str(" AND e.seller = ?");
        binds.push(owner.to_string());
    }

    if let Some(contact_type) = filter_value(&filter.contact_type) {
        sql.push_str(" AND LOWER(e.contact_type) LIKE ?");
        binds.push(like_pattern(contact_type));
    }

    if let Some(contact_result) = filter_value(&filter.contact_result) {
        sql.push_str(" AND LOWER(e.contact_result) LIKE ?");
        binds.push(like_pattern(contact_result));
    }

    if let Some(start) = filter_value(&filter.start_date) {
        sql.push_str(" AND e.contact_date >= ?");
        binds.push(start.to_string());
    }

    if let Some(end) = filter_value(&filter.end_date) {
        sql.push_str(" AND e.contact_date <= ?");
        binds.push(end.to_string());
    }

    if let Some(before) = filter_value(&filter.next_contact_before) {
        sql.push_str(" AND e.next_contact_date IS NOT NULL AND e.next_contact_date < ?");
        binds.push(before.to_string());
    }

    binds
}

/// Appends the agenda WHERE clause for `filter`; returns the values to bind in order.
fn push_agenda_filter(sql: &mut String, filter: &AgendaFilter) -> Vec<String> {
    let mut binds = Vec::new();

    sql.push_str(" AND e.next_contact_date IS NOT NULL");
    sql.push_str(LATEST_PER_CLIENT);

    if let Some(seller) = filter_value(&filter.seller) {
        sql.push_str(" AND LOWER(e.seller) LIKE ?");
        binds.push(like_pattern(seller));
    }

    if let Some(owner) = filter_value(&filter.owner) {
        sql.push_str(" AND e.seller = ?");
        binds.push(owner.to_string());
    }

    if let Some(start) = filter_value(&filter.start_date) {
        sql.push_str(" AND e.next_contact_date >= ?");
        binds.push(start.to_string());
    }

    if let Some(end) = filter_value(&filter.end_date) {
        sql.push_str(" AND e.next_contact_date <= ?");
        binds.push(end.to_string());
    }

    if let Some(before) = filter_value(&filter.due_before) {
        sql.push_str(" AND e.next_contact_date < ?");
        binds.push(before.to_string());
    }

    binds
}

#[async_trait]
impl ContactEventRepository for Database {
    async fn create_contact_event(&self, event: &ContactEvent) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO contact_events (id, client_id, contact_date, contact_type, contact_result,
                                         notes, seller, next_contact_date, contact_time,
                                         created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.client_id)
        .bind(&event.contact_date)
        .bind(&event.contact_type)
        .bind(&event.contact_result)
        .bind(&event.notes)
        .bind(&event.seller)
        .bind(&event.next_contact_date)
        .bind(&event.contact_time)
        .bind(&event.created_at)
        .bind(&event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_contact_event(&self, id: &str) -> ApiResult<Option<ContactEventView>> {
        let row = sqlx::query(&format!("{} WHERE e.id = ?", EVENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(event_view_from_row).transpose()
    }

    async fn update_contact_event(&self, event: &ContactEvent) -> ApiResult<()> {
        sqlx::query(
            "UPDATE contact_events
             SET contact_type = ?, contact_result = ?, notes = ?, seller = ?,
                 next_contact_date = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&event.contact_type)
        .bind(&event.contact_result)
        .bind(&event.notes)
        .bind(&event.seller)
        .bind(&event.next_contact_date)
        .bind(&event.updated_at)
        .bind(&event.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_contact_event(&self, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM contact_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_contact_events(
        &self,
        filter: &ContactEventFilter,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<ContactEventView>> {
        let mut sql = format!("{} WHERE 1=1", EVENT_SELECT);
        let binds = push_event_filter(&mut sql, filter);
        sql.push_str(" ORDER BY e.contact_date DESC, e.contact_time DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(event_view_from_row).collect()
    }

    async fn count_contact_events(&self, filter: &ContactEventFilter) -> ApiResult<i64> {
        let mut sql = String::from(
            "SELECT COUNT(*) FROM contact_events e
             LEFT JOIN clients c ON c.id = e.client_id
             WHERE 1=1",
        );
        let binds = push_event_filter(&mut sql, filter);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn group_contact_events(
        &self,
        filter: &ContactEventFilter,
        field: ContactGroupField,
    ) -> ApiResult<Vec<GroupCount>> {
        let column = field.column();
        let mut sql = format!(
            "SELECT {} AS group_key, COUNT(*) AS total FROM contact_events e
             LEFT JOIN clients c ON c.id = e.client_id
             WHERE 1=1",
            column
        );
        let binds = push_event_filter(&mut sql, filter);
        sql.push_str(&format!(" GROUP BY {} ORDER BY total DESC, group_key ASC", column));

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(GroupCount {
                    key: nullable(row, "group_key"),
                    count: row.try_get("total")?,
                })
            })
            .collect()
    }

    async fn list_sellers(&self) -> ApiResult<Vec<String>> {
        let sellers: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT seller FROM contact_events
             WHERE TRIM(seller) != ''
             ORDER BY seller ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sellers)
    }

    async fn list_agenda_events(
        &self,
        filter: &AgendaFilter,
        page: Option<(i64, i64)>,
    ) -> ApiResult<Vec<ContactEventView>> {
        let mut sql = format!("{} WHERE 1=1", EVENT_SELECT);
        let binds = push_agenda_filter(&mut sql, filter);
        sql.push_str(" ORDER BY e.next_contact_date ASC, c.name ASC");
        if page.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        if let Some((limit, offset)) = page {
            query = query.bind(limit).bind(offset);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(event_view_from_row).collect()
    }

    async fn count_agenda_events(&self, filter: &AgendaFilter) -> ApiResult<i64> {
        let mut sql = String::from(
            "SELECT COUNT(*) FROM contact_events e
             LEFT JOIN clients c ON c.id = e.client_id
             WHERE 1=1",
        );
        let binds = push_agenda_filter(&mut sql, filter);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn list_catalog(&self, kind: CatalogKind) -> ApiResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT id, code, description, active FROM {} WHERE active = 1 ORDER BY code ASC",
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let active: i64 = row.try_get("active")?;
                Ok(CatalogEntry {
                    id: row.try_get("id")?,
                    code: row.try_get("code")?,
                    description: row.try_get("description")?,
                    active: active != 0,
                })
            })
            .collect()
    }
}
