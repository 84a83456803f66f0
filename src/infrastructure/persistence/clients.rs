use crate::domain::entities::{Client, ClientFilter, ClientStats, GroupCount};
use crate::domain::ports::client_repository::ClientRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{filter_value, like_pattern, nullable, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const CLIENT_COLUMNS: &str = "id, name, code, city, branch, parts_potential, service_potential,
     status_6m, last_movement, classification, parts_consultant, service_consultant,
     created_at, updated_at";

fn client_from_row(row: &AnyRow) -> ApiResult<Client> {
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        city: nullable(row, "city"),
        branch: nullable(row, "branch"),
        parts_potential: row.try_get("parts_potential")?,
        service_potential: row.try_get("service_potential")?,
        status_6m: nullable(row, "status_6m"),
        last_movement: nullable(row, "last_movement"),
        classification: nullable(row, "classification"),
        parts_consultant: nullable(row, "parts_consultant"),
        service_consultant: nullable(row, "service_consultant"),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Appends the WHERE clause for `filter`; returns the values to bind in order.
fn push_client_filter(sql: &mut String, filter: &ClientFilter) -> Vec<String> {
    let mut binds = Vec::new();

    if let Some(search) = filter_value(&filter.search) {
        sql.push_str(
            " AND (LOWER(name) LIKE ? OR CAST(code AS TEXT) LIKE ? OR LOWER(COALESCE(city, '')) LIKE ?)",
        );
        let pattern = like_pattern(search);
        binds.extend(std::iter::repeat(pattern).take(3));
    }

    if let Some(code) = filter_value(&filter.code) {
        sql.push_str(" AND CAST(code AS TEXT) LIKE ?");
        binds.push(like_pattern(code));
    }

    if let Some(branch) = filter_value(&filter.branch) {
        sql.push_str(" AND branch = ?");
        binds.push(branch.to_string());
    }

    if let Some(classification) = filter_value(&filter.classification) {
        sql.push_str(" AND classification = ?");
        binds.push(classification.to_string());
    }

    if let Some(consultant) = filter_value(&filter.parts_consultant) {
        sql.push_str(" AND LOWER(COALESCE(parts_consultant, '')) LIKE ?");
        binds.push(like_pattern(consultant));
    }

    if let Some(consultant) = filter_value(&filter.service_consultant) {
        sql.push_str(" AND LOWER(COALESCE(service_consultant, '')) LIKE ?");
        binds.push(like_pattern(consultant));
    }

    binds
}

impl Database {
    async fn group_clients_by(&self, column: &str) -> ApiResult<Vec<GroupCount>> {
        let rows = sqlx::query(&format!(
            "SELECT {col} AS group_key, COUNT(*) AS total FROM clients
             GROUP BY {col} ORDER BY total DESC, group_key ASC",
            col = column
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GroupCount {
                    key: nullable(row, "group_key"),
                    count: row.try_get("total")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ClientRepository for Database {
    async fn create_client(&self, client: &Client) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO clients (id, name, code, city, branch, parts_potential, service_potential,
                                  status_6m, last_movement, classification, parts_consultant,
                                  service_consultant, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(client.code)
        .bind(&client.city)
        .bind(&client.branch)
        .bind(client.parts_potential)
        .bind(client.service_potential)
        .bind(&client.status_6m)
        .bind(&client.last_movement)
        .bind(&client.classification)
        .bind(&client.parts_consultant)
        .bind(&client.service_consultant)
        .bind(&client.created_at)
        .bind(&client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_client_by_id(&self, id: &str) -> ApiResult<Option<Client>> {
        let row = sqlx::query(&format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(client_from_row).transpose()
    }

    async fn get_client_by_code(&self, code: i64) -> ApiResult<Option<Client>> {
        let row = sqlx::query(&format!("SELECT {} FROM clients WHERE code = ?", CLIENT_COLUMNS))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(client_from_row).transpose()
    }

    async fn update_client(&self, client: &Client) -> ApiResult<()> {
        sqlx::query(
            "UPDATE clients
             SET name = ?, code = ?, city = ?, branch = ?, parts_potential = ?,
                 service_potential = ?, status_6m = ?, last_movement = ?, classification = ?,
                 parts_consultant = ?, service_consultant = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&client.name)
        .bind(client.code)
        .bind(&client.city)
        .bind(&client.branch)
        .bind(client.parts_potential)
        .bind(client.service_potential)
        .bind(&client.status_6m)
        .bind(&client.last_movement)
        .bind(&client.classification)
        .bind(&client.parts_consultant)
        .bind(&client.service_consultant)
        .bind(&client.updated_at)
        .bind(&client.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_client(&self, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_clients(
        &self,
        filter: &ClientFilter,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<Client>> {
        let mut sql = format!("SELECT {} FROM clients WHERE 1=1", CLIENT_COLUMNS);
        let binds = push_client_filter(&mut sql, filter);
        sql.push_str(" ORDER BY name ASC, code ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(client_from_row).collect()
    }

    async fn count_clients(&self, filter: &ClientFilter) -> ApiResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM clients WHERE 1=1");
        let binds = push_client_filter(&mut sql, filter);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn list_all_clients(&self) -> ApiResult<Vec<Client>> {
        let rows = sqlx::query(&format!("SELECT {} FROM clients ORDER BY code ASC", CLIENT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(client_from_row).collect()
    }

    async fn count_client_contacts(&self, client_id: &str) -> ApiResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_events WHERE client_id = ?")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn client_stats(&self) -> ApiResult<ClientStats> {
        let total_clients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;

        Ok(ClientStats {
            total_clients,
            by_branch: self.group_clients_by("branch").await?,
            by_classification: self.group_clients_by("classification").await?,
            by_parts_consultant: self.group_clients_by("parts_consultant").await?,
        })
    }

    async fn list_branches(&self) -> ApiResult<Vec<String>> {
        let branches: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT branch FROM clients
             WHERE branch IS NOT NULL AND TRIM(branch) != ''
             ORDER BY branch ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(branches)
    }
}
