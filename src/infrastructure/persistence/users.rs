use crate::domain::entities::{GroupCount, User, UserFilter, UserProfile, UserStats};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{filter_value, like_pattern, nullable, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, job_title, department, branch,
     profile, active, created_at, updated_at, last_login_at";

fn user_from_row(row: &AnyRow) -> ApiResult<User> {
    let profile: String = row.try_get("profile")?;
    let active: i64 = row.try_get("active")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        phone: nullable(row, "phone"),
        job_title: nullable(row, "job_title"),
        department: nullable(row, "department"),
        branch: nullable(row, "branch"),
        // the CHECK constraint keeps this to master/seller
        profile: profile.parse().unwrap_or(UserProfile::Seller),
        active: active != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login_at: nullable(row, "last_login_at"),
    })
}

/// Appends the WHERE clause for `filter`; returns the values to bind in order.
fn push_user_filter(sql: &mut String, filter: &UserFilter) -> Vec<String> {
    let mut binds = Vec::new();

    if let Some(search) = filter_value(&filter.search) {
        sql.push_str(
            " AND (LOWER(name) LIKE ? OR LOWER(email) LIKE ?
                   OR LOWER(COALESCE(job_title, '')) LIKE ? OR LOWER(COALESCE(department, '')) LIKE ?)",
        );
        let pattern = like_pattern(search);
        binds.extend(std::iter::repeat(pattern).take(4));
    }

    if filter.active_only {
        sql.push_str(" AND active = 1");
    }

    binds
}

impl Database {
    async fn count_users_where(&self, clause: &str) -> ApiResult<i64> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {}", clause))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn group_users_by(&self, column: &str) -> ApiResult<Vec<GroupCount>> {
        let rows = sqlx::query(&format!(
            "SELECT {col} AS group_key, COUNT(*) AS total FROM users GROUP BY {col} ORDER BY total DESC",
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
impl UserRepository for Database {
    async fn create_user(&self, user: &User) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, phone, job_title, department,
                                branch, profile, active, created_at, updated_at, last_login_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.job_title)
        .bind(&user.department)
        .bind(&user.branch)
        .bind(user.profile.to_string())
        .bind(user.active)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .bind(&user.last_login_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user(&self, user: &User) -> ApiResult<()> {
        sqlx::query(
            "UPDATE users
             SET name = ?, email = ?, password_hash = ?, phone = ?, job_title = ?,
                 department = ?, branch = ?, profile = ?, active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.job_title)
        .bind(&user.department)
        .bind(&user.branch)
        .bind(user.profile.to_string())
        .bind(user.active)
        .bind(&user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_last_login(&self, id: &str, at: &str) -> ApiResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_users(&self, filter: &UserFilter, limit: i64, offset: i64) -> ApiResult<Vec<User>> {
        let mut sql = format!("SELECT {} FROM users WHERE 1=1", USER_COLUMNS);
        let binds = push_user_filter(&mut sql, filter);
        sql.push_str(" ORDER BY name ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn count_users(&self, filter: &UserFilter) -> ApiResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM users WHERE 1=1");
        let binds = push_user_filter(&mut sql, filter);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn user_stats(&self) -> ApiResult<UserStats> {
        let total_users = self.count_users_where("1=1").await?;
        let active_users = self.count_users_where("active = 1").await?;
        let master_users = self.count_users_where("profile = 'master'").await?;
        let seller_users = self.count_users_where("profile = 'seller'").await?;

        Ok(UserStats {
            total_users,
            active_users,
            inactive_users: total_users - active_users,
            master_users,
            seller_users,
            by_department: self.group_users_by("department").await?,
            by_profile: self.group_users_by("profile").await?,
        })
    }
}
