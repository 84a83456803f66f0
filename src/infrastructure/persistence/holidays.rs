use crate::domain::entities::Holiday;
use crate::domain::ports::holiday_repository::HolidayRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

fn holiday_from_row(row: &AnyRow) -> ApiResult<Holiday> {
    let recurring: i64 = row.try_get("recurring")?;
    Ok(Holiday {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        date: row.try_get("date")?,
        recurring: recurring != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl HolidayRepository for Database {
    async fn create_holiday(&self, holiday: &Holiday) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO holidays (id, name, date, recurring, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&holiday.id)
        .bind(&holiday.name)
        .bind(&holiday.date)
        .bind(holiday.recurring)
        .bind(&holiday.created_at)
        .bind(&holiday.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_holiday(&self, id: &str) -> ApiResult<Option<Holiday>> {
        let row = sqlx::query(
            "SELECT id, name, date, recurring, created_at, updated_at FROM holidays WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(holiday_from_row).transpose()
    }

    async fn get_holiday_by_date(&self, date: &str) -> ApiResult<Option<Holiday>> {
        let row = sqlx::query(
            "SELECT id, name, date, recurring, created_at, updated_at FROM holidays WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(holiday_from_row).transpose()
    }

    async fn list_holidays(&self) -> ApiResult<Vec<Holiday>> {
        let rows = sqlx::query(
            "SELECT id, name, date, recurring, created_at, updated_at
             FROM holidays ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(holiday_from_row).collect()
    }

    async fn update_holiday(&self, holiday: &Holiday) -> ApiResult<()> {
        sqlx::query(
            "UPDATE holidays SET name = ?, date = ?, recurring = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&holiday.name)
        .bind(&holiday.date)
        .bind(holiday.recurring)
        .bind(&holiday.updated_at)
        .bind(&holiday.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_holiday(&self, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM holidays WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
