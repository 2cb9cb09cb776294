use chrono::Utc;

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::pic::{NewPic, Pic, PicPatch},
};

/// PIC store for database operations
#[derive(Clone)]
pub struct PicStore {
    pool: DbPool,
}

impl PicStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Pic>> {
        let pics = sqlx::query_as::<_, Pic>("SELECT * FROM pics ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(pics)
    }

    pub async fn get(&self, id: i64) -> Result<Pic> {
        sqlx::query_as::<_, Pic>("SELECT * FROM pics WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("PIC"))
    }

    pub async fn create(&self, new: NewPic) -> Result<Pic> {
        if new.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".into()));
        }

        let now = Utc::now();
        let pic = sqlx::query_as::<_, Pic>(
            r#"
            INSERT INTO pics (name, email, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = pic.id, name = %pic.name, "PIC created");
        Ok(pic)
    }

    pub async fn update(&self, id: i64, patch: PicPatch) -> Result<Pic> {
        let mut pic = self.get(id).await?;
        patch.apply(&mut pic);

        let updated = sqlx::query_as::<_, Pic>(
            r#"
            UPDATE pics SET name = ?, email = ?, phone = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&pic.name)
        .bind(&pic.email)
        .bind(&pic.phone)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a PIC. Proposals assigned to it become unassigned.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM pics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("PIC"));
        }

        tracing::info!(id, "PIC deleted");
        Ok(())
    }
}
