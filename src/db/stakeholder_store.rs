use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::stakeholder::{NewStakeholder, Stakeholder, StakeholderFilter, StakeholderPatch},
};

/// Stakeholder store for database operations
#[derive(Clone)]
pub struct StakeholderStore {
    pool: DbPool,
}

impl StakeholderStore {
    /// Create a new StakeholderStore with the provided database pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List stakeholders matching the filter, ordered by institution name
    pub async fn list(&self, filter: &StakeholderFilter) -> Result<Vec<Stakeholder>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM master_stakeholders WHERE 1 = 1");

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query
                .push(" AND (institution_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR branch LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(branch) = filter.branch.as_deref().filter(|s| !s.is_empty()) {
            query.push(" AND branch = ").push_bind(branch.to_string());
        }

        if let Some(active) = filter.active_flag() {
            query.push(" AND is_active = ").push_bind(active);
        }

        query.push(" ORDER BY institution_name ASC, id ASC");

        let stakeholders = query
            .build_query_as::<Stakeholder>()
            .fetch_all(&self.pool)
            .await?;

        Ok(stakeholders)
    }

    /// Get a stakeholder by ID
    pub async fn get(&self, id: i64) -> Result<Stakeholder> {
        sqlx::query_as::<_, Stakeholder>("SELECT * FROM master_stakeholders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Stakeholder"))
    }

    /// Insert a stakeholder and return the stored row
    pub async fn create(&self, new: NewStakeholder) -> Result<Stakeholder> {
        if new.institution_name.trim().is_empty() {
            return Err(AppError::BadRequest("institution_name is required".into()));
        }

        let now = Utc::now();
        let stakeholder = sqlx::query_as::<_, Stakeholder>(
            r#"
            INSERT INTO master_stakeholders (
                institution_name, receiving_agency, branch, default_quantity,
                contact_person, phone, address, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.institution_name)
        .bind(&new.receiving_agency)
        .bind(&new.branch)
        .bind(new.default_quantity)
        .bind(&new.contact_person)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(new.is_active)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = stakeholder.id, name = %stakeholder.institution_name, "stakeholder created");
        Ok(stakeholder)
    }

    /// Merge the patch over the stored stakeholder
    pub async fn update(&self, id: i64, patch: StakeholderPatch) -> Result<Stakeholder> {
        let mut stakeholder = self.get(id).await?;
        patch.apply(&mut stakeholder);

        if stakeholder.institution_name.trim().is_empty() {
            return Err(AppError::BadRequest("institution_name cannot be empty".into()));
        }

        let updated = sqlx::query_as::<_, Stakeholder>(
            r#"
            UPDATE master_stakeholders
            SET institution_name = ?, receiving_agency = ?, branch = ?, default_quantity = ?,
                contact_person = ?, phone = ?, address = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&stakeholder.institution_name)
        .bind(&stakeholder.receiving_agency)
        .bind(&stakeholder.branch)
        .bind(stakeholder.default_quantity)
        .bind(&stakeholder.contact_person)
        .bind(&stakeholder.phone)
        .bind(&stakeholder.address)
        .bind(stakeholder.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "stakeholder updated");
        Ok(updated)
    }

    /// Delete a stakeholder by ID. Its schedules go with it.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM master_stakeholders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stakeholder"));
        }

        tracing::info!(id, "stakeholder deleted");
        Ok(())
    }
}
