use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::{BTreeSet, HashMap};

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::{
        schedule::{
            month_range, year_range, NewSchedule, Schedule, ScheduleFilter, SchedulePatch,
            ScheduleStatus, ScheduleWithStakeholder, GENERATED_PICKUP_DAY,
        },
        stakeholder::{Stakeholder, StakeholderWithSchedules},
    },
};

/// Schedule store for database operations
#[derive(Clone)]
pub struct ScheduleStore {
    pool: DbPool,
}

fn joined_select() -> String {
    format!(
        "SELECT s.*, {} FROM routine_schedules s \
         JOIN master_stakeholders st ON st.id = s.stakeholder_id",
        Stakeholder::JOINED_COLUMNS
    )
}

impl ScheduleStore {
    /// Create a new ScheduleStore with the provided database pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List schedules with their stakeholder, ordered by pickup date
    pub async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<ScheduleWithStakeholder>> {
        let status = filter.status_filter().map_err(AppError::BadRequest)?;

        let mut query = QueryBuilder::<Sqlite>::new(joined_select());
        query.push(" WHERE 1 = 1");

        if let Some((start, end)) = filter.date_range().map_err(AppError::BadRequest)? {
            query
                .push(" AND s.pickup_date BETWEEN ")
                .push_bind(start)
                .push(" AND ")
                .push_bind(end);
        }

        if let Some(status) = status {
            query.push(" AND s.status = ").push_bind(status);
        }

        if let Some(stakeholder_id) = filter.stakeholder_id {
            query.push(" AND s.stakeholder_id = ").push_bind(stakeholder_id);
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query
                .push(" AND (st.institution_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR st.branch LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query.push(" ORDER BY s.pickup_date ASC, s.id ASC");

        let schedules = query
            .build_query_as::<ScheduleWithStakeholder>()
            .fetch_all(&self.pool)
            .await?;

        Ok(schedules)
    }

    /// Every active stakeholder with its schedules for the given year.
    /// Stakeholders without schedules are included with an empty list.
    pub async fn by_stakeholder(&self, year: i32) -> Result<Vec<StakeholderWithSchedules>> {
        let (start, end) = year_range(year)
            .ok_or_else(|| AppError::BadRequest(format!("invalid year {year}")))?;

        let stakeholders = sqlx::query_as::<_, Stakeholder>(
            "SELECT * FROM master_stakeholders WHERE is_active = 1 ORDER BY institution_name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let schedules = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT s.* FROM routine_schedules s
            JOIN master_stakeholders st ON st.id = s.stakeholder_id
            WHERE st.is_active = 1 AND s.pickup_date BETWEEN ? AND ?
            ORDER BY s.pickup_date ASC, s.id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Schedule>> = HashMap::new();
        for schedule in schedules {
            grouped.entry(schedule.stakeholder_id).or_default().push(schedule);
        }

        Ok(stakeholders
            .into_iter()
            .map(|stakeholder| StakeholderWithSchedules {
                schedules: grouped.remove(&stakeholder.id).unwrap_or_default(),
                stakeholder,
            })
            .collect())
    }

    /// Get a schedule by ID
    pub async fn get(&self, id: i64) -> Result<Schedule> {
        sqlx::query_as::<_, Schedule>("SELECT * FROM routine_schedules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Schedule"))
    }

    /// Get a schedule by ID with its stakeholder
    pub async fn get_joined(&self, id: i64) -> Result<ScheduleWithStakeholder> {
        sqlx::query_as::<_, ScheduleWithStakeholder>(&format!("{} WHERE s.id = ?", joined_select()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Schedule"))
    }

    /// Fails with `NotFound` unless the stakeholder exists
    pub async fn ensure_stakeholder(&self, stakeholder_id: i64) -> Result<()> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM master_stakeholders WHERE id = ?")
            .bind(stakeholder_id)
            .fetch_optional(&self.pool)
            .await?;

        found.map(|_| ()).ok_or(AppError::NotFound("Stakeholder"))
    }

    /// Insert a schedule and return it with its stakeholder
    pub async fn create(&self, new: NewSchedule) -> Result<ScheduleWithStakeholder> {
        self.ensure_stakeholder(new.stakeholder_id).await?;

        let now = Utc::now();
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO routine_schedules (
                stakeholder_id, pickup_date, quantity, status, pic, notes,
                proof_file, created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(new.stakeholder_id)
        .bind(new.pickup_date)
        .bind(new.quantity)
        .bind(new.status)
        .bind(&new.pic)
        .bind(&new.notes)
        .bind(&new.proof_file)
        .bind(new.created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, stakeholder_id = new.stakeholder_id, date = %new.pickup_date, "schedule created");
        self.get_joined(id).await
    }

    /// Merge the patch over the stored schedule and return it with its stakeholder
    pub async fn update(&self, id: i64, patch: SchedulePatch) -> Result<ScheduleWithStakeholder> {
        let mut schedule = self.get(id).await?;
        if let Some(stakeholder_id) = patch.stakeholder_id {
            self.ensure_stakeholder(stakeholder_id).await?;
        }
        patch.apply(&mut schedule);

        sqlx::query(
            r#"
            UPDATE routine_schedules
            SET stakeholder_id = ?, pickup_date = ?, quantity = ?, status = ?, pic = ?,
                notes = ?, proof_file = ?, created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(schedule.stakeholder_id)
        .bind(schedule.pickup_date)
        .bind(schedule.quantity)
        .bind(schedule.status)
        .bind(&schedule.pic)
        .bind(&schedule.notes)
        .bind(&schedule.proof_file)
        .bind(schedule.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::info!(id, status = %schedule.status, "schedule updated");
        self.get_joined(id).await
    }

    /// Delete a schedule by ID
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM routine_schedules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Schedule"));
        }

        tracing::info!(id, "schedule deleted");
        Ok(())
    }

    /// Create one schedule on the 15th of the month for every active
    /// stakeholder that has no schedule of any status in that month.
    /// Returns the number of schedules created.
    pub async fn generate_monthly(&self, year: i32, month: u32) -> Result<u64> {
        let (start, end) = month_range(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("invalid month {month}/{year}")))?;
        let pickup_date = NaiveDate::from_ymd_opt(year, month, GENERATED_PICKUP_DAY)
            .ok_or_else(|| AppError::BadRequest(format!("invalid month {month}/{year}")))?;

        let mut tx = self.pool.begin().await?;

        let stakeholders = sqlx::query_as::<_, Stakeholder>(
            "SELECT * FROM master_stakeholders WHERE is_active = 1 ORDER BY institution_name ASC, id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now();
        let mut created = 0;

        for stakeholder in &stakeholders {
            // Any schedule in the month counts, whatever its status
            let existing: Option<(i64,)> = sqlx::query_as(
                "SELECT id FROM routine_schedules WHERE stakeholder_id = ? AND pickup_date BETWEEN ? AND ? LIMIT 1",
            )
            .bind(stakeholder.id)
            .bind(start)
            .bind(end)
            .fetch_optional(&mut *tx)
            .await?;

            if existing.is_some() {
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO routine_schedules (
                    stakeholder_id, pickup_date, quantity, status, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(stakeholder.id)
            .bind(pickup_date)
            .bind(stakeholder.default_quantity)
            .bind(ScheduleStatus::Scheduled)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            created += 1;
        }

        tx.commit().await?;

        tracing::info!(year, month, created, active = stakeholders.len(), "monthly schedules generated");
        Ok(created)
    }

    /// Set the status of every listed schedule. Fails without changes if any id is unknown.
    pub async fn bulk_update_status(&self, ids: &[i64], status: ScheduleStatus) -> Result<u64> {
        let ids = distinct_ids(ids)?;
        let mut tx = self.pool.begin().await?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE routine_schedules SET status = ");
        query
            .push_bind(status)
            .push(", updated_at = ")
            .push_bind(Utc::now())
            .push(" WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let affected = query.build().execute(&mut *tx).await?.rows_affected();
        if affected != ids.len() as u64 {
            tx.rollback().await?;
            return Err(AppError::NotFound("Schedule"));
        }

        tx.commit().await?;
        tracing::info!(affected, %status, "schedule statuses changed");
        Ok(affected)
    }

    /// Delete every listed schedule. Fails without changes if any id is unknown.
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64> {
        let ids = distinct_ids(ids)?;
        let mut tx = self.pool.begin().await?;

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM routine_schedules WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let affected = query.build().execute(&mut *tx).await?.rows_affected();
        if affected != ids.len() as u64 {
            tx.rollback().await?;
            return Err(AppError::NotFound("Schedule"));
        }

        tx.commit().await?;
        tracing::info!(affected, "schedules deleted");
        Ok(affected)
    }
}

/// Deduplicate ids for IN lists; an empty list is a client error
pub(crate) fn distinct_ids(ids: &[i64]) -> Result<Vec<i64>> {
    if ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".into()));
    }
    Ok(ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect())
}
