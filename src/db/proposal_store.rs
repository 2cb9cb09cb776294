use chrono::{Datelike, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::{
    db::{schedule_store::distinct_ids, DbPool},
    error::{AppError, Result},
    models::{
        proposal::{
            generate_case_id, NewProposal, Proposal, ProposalPage, ProposalPatch, ProposalQuery,
            ProposalStatus, ProposalSummary, ProposalView,
        },
        schedule::year_range,
    },
};

/// Largest page a client may request
const MAX_PER_PAGE: u32 = 500;

/// Attempts at finding an unused generated case id
const CASE_ID_ATTEMPTS: usize = 10;

const JOINED_SELECT: &str = "SELECT p.*, pc.id AS pic_ref_id, pc.name AS pic_name \
     FROM proposals p LEFT JOIN pics pc ON pc.id = p.pic_id";

const JOINED_COUNT: &str = "SELECT COUNT(*) FROM proposals p LEFT JOIN pics pc ON pc.id = p.pic_id";

/// Proposal store for database operations
#[derive(Clone)]
pub struct ProposalStore {
    pool: DbPool,
}

/// Append the WHERE clause shared by the list, count and export queries
fn push_filters(
    query: &mut QueryBuilder<'_, Sqlite>,
    filter: &ProposalQuery,
    status: Option<ProposalStatus>,
) {
    query.push(" WHERE 1 = 1");

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query.push(" AND (p.name LIKE ").push_bind(pattern.clone());
        query.push(" OR p.origin LIKE ").push_bind(pattern.clone());
        query.push(" OR pc.name LIKE ").push_bind(pattern.clone());
        query.push(" OR p.case_id LIKE ").push_bind(pattern.clone());
        query.push(" OR p.product_detail LIKE ").push_bind(pattern);
        query.push(")");
    }

    if let Some(status) = status {
        query.push(" AND p.status = ").push_bind(status);
    }

    if let Some(start) = filter.start_date {
        query.push(" AND p.entry_date >= ").push_bind(start);
    }

    if let Some(end) = filter.end_date {
        query.push(" AND p.entry_date <= ").push_bind(end);
    }
}

impl ProposalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Filtered, sorted and paged proposal list
    pub async fn list(&self, filter: &ProposalQuery) -> Result<ProposalPage> {
        let status = filter.status_filter().map_err(AppError::BadRequest)?;
        let sort = filter.sort_key().map_err(AppError::BadRequest)?;

        let mut count_query = QueryBuilder::<Sqlite>::new(JOINED_COUNT);
        push_filters(&mut count_query, filter, status);
        let (total,): (i64,) = count_query.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new(JOINED_SELECT);
        push_filters(&mut query, filter, status);
        query
            .push(" ORDER BY ")
            .push(sort.sql())
            .push(if filter.descending() { " DESC" } else { " ASC" })
            .push(", p.id ASC");

        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.per_page.map(|n| n.clamp(1, MAX_PER_PAGE));

        if let Some(per_page) = per_page {
            query
                .push(" LIMIT ")
                .push_bind(per_page as i64)
                .push(" OFFSET ")
                .push_bind((page as i64 - 1) * per_page as i64);
        }

        let data = query
            .build_query_as::<ProposalView>()
            .fetch_all(&self.pool)
            .await?;

        let (page, per_page, total_pages) = match per_page {
            Some(per_page) => (page, per_page, (total as u32).div_ceil(per_page)),
            None => (1, total as u32, u32::from(total > 0)),
        };

        Ok(ProposalPage {
            data,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Every proposal matching the filter in list order, ignoring paging
    pub async fn list_all(&self, filter: &ProposalQuery) -> Result<Vec<ProposalView>> {
        let unpaged = ProposalQuery {
            page: None,
            per_page: None,
            ..filter.clone()
        };

        Ok(self.list(&unpaged).await?.data)
    }

    /// Get a proposal by ID with its PIC
    pub async fn get(&self, id: i64) -> Result<ProposalView> {
        sqlx::query_as::<_, ProposalView>(&format!("{JOINED_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Proposal"))
    }

    async fn case_id_taken(&self, case_id: &str, except: Option<i64>) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM proposals WHERE case_id = ?")
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(matches!(found, Some((id,)) if Some(id) != except))
    }

    async fn ensure_pic(&self, pic_id: Option<i64>) -> Result<()> {
        let Some(pic_id) = pic_id else {
            return Ok(());
        };

        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM pics WHERE id = ?")
            .bind(pic_id)
            .fetch_optional(&self.pool)
            .await?;

        found.map(|_| ()).ok_or(AppError::NotFound("PIC"))
    }

    async fn unused_case_id(&self) -> Result<String> {
        let year = Utc::now().year();
        for _ in 0..CASE_ID_ATTEMPTS {
            let candidate = generate_case_id(year);
            if !self.case_id_taken(&candidate, None).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal("could not allocate a free case id".into()))
    }

    async fn ensure_case_id_free(&self, case_id: &str, except: Option<i64>) -> Result<()> {
        if self.case_id_taken(case_id, except).await? {
            return Err(AppError::BadRequest(format!("case_id {case_id} already exists")));
        }
        Ok(())
    }

    /// Checks a new proposal against the stored PICs and case ids without writing anything
    pub async fn validate_new(&self, new: &NewProposal) -> Result<()> {
        if new.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".into()));
        }
        self.ensure_pic(new.pic_id).await?;

        if let Some(case_id) = new.case_id.as_deref().filter(|c| !c.trim().is_empty()) {
            self.ensure_case_id_free(case_id, None).await?;
        }
        Ok(())
    }

    /// Checks a patch for proposal `id` without writing anything
    pub async fn validate_patch(&self, id: i64, patch: &ProposalPatch) -> Result<()> {
        if let Some(case_id) = patch.case_id.as_deref() {
            self.ensure_case_id_free(case_id, Some(id)).await?;
        }
        self.ensure_pic(patch.pic_id).await
    }

    /// Insert a proposal, generating a case id when none is supplied
    pub async fn create(&self, new: NewProposal) -> Result<ProposalView> {
        self.validate_new(&new).await?;

        let case_id = match new.case_id.clone().filter(|c| !c.trim().is_empty()) {
            Some(case_id) => case_id,
            None => self.unused_case_id().await?,
        };

        let now = Utc::now();
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO proposals (
                case_id, name, origin, status, pic_id, entry_date, donation_form,
                product_quantity, proposal_type, product_detail, total_price, notes,
                supporting_file, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&case_id)
        .bind(&new.name)
        .bind(&new.origin)
        .bind(new.status)
        .bind(new.pic_id)
        .bind(new.entry_date)
        .bind(&new.donation_form)
        .bind(new.product_quantity)
        .bind(&new.proposal_type)
        .bind(&new.product_detail)
        .bind(new.total_price)
        .bind(&new.notes)
        .bind(&new.supporting_file)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, %case_id, "proposal created");
        self.get(id).await
    }

    /// Merge the patch over the stored proposal
    pub async fn update(&self, id: i64, patch: ProposalPatch) -> Result<ProposalView> {
        let mut proposal: Proposal = self.get(id).await?.proposal;

        self.validate_patch(id, &patch).await?;
        patch.apply(&mut proposal);

        sqlx::query(
            r#"
            UPDATE proposals
            SET case_id = ?, name = ?, origin = ?, status = ?, pic_id = ?, entry_date = ?,
                donation_form = ?, product_quantity = ?, proposal_type = ?, product_detail = ?,
                total_price = ?, notes = ?, supporting_file = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&proposal.case_id)
        .bind(&proposal.name)
        .bind(&proposal.origin)
        .bind(proposal.status)
        .bind(proposal.pic_id)
        .bind(proposal.entry_date)
        .bind(&proposal.donation_form)
        .bind(proposal.product_quantity)
        .bind(&proposal.proposal_type)
        .bind(&proposal.product_detail)
        .bind(proposal.total_price)
        .bind(&proposal.notes)
        .bind(&proposal.supporting_file)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::info!(id, status = %proposal.status, "proposal updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Proposal"));
        }

        tracing::info!(id, "proposal deleted");
        Ok(())
    }

    /// Delete every listed proposal. Fails without changes if any id is unknown.
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64> {
        let ids = distinct_ids(ids)?;
        let mut tx = self.pool.begin().await?;

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM proposals WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let affected = query.build().execute(&mut *tx).await?.rows_affected();
        if affected != ids.len() as u64 {
            tx.rollback().await?;
            return Err(AppError::NotFound("Proposal"));
        }

        tx.commit().await?;
        tracing::info!(affected, "proposals deleted");
        Ok(affected)
    }

    /// Set the status of every listed proposal. Fails without changes if any id is unknown.
    pub async fn bulk_update_status(&self, ids: &[i64], status: ProposalStatus) -> Result<u64> {
        let ids = distinct_ids(ids)?;
        let mut tx = self.pool.begin().await?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE proposals SET status = ");
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
            return Err(AppError::NotFound("Proposal"));
        }

        tx.commit().await?;
        tracing::info!(affected, %status, "proposal statuses changed");
        Ok(affected)
    }

    /// Counts per status and the total budget over all proposals
    pub async fn summary(&self) -> Result<ProposalSummary> {
        let (total_proposals, in_progress, ready_for_pickup, done, total_budget): (i64, i64, i64, i64, f64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'In Progress' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'Siap Diambil' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'Done' THEN 1 ELSE 0 END), 0),
                    CAST(COALESCE(SUM(total_price), 0) AS REAL)
                FROM proposals
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(ProposalSummary {
            total_proposals,
            in_progress,
            ready_for_pickup,
            done,
            total_budget,
        })
    }

    /// Expense and count per month of entry for one year, in a single pass.
    /// Months without proposals are absent from the result.
    pub async fn monthly_totals(&self, year: i32) -> Result<Vec<(u32, f64, i64)>> {
        let (start, end) = year_range(year)
            .ok_or_else(|| AppError::BadRequest(format!("invalid year {year}")))?;

        let rows: Vec<(i64, f64, i64)> = sqlx::query_as(
            r#"
            SELECT
                CAST(strftime('%m', entry_date) AS INTEGER) AS month,
                CAST(COALESCE(SUM(total_price), 0) AS REAL) AS expense,
                COUNT(*) AS count
            FROM proposals
            WHERE entry_date BETWEEN ? AND ?
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(month, expense, count)| (month as u32, expense, count))
            .collect())
    }
}
