use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use askama::Template;

use crate::{
    error::{AppError, Result},
    handlers::{form::FormData, MessageResponse},
    models::{
        proposal::{BulkIds, BulkResult},
        schedule::{
            GenerateRequest, GenerateResponse, NewSchedule, ScheduleBulkStatus, ScheduleFilter,
            SchedulePatch, YearQuery,
        },
    },
    services::{
        export::{routine_grid_csv, RoutinePrintTemplate},
        report_service::routine_analytics,
    },
    state::AppState,
};

/// Multipart part carrying the proof-of-delivery photo
const PROOF_FIELD: &str = "proof_file";

/// File name prefix for stored proofs
const PROOF_PREFIX: &str = "proof";

fn new_schedule(form: &FormData) -> Result<NewSchedule> {
    Ok(NewSchedule {
        stakeholder_id: form.require("stakeholder_id")?,
        pickup_date: form
            .date("pickup_date")?
            .ok_or_else(|| AppError::BadRequest("pickup_date is required".into()))?,
        quantity: form.parse("quantity")?.unwrap_or(0),
        status: form.parse("status")?.unwrap_or_default(),
        pic: form.text("pic"),
        notes: form.text("notes"),
        proof_file: None,
        created_by: form.parse("created_by")?,
    })
}

fn schedule_patch(form: &FormData) -> Result<SchedulePatch> {
    Ok(SchedulePatch {
        stakeholder_id: form.parse("stakeholder_id")?,
        pickup_date: form.date("pickup_date")?,
        quantity: form.parse("quantity")?,
        status: form.parse("status")?,
        pic: form.text("pic"),
        notes: form.text("notes"),
        proof_file: None,
        created_by: form.parse("created_by")?,
    })
}

/// List schedules handler
pub async fn list_schedules(
    State(state): State<AppState>,
    query: std::result::Result<Query<ScheduleFilter>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(filter) = query?;
    let schedules = state.schedules.list(&filter).await?;
    Ok((StatusCode::OK, Json(schedules)))
}

/// Active stakeholders with their schedules for one year
pub async fn schedules_by_stakeholder(
    State(state): State<AppState>,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let roster = state.schedules.by_stakeholder(query.year_or_current()).await?;
    Ok((StatusCode::OK, Json(roster)))
}

/// Create schedule handler, accepting an optional proof upload
pub async fn create_schedule(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut form = FormData::read(multipart?, PROOF_FIELD).await?;
    let mut new = new_schedule(&form)?;

    // Nothing is written to disk for a request the store would reject
    state.schedules.ensure_stakeholder(new.stakeholder_id).await?;

    if let Some(file) = form.take_file() {
        new.proof_file = Some(state.uploads.save(PROOF_PREFIX, &file).await?);
    }

    let stored = new.proof_file.clone();
    match state.schedules.create(new).await {
        Ok(schedule) => Ok((StatusCode::CREATED, Json(schedule))),
        Err(e) => {
            if let Some(name) = stored {
                state.uploads.discard(&name).await;
            }
            Err(e)
        }
    }
}

/// Update schedule handler; a new proof upload replaces the stored reference
pub async fn update_schedule(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    let mut form = FormData::read(multipart?, PROOF_FIELD).await?;
    let mut patch = schedule_patch(&form)?;

    // Reject unknown ids before anything is written to disk
    state.schedules.get(id).await?;
    if let Some(stakeholder_id) = patch.stakeholder_id {
        state.schedules.ensure_stakeholder(stakeholder_id).await?;
    }

    if let Some(file) = form.take_file() {
        patch.proof_file = Some(state.uploads.save(PROOF_PREFIX, &file).await?);
    }

    let schedule = state.schedules.update(id, patch).await?;
    Ok((StatusCode::OK, Json(schedule)))
}

/// Delete schedule handler
pub async fn delete_schedule(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    state.schedules.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Schedule deleted"))))
}

/// Generate the month's schedules for all active stakeholders
pub async fn generate_monthly_schedules(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let (year, month) = request.target().map_err(AppError::BadRequest)?;

    let created = state.schedules.generate_monthly(year, month).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            message: format!("Generated {created} schedules"),
            created,
        }),
    ))
}

pub async fn bulk_update_schedule_status(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ScheduleBulkStatus>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let affected = state
        .schedules
        .bulk_update_status(&request.ids, request.status)
        .await?;
    Ok((StatusCode::OK, Json(BulkResult { affected })))
}

pub async fn bulk_delete_schedules(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BulkIds>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let affected = state.schedules.bulk_delete(&request.ids).await?;
    Ok((StatusCode::OK, Json(BulkResult { affected })))
}

/// Schedule totals and branch spread for one year
pub async fn routine_analytics_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let year = query.year_or_current();
    let roster = state.schedules.by_stakeholder(year).await?;
    Ok((StatusCode::OK, Json(routine_analytics(year, &roster))))
}

/// Month-by-month roster grid as CSV
pub async fn export_routine_csv(
    State(state): State<AppState>,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let year = query.year_or_current();
    let roster = state.schedules.by_stakeholder(year).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"kegiatan-rutin-{year}.csv\""),
            ),
        ],
        routine_grid_csv(&roster),
    ))
}

/// Printable roster report
pub async fn print_routine_report(
    State(state): State<AppState>,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let year = query.year_or_current();
    let roster = state.schedules.by_stakeholder(year).await?;
    let analytics = routine_analytics(year, &roster);

    let html = RoutinePrintTemplate::new(year, analytics, &roster).render()?;
    Ok(Html(html))
}
