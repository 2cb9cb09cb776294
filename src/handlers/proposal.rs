use askama::Template;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use chrono::Local;

use crate::{
    error::Result,
    handlers::{form::FormData, MessageResponse},
    models::proposal::{
        BulkIds, BulkResult, NewProposal, ProposalBulkStatus, ProposalPatch, ProposalQuery,
    },
    services::export::{proposals_csv, ProposalPrintTemplate},
    state::AppState,
};

/// Multipart part carrying the proposal document
const SUPPORTING_FIELD: &str = "supporting_file";

const PROPOSAL_PREFIX: &str = "proposal";

fn new_proposal(form: &FormData) -> Result<NewProposal> {
    Ok(NewProposal {
        case_id: form.text("case_id"),
        name: form.require("name")?,
        origin: form.text("origin"),
        status: form.parse("status")?.unwrap_or_default(),
        pic_id: form.parse("pic_id")?,
        entry_date: form
            .date("entry_date")?
            .unwrap_or_else(|| Local::now().date_naive()),
        donation_form: form.text("donation_form"),
        product_quantity: form.parse("product_quantity")?,
        proposal_type: form.text("proposal_type"),
        product_detail: form.text("product_detail"),
        total_price: form.parse("total_price")?.unwrap_or(0.0),
        notes: form.text("notes"),
        supporting_file: None,
    })
}

fn proposal_patch(form: &FormData) -> Result<ProposalPatch> {
    Ok(ProposalPatch {
        case_id: form.text("case_id"),
        name: form.text("name"),
        origin: form.text("origin"),
        status: form.parse("status")?,
        pic_id: form.parse("pic_id")?,
        entry_date: form.date("entry_date")?,
        donation_form: form.text("donation_form"),
        product_quantity: form.parse("product_quantity")?,
        proposal_type: form.text("proposal_type"),
        product_detail: form.text("product_detail"),
        total_price: form.parse("total_price")?,
        notes: form.text("notes"),
        supporting_file: None,
    })
}

/// List proposals handler
pub async fn list_proposals(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProposalQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let page = state.proposals.list(&query).await?;
    Ok((StatusCode::OK, Json(page)))
}

/// Get proposal by ID handler
pub async fn get_proposal(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    let proposal = state.proposals.get(id).await?;
    Ok((StatusCode::OK, Json(proposal)))
}

/// Create proposal handler, accepting an optional supporting document
pub async fn create_proposal(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut form = FormData::read(multipart?, SUPPORTING_FIELD).await?;
    let mut new = new_proposal(&form)?;

    state.proposals.validate_new(&new).await?;

    if let Some(file) = form.take_file() {
        new.supporting_file = Some(state.uploads.save(PROPOSAL_PREFIX, &file).await?);
    }

    let stored = new.supporting_file.clone();
    match state.proposals.create(new).await {
        Ok(proposal) => Ok((StatusCode::CREATED, Json(proposal))),
        Err(e) => {
            if let Some(name) = stored {
                state.uploads.discard(&name).await;
            }
            Err(e)
        }
    }
}

/// Update proposal handler
pub async fn update_proposal(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    let mut form = FormData::read(multipart?, SUPPORTING_FIELD).await?;
    let mut patch = proposal_patch(&form)?;

    // Check the proposal and the patch before storing the upload
    state.proposals.get(id).await?;
    state.proposals.validate_patch(id, &patch).await?;

    if let Some(file) = form.take_file() {
        patch.supporting_file = Some(state.uploads.save(PROPOSAL_PREFIX, &file).await?);
    }

    let proposal = state.proposals.update(id, patch).await?;
    Ok((StatusCode::OK, Json(proposal)))
}

/// Delete proposal handler
pub async fn delete_proposal(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    state.proposals.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Proposal deleted"))))
}

pub async fn bulk_delete_proposals(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BulkIds>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let affected = state.proposals.bulk_delete(&request.ids).await?;
    Ok((StatusCode::OK, Json(BulkResult { affected })))
}

pub async fn bulk_update_proposal_status(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProposalBulkStatus>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let affected = state
        .proposals
        .bulk_update_status(&request.ids, request.status)
        .await?;
    Ok((StatusCode::OK, Json(BulkResult { affected })))
}

/// Dashboard summary cards
pub async fn proposal_summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let summary = state.proposals.summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}

/// Filtered proposal list as CSV, in list order
pub async fn export_proposals_csv(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProposalQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let proposals = state.proposals.list_all(&query).await?;
    let file_name = format!("proposals-{}.csv", Local::now().format("%Y-%m-%d"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        proposals_csv(&proposals),
    ))
}

/// Printable proposal report over the filtered list
pub async fn print_proposals(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProposalQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let proposals = state.proposals.list_all(&query).await?;
    let summary = state.proposals.summary().await?;

    let html = ProposalPrintTemplate::new(&summary, &proposals).render()?;
    Ok(Html(html))
}
