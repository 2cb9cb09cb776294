use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::Result,
    handlers::MessageResponse,
    models::stakeholder::{NewStakeholder, StakeholderFilter, StakeholderPatch},
    state::AppState,
};

/// List stakeholders handler
pub async fn list_stakeholders(
    State(state): State<AppState>,
    query: std::result::Result<Query<StakeholderFilter>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(filter) = query?;
    let stakeholders = state.stakeholders.list(&filter).await?;
    Ok((StatusCode::OK, Json(stakeholders)))
}

/// Create stakeholder handler
pub async fn create_stakeholder(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewStakeholder>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(new) = payload?;
    let stakeholder = state.stakeholders.create(new).await?;
    Ok((StatusCode::CREATED, Json(stakeholder)))
}

/// Update stakeholder handler
pub async fn update_stakeholder(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<StakeholderPatch>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let stakeholder = state.stakeholders.update(id, patch).await?;
    Ok((StatusCode::OK, Json(stakeholder)))
}

/// Delete stakeholder handler
pub async fn delete_stakeholder(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    state.stakeholders.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("Stakeholder deleted"))))
}
