use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::Result,
    handlers::MessageResponse,
    models::pic::{NewPic, PicPatch},
    state::AppState,
};

/// List PICs handler
pub async fn list_pics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let pics = state.pics.list().await?;
    Ok((StatusCode::OK, Json(pics)))
}

pub async fn create_pic(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewPic>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(new) = payload?;
    let pic = state.pics.create(new).await?;
    Ok((StatusCode::CREATED, Json(pic)))
}

pub async fn update_pic(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<PicPatch>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let pic = state.pics.update(id, patch).await?;
    Ok((StatusCode::OK, Json(pic)))
}

/// Delete PIC handler; proposals keep their row with the PIC cleared
pub async fn delete_pic(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = path?;
    state.pics.delete(id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("PIC deleted"))))
}
