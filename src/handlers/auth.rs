use axum::{
    extract::{rejection::JsonRejection, Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::Result,
    models::auth::{Claims, LoginRequest},
    state::AppState,
};

/// Handler for email and password login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;

    // Verify the credentials and issue a token
    let response = state
        .auth
        .login(request.email.trim(), &request.password)
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Claims of the token the request was authenticated with
pub async fn me(Extension(claims): Extension<Claims>) -> Result<impl IntoResponse> {
    Ok((StatusCode::OK, Json(claims)))
}
