use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, Result},
    state::AppState,
};

/// Bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Expected a Bearer token".into()))
}

/// Rejects requests without a valid token and hands the claims to the handler
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let claims = state.auth.validate_token(bearer_token(request.headers())?)?;

    tracing::debug!(sub = %claims.sub, path = %request.uri().path(), "authenticated request");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
