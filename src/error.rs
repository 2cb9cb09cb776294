use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError to an HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::Auth(reason) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), Some(reason.clone())),
            AppError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string(), Some(e.to_string())),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), None),
            AppError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "Invalid request".to_string(), Some(reason.clone())),
            AppError::Upload(reason) => (StatusCode::BAD_REQUEST, "Upload failed".to_string(), Some(reason.clone())),
            AppError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, "File system error".to_string(), Some(e.to_string())),
            AppError::Json(e) => (StatusCode::INTERNAL_SERVER_ERROR, "JSON error".to_string(), Some(e.to_string())),
            AppError::Template(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Report rendering failed".to_string(), Some(e.to_string())),
            AppError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), Some(reason.clone())),
        };

        if status.is_server_error() {
            tracing::error!(?self);
        } else {
            tracing::warn!(%status, error = %self);
        }

        let body = Json(ErrorResponse {
            message,
            error: detail,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload(err.body_text())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type Result<T> = std::result::Result<T, AppError>;
