use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Infrastructure failures of the storage layer.
///
/// These are opaque to callers: the response never carries the underlying
/// message, only that storage was unavailable.
#[derive(Error, Debug)]
pub enum StorageFault {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    /// The caller did not present administrator capability.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("License code not found")]
    CodeNotFound,

    #[error("License code already used")]
    CodeAlreadyUsed,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageFault),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::StorageUnavailable(StorageFault::Database(e))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::StorageUnavailable(StorageFault::Pool(e))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// True for the expected, user-facing outcomes of the core operations.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized | AppError::CodeNotFound | AppError::CodeAlreadyUsed
        )
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized", None),
            AppError::CodeNotFound => (StatusCode::NOT_FOUND, "Code not found", None),
            AppError::CodeAlreadyUsed => (StatusCode::CONFLICT, "Code already used", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::StorageUnavailable(e) => {
                tracing::error!("Storage error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
