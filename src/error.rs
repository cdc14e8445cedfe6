// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::storage::StoreError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (e.g., an id the database cannot store)
    BadRequest(String),

    // 502 Bad Gateway (remote database failed)
    Upstream(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Remote database error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Database unavailable".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `StoreError` into an `AppError`.
/// Allows using `?` operator on database calls inside handlers.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Remote { .. } | StoreError::Transport(_) | StoreError::Auth(_) => {
                AppError::Upstream(err.to_string())
            }
            StoreError::Decode(_) | StoreError::Config(_) => {
                AppError::InternalServerError(err.to_string())
            }
            StoreError::InvalidKey(_) => AppError::BadRequest(err.to_string()),
        }
    }
}
