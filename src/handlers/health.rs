// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{database::Database, error::AppError};

/// Reports liveness and which storage backend is active.
/// Answers 502 when the backend does not respond.
pub async fn health(State(db): State<Database>) -> Result<impl IntoResponse, AppError> {
    db.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "storage": db.backend().as_str(),
        "firebase": db.is_firebase_enabled(),
    })))
}
