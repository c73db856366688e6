use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::database::pool::ping;
use crate::dto::survey_dto::ApiEnvelope;
use crate::error::Error;
use crate::AppState;

#[axum::debug_handler]
pub async fn index() -> impl IntoResponse {
    "Survey API is running"
}

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
    });
    (StatusCode::OK, Json(body))
}

/// Operational summary. A failing database ping is reported, not raised.
#[axum::debug_handler]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let database = match ping(&state.pool).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = ?e, "Database ping failed");
            "unavailable"
        }
    };
    Json(ApiEnvelope::success(json!({
        "status": "operational",
        "timestamp": Utc::now().to_rfc3339(),
        "database": database,
        "message": "system is running",
    })))
}

pub async fn not_found(uri: Uri) -> Error {
    Error::NotFound(format!("route not found: {}", uri.path()))
}
