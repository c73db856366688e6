use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::Value as JsonValue;

use crate::dto::survey_dto::{ApiEnvelope, CheckDeviceResponse};
use crate::error::Result;
use crate::models::response::Response;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/check-device",
    request_body = crate::dto::survey_dto::CheckDeviceRequest,
    responses(
        (status = 200, description = "Whether the device already submitted, inside the {code, message, data} envelope", body = CheckDeviceResponse),
        (status = 400, description = "Missing or invalid deviceId"),
        (status = 500, description = "Internal server error"),
    ),
)]
pub async fn check_device(
    State(state): State<AppState>,
    payload: std::result::Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<ApiEnvelope<CheckDeviceResponse>>> {
    let Json(body) = payload?;
    let has_submitted = state.check_service.check(&body).await?;
    Ok(Json(ApiEnvelope::success(CheckDeviceResponse { has_submitted })))
}

#[utoipa::path(
    post,
    path = "/api/submit-response",
    request_body = crate::dto::survey_dto::SubmitResponseRequest,
    responses(
        (status = 200, description = "Stored response row, inside the {code, message, data} envelope", body = Response),
        (status = 400, description = "Malformed body or failed field validation"),
        (status = 500, description = "Internal server error"),
    ),
)]
pub async fn submit_response(
    State(state): State<AppState>,
    payload: std::result::Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<ApiEnvelope<Response>>> {
    let Json(body) = payload?;
    let response = state.submission_service.submit(&body).await?;
    Ok(Json(ApiEnvelope::success(response)))
}
