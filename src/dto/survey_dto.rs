use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

/// Uniform body for every response: `code` mirrors the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckDeviceRequest {
    #[validate(length(min = 1, max = 100))]
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckDeviceResponse {
    pub has_submitted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    #[validate(length(min = 1, max = 50))]
    pub question_key: String,
    pub question_title: Option<String>,
    /// Selected value(s); any JSON values, stored as given.
    #[schema(value_type = Vec<Object>)]
    pub answer: Vec<JsonValue>,
    /// Epoch milliseconds.
    #[schema(value_type = i64)]
    pub answered_time: serde_json::Number,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    #[validate(length(min = 1, max = 100))]
    pub device_id: String,
    #[validate(length(min = 1, max = 10))]
    pub language: String,
    #[validate(length(min = 1), nested)]
    pub answers: Vec<AnswerInput>,
    /// Epoch milliseconds; server time when absent.
    #[schema(value_type = Option<i64>)]
    pub completed_at: Option<serde_json::Number>,
}
