use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One survey submission per device.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: i32,
    pub device_id: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Row returned by the upsert: the response plus whether it was freshly inserted.
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedResponse {
    #[sqlx(flatten)]
    pub response: Response,
    pub inserted: bool,
}
