use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i32,
    pub response_id: i32,
    pub question_key: String,
    pub question_title: Option<String>,
    pub answer_content: JsonValue,
    pub answered_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An answer ready to be written: validated and with its timestamp converted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub question_key: String,
    pub question_title: Option<String>,
    pub answer_content: Vec<JsonValue>,
    pub answered_time: DateTime<Utc>,
}
