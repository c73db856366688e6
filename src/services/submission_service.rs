use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::config::AnsweredTimePolicy;
use crate::dto::survey_dto::SubmitResponseRequest;
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::response::{Response, UpsertedResponse};
use crate::utils::time::{from_epoch_millis, now, resolve_answered_time};
use crate::utils::validation::{parse_submission, ValidationRules};

/// A submission that passed validation and timestamp conversion.
#[derive(Debug, Clone)]
pub struct Submission {
    pub device_id: String,
    pub language: String,
    pub completed_at: DateTime<Utc>,
    pub answers: Vec<NewAnswer>,
}

impl Submission {
    pub fn from_request(
        req: SubmitResponseRequest,
        policy: AnsweredTimePolicy,
        received_at: DateTime<Utc>,
    ) -> Result<Self> {
        let completed_at = match &req.completed_at {
            Some(ms) => from_epoch_millis(ms).ok_or_else(|| {
                Error::InvalidInput(
                    "invalid completedAt: timestamp is out of range".to_string(),
                )
            })?,
            None => received_at,
        };

        let answers = req
            .answers
            .into_iter()
            .map(|a| -> Result<NewAnswer> {
                let answered_time = resolve_answered_time(&a.answered_time, policy, received_at)
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "answeredTime for `{}` is out of range",
                            a.question_key
                        ))
                    })?;
                Ok(NewAnswer {
                    question_key: a.question_key,
                    question_title: a.question_title,
                    answer_content: a.answer,
                    answered_time,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            device_id: req.device_id,
            language: req.language,
            completed_at,
            answers,
        })
    }
}

#[derive(Clone)]
pub struct SubmissionService {
    pool: PgPool,
    rules: ValidationRules,
    answered_time_policy: AnsweredTimePolicy,
}

impl SubmissionService {
    pub fn new(
        pool: PgPool,
        rules: ValidationRules,
        answered_time_policy: AnsweredTimePolicy,
    ) -> Self {
        Self {
            pool,
            rules,
            answered_time_policy,
        }
    }

    /// Validates a raw payload and stores it. Invalid payloads never reach
    /// the database.
    pub async fn submit(&self, body: &JsonValue) -> Result<Response> {
        let req = parse_submission(body, &self.rules)?;
        let submission = Submission::from_request(req, self.answered_time_policy, now())?;
        self.store(submission).await
    }

    /// Upserts the device's response and replaces its answer set in one
    /// transaction. The unique index on `device_id` makes the upsert take a
    /// row lock, so concurrent submissions for one device serialize.
    pub async fn store(&self, submission: Submission) -> Result<Response> {
        let mut tx = self.pool.begin().await?;

        let upserted = sqlx::query_as::<_, UpsertedResponse>(
            r#"
            INSERT INTO responses (device_id, language, completed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (device_id) DO UPDATE
            SET language = EXCLUDED.language, completed_at = EXCLUDED.completed_at
            RETURNING id, device_id, language, created_at, completed_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(&submission.device_id)
        .bind(&submission.language)
        .bind(submission.completed_at)
        .fetch_one(&mut *tx)
        .await?;

        let response = upserted.response;
        let mut replaced = 0;
        if !upserted.inserted {
            replaced = sqlx::query("DELETE FROM answers WHERE response_id = $1")
                .bind(response.id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        let mut insert = QueryBuilder::<Postgres>::new(
            "INSERT INTO answers (response_id, question_key, question_title, answer_content, answered_time) ",
        );
        insert.push_values(&submission.answers, |mut row, answer| {
            row.push_bind(response.id)
                .push_bind(answer.question_key.clone())
                .push_bind(answer.question_title.clone())
                .push_bind(JsonValue::Array(answer.answer_content.clone()))
                .push_bind(answer.answered_time);
        });
        insert.build().execute(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(
            device_id = %response.device_id,
            response_id = response.id,
            created = upserted.inserted,
            answers = submission.answers.len(),
            replaced_answers = replaced,
            "Survey response stored"
        );
        Ok(response)
    }

    pub async fn get_by_device(&self, device_id: &str) -> Result<Option<Response>> {
        let response = sqlx::query_as::<_, Response>(
            r#"SELECT id, device_id, language, created_at, completed_at FROM responses WHERE device_id = $1"#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(response)
    }

    pub async fn list_answers(&self, response_id: i32) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, response_id, question_key, question_title, answer_content, answered_time, created_at
            FROM answers
            WHERE response_id = $1
            ORDER BY id
            "#,
        )
        .bind(response_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(answered_time: JsonValue, completed_at: Option<JsonValue>) -> SubmitResponseRequest {
        let mut body = json!({
            "deviceId": "dev1",
            "language": "en",
            "answers": [
                {"questionKey": "q1", "answer": ["A", "B"], "answeredTime": answered_time}
            ]
        });
        if let Some(c) = completed_at {
            body["completedAt"] = c;
        }
        parse_submission(&body, &ValidationRules::default()).unwrap()
    }

    fn received() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_800_000_000_000).unwrap()
    }

    #[test]
    fn converts_timestamps_and_keeps_answer_structure() {
        let sub = Submission::from_request(
            request(json!(1_700_000_000_000u64), None),
            AnsweredTimePolicy::Reject,
            received(),
        )
        .unwrap();
        assert_eq!(sub.completed_at, received());
        assert_eq!(sub.answers.len(), 1);
        assert_eq!(sub.answers[0].answer_content, vec![json!("A"), json!("B")]);
        assert_eq!(sub.answers[0].answered_time.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn client_completed_at_is_honoured() {
        let sub = Submission::from_request(
            request(json!(1), Some(json!(1_700_000_123_000u64))),
            AnsweredTimePolicy::Reject,
            received(),
        )
        .unwrap();
        assert_eq!(sub.completed_at.timestamp_millis(), 1_700_000_123_000);
    }

    #[test]
    fn unconvertible_answered_time_follows_policy() {
        let rejected = Submission::from_request(
            request(json!(1e300), None),
            AnsweredTimePolicy::Reject,
            received(),
        );
        assert!(matches!(rejected, Err(Error::InvalidInput(_))));

        let fallback = Submission::from_request(
            request(json!(1e300), None),
            AnsweredTimePolicy::Fallback,
            received(),
        )
        .unwrap();
        assert_eq!(fallback.answers[0].answered_time, received());
    }
}
