use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::Result;
use crate::utils::validation::{check_device_id, parse_check_device};

#[derive(Clone)]
pub struct CheckService {
    pool: PgPool,
}

impl CheckService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn check(&self, body: &JsonValue) -> Result<bool> {
        let req = parse_check_device(body)?;
        self.has_submitted(&req.device_id).await
    }

    /// Read-only; absence is a valid `false`, not an error.
    pub async fn has_submitted(&self, device_id: &str) -> Result<bool> {
        check_device_id(Some(&JsonValue::from(device_id)))?;

        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM responses WHERE device_id = $1)"#,
        )
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(device_id, exists, "Checked device submission");
        Ok(exists)
    }
}
