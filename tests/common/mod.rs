#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use survey_backend::{build_router, config::Config, database::pool, AppState};
use tower::ServiceExt;

pub async fn setup_app() -> (Router, PgPool) {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("config");
    let pool = pool::create_pool(&config.database).await.expect("pool");
    pool::run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(pool.clone(), &config);
    (build_router(state, Duration::from_secs(600)), pool)
}

/// Device ids unique across concurrently running tests.
pub fn unique_device_id(tag: &str) -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!(
        "{}-{}-{}-{}",
        tag,
        std::process::id(),
        nanos,
        SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

pub async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, bytes.to_vec())
}

pub async fn response_rows(pool: &PgPool, device_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE device_id = $1")
        .bind(device_id)
        .fetch_one(pool)
        .await
        .expect("count responses")
}

pub async fn answer_rows(pool: &PgPool, device_id: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM answers a JOIN responses r ON r.id = a.response_id WHERE r.device_id = $1",
    )
    .bind(device_id)
    .fetch_one(pool)
    .await
    .expect("count answers")
}
