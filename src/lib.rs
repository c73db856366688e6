pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{check_service::CheckService, submission_service::SubmissionService};
use crate::utils::validation::ValidationRules;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub check_service: CheckService,
    pub submission_service: SubmissionService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let rules = ValidationRules {
            allowed_languages: config.allowed_languages.clone(),
        };
        let check_service = CheckService::new(pool.clone());
        let submission_service =
            SubmissionService::new(pool.clone(), rules, config.answered_time_policy);

        Self {
            pool,
            check_service,
            submission_service,
        }
    }
}

pub fn build_router(state: AppState, cors_max_age: Duration) -> Router {
    let survey_api = Router::new()
        .route("/api/check-device", post(routes::survey::check_device))
        .route("/api/submit-response", post(routes::survey::submit_response));

    let system_routes = Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .route("/api/status", get(routes::system::status))
        .route("/docs", get(routes::docs::swagger_ui))
        .route("/api/openapi.json", get(routes::docs::openapi_json));

    survey_api
        .merge(system_routes)
        .fallback(routes::system::not_found)
        .with_state(state)
        .layer(middleware::cors::survey_cors(cors_max_age))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}
