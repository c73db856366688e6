use std::time::Duration;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

pub fn survey_cors(max_age: Duration) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(max_age)
}
