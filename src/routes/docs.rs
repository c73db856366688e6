use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::survey_dto::{
    AnswerInput, CheckDeviceRequest, CheckDeviceResponse, SubmitResponseRequest,
};
use crate::models::response::Response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Survey API",
        description = "Collects one survey response per device. Every body is wrapped as {code, message, data}."
    ),
    paths(
        crate::routes::survey::check_device,
        crate::routes::survey::submit_response,
    ),
    components(schemas(
        CheckDeviceRequest,
        CheckDeviceResponse,
        SubmitResponseRequest,
        AnswerInput,
        Response,
    ))
)]
pub struct ApiDoc;

const SWAGGER_UI_VERSION: &str = "5.11.0";

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

pub async fn swagger_ui() -> impl IntoResponse {
    Html(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Survey API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{v}/swagger-ui.css">
    <script src="https://unpkg.com/swagger-ui-dist@{v}/swagger-ui-bundle.js"></script>
</head>
<body>
    <div id="swagger-ui"></div>
    <script>
        window.onload = function () {{
            SwaggerUIBundle({{
                url: "/api/openapi.json",
                dom_id: "#swagger-ui",
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis, SwaggerUIBundle.SwaggerUIStandalonePreset],
            }});
        }};
    </script>
</body>
</html>"##,
        v = SWAGGER_UI_VERSION
    ))
}
