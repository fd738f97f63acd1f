use crate::config::Config;
use crate::errors::AppError;
use crate::models::RankedResponse;
use crate::provider_client::FlightOffersProvider;
use crate::services::FlightSearchService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Header the voice-assistant platform uses to send the shared server secret.
pub const SECRET_HEADER: &str = "x-vapi-secret";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Flight-offers provider, constructed once in `main` (or a fake in tests).
    pub provider: Arc<dyn FlightOffersProvider>,
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "routepilot-agent",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /flight-search (also mounted at /flightsearch)
///
/// Accepts either a direct search body or a voice-assistant tool-call
/// envelope, and answers with routes ranked best-first.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `headers` - Request headers, checked for the shared secret when one is configured.
/// * `payload` - Raw JSON body; unreadable bodies become a 400 `{"error": ...}`.
///
/// # Returns
///
/// * `Result<Json<RankedResponse>, AppError>` - Ranked routes, or `{"error": ...}` with 400/401/500.
pub async fn flight_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RankedResponse>, AppError> {
    tracing::info!("POST /flight-search");

    validate_webhook_secret(&state.config, &headers)?;

    let Json(payload) =
        payload.map_err(|rejection| AppError::invalid_field("body", rejection.body_text()))?;

    let service = FlightSearchService::new(state.provider.as_ref());
    let response = service.search(payload).await?;

    Ok(Json(response))
}

/// Validate the shared secret header, if a secret is configured.
fn validate_webhook_secret(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(ref expected_secret) = config.webhook_secret else {
        return Ok(());
    };

    let token = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", SECRET_HEADER)))?;

    if !constant_time_compare(token, expected_secret) {
        tracing::warn!("Invalid webhook secret received");
        return Err(AppError::Unauthorized("Invalid webhook secret".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (basic implementation)
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Serves the OpenAPI specification YAML file from the working directory.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    match tokio::fs::read_to_string("openapi.yml").await {
        Ok(content) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/yaml")],
            content,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "OpenAPI spec not found").into_response(),
    }
}

/// Serves a Swagger UI page pointed at `serve_openapi_spec`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>RoutePilot Agent - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
