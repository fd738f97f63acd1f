//! HTTP routes.

use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request size limit for search payloads.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Search routes, still missing their state. `main` wraps these in the
/// rate limiter.
pub fn search_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/flight-search", post(handlers::flight_search))
        // Path the voice assistant is registered with
        .route("/flightsearch", post(handlers::flight_search))
        .route("/docs", get(handlers::serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(handlers::serve_openapi_spec))
        .layer(
            ServiceBuilder::new()
                // Request size limit: search payloads are tiny
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}

/// Full application: health check plus `protected` search routes.
pub fn app(state: Arc<AppState>, protected: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Application without rate limiting, as used by tests.
pub fn router(state: Arc<AppState>) -> Router {
    app(state, search_routes())
}
