//! HTTP route handlers.
//!
//! Routes are split into the kubelet-facing probe endpoints, the JSON API that
//! flips probe flags, and the dashboard page. Probe and API responses are never
//! cacheable.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod api;
pub mod dashboard;
pub mod health;

use axum::{
    http::header::{HeaderValue, CACHE_CONTROL},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Orchestrator probes - must always reflect the current flags
    let probe_routes = Router::new()
        .route("/startupz", get(health::startup))
        .route("/livez", get(health::liveness))
        .route("/readyz", get(health::readiness))
        .route("/health", get(health::health));

    // State machine API
    let api_routes = Router::new()
        .route("/api/status", get(api::status))
        .route("/api/toggle/startup", post(api::toggle_startup))
        .route("/api/toggle/liveness", post(api::toggle_liveness))
        .route("/api/toggle/readiness", post(api::toggle_readiness))
        .route("/api/liveness-test", post(api::liveness_test));

    let dashboard_routes = Router::new().route("/", get(dashboard::index));

    Router::new()
        .merge(probe_routes)
        .merge(api_routes)
        .merge(dashboard_routes)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        .layer(TraceLayer::new_for_http())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
