//! API route definitions
//!
//! - /api/v1/status - node status and dispatch counters
//! - /api/v1/settings - runtime link settings (GET, PUT)
//! - /api/v1/sample/latest - latest raw reading
//! - /api/v1/health/latest - latest assessment and summary

use axum::{routing::get, Router};

use super::handlers::{self, ApiState};

/// Versioned operator routes, nested under `/api/v1`
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route("/sample/latest", get(handlers::get_latest_sample))
        .route("/health/latest", get(handlers::get_latest_health))
        .with_state(state)
}

/// Liveness endpoint at root level
pub fn root_routes() -> Router {
    Router::new().route("/health", get(handlers::liveness))
}
