//! API route handlers
//!
//! Read-only snapshots of the dispatch loop's latest outputs plus the
//! runtime link settings, which are also writable.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::{ConfigError, LinkSettings, SettingsCell, SettingsPatch};
use crate::pipeline::{DispatchStats, NodeState, NodeStatus};
use crate::types::{AggregatedSummary, HealthAssessment};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Latest outputs published by the dispatch loop
    pub node_state: Arc<RwLock<NodeState>>,
    /// Live link settings read by the dispatch loop every tick
    pub settings: SettingsCell,
}

// ============================================================================
// Liveness
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: NodeStatus,
    pub source: String,
    pub uptime_secs: u64,
    pub window_len: usize,
    pub window_capacity: usize,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub last_cloud_report_at: Option<DateTime<Utc>>,
    pub last_actuation_at: Option<DateTime<Utc>>,
    pub stats: DispatchStats,
    pub settings: LinkSettings,
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<ApiState>) -> Response {
    let node = state.node_state.read().await;
    ApiResponse::ok(StatusResponse {
        status: node.status,
        source: node.source.clone(),
        uptime_secs: node.uptime_secs(),
        window_len: node.window_len,
        window_capacity: node.window_capacity,
        last_tick_at: node.last_tick_at,
        last_cloud_report_at: node.last_cloud_report_at,
        last_actuation_at: node.last_actuation_at,
        stats: node.stats,
        settings: (*state.settings.load()).clone(),
    })
}

// ============================================================================
// Link Settings
// ============================================================================

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<ApiState>) -> Response {
    ApiResponse::ok((*state.settings.load()).clone())
}

/// PUT /api/v1/settings - partial update, validated before it is applied
pub async fn put_settings(
    State(state): State<ApiState>,
    body: Result<Json<SettingsPatch>, JsonRejection>,
) -> Response {
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiErrorResponse::malformed_body(rejection.body_text()),
    };

    match state.settings.update(&patch) {
        Ok(updated) => {
            info!(
                device_ip = %updated.device_ip,
                sample_period_secs = updated.sample_period_secs,
                window_secs = updated.window_secs,
                "Link settings updated via API"
            );
            ApiResponse::ok(updated)
        }
        Err(ConfigError::Validation(errors)) => ApiErrorResponse::invalid_settings(errors),
        Err(e) => ApiErrorResponse::invalid_settings(vec![e.to_string()]),
    }
}

// ============================================================================
// Latest Outputs
// ============================================================================

/// GET /api/v1/sample/latest - raw reading, unmodelled keys included
pub async fn get_latest_sample(State(state): State<ApiState>) -> Response {
    let node = state.node_state.read().await;
    match &node.latest_sample {
        Some(sample) => ApiResponse::ok(sample.clone()),
        None => ApiErrorResponse::no_data("No sample received yet"),
    }
}

#[derive(Debug, Serialize)]
pub struct LatestHealthResponse {
    pub assessment: HealthAssessment,
    pub summary: AggregatedSummary,
}

/// GET /api/v1/health/latest - latest scored window
pub async fn get_latest_health(State(state): State<ApiState>) -> Response {
    let node = state.node_state.read().await;
    match (&node.latest_assessment, &node.latest_summary) {
        (Some(assessment), Some(summary)) => ApiResponse::ok(LatestHealthResponse {
            assessment: *assessment,
            summary: summary.clone(),
        }),
        _ => ApiErrorResponse::no_data("Window has not filled yet"),
    }
}
