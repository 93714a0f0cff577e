//! Node State and Status
//!
//! Latest outputs of the dispatch loop, shared with the operator API.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{AggregatedSummary, HealthAssessment, Sample};

// ============================================================================
// Dispatch Counters
// ============================================================================

/// Running totals since the loop started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub ticks: u64,
    pub samples_received: u64,
    /// Ticks without a sample (fetch failure, timeout, malformed body)
    pub samples_absent: u64,
    pub windows_scored: u64,
    pub actuations_sent: u64,
    pub cloud_reports_sent: u64,
    /// Sends that failed and were dropped
    pub dispatch_failures: u64,
    /// Ticks whose body returned an error
    pub tick_errors: u64,
}

// ============================================================================
// Node State
// ============================================================================

/// Shared node state, wrapped in `Arc<RwLock<>>` for the API handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeState {
    /// Process start (serializes via `uptime_secs`)
    #[serde(skip, default = "Instant::now")]
    pub started: Instant,

    pub status: NodeStatus,

    /// Name of the active sample source ("device", "replay")
    pub source: String,

    /// Latest raw reading, including unmodelled keys
    pub latest_sample: Option<Sample>,

    /// Latest full-window reduction and its score
    pub latest_summary: Option<AggregatedSummary>,
    pub latest_assessment: Option<HealthAssessment>,

    pub last_tick_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_cloud_report_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_actuation_at: Option<chrono::DateTime<chrono::Utc>>,

    pub window_len: usize,
    pub window_capacity: usize,

    pub stats: DispatchStats,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            status: NodeStatus::Initializing,
            source: String::new(),
            latest_sample: None,
            latest_summary: None,
            latest_assessment: None,
            last_tick_at: None,
            last_cloud_report_at: None,
            last_actuation_at: None,
            window_len: 0,
            window_capacity: 0,
            stats: DispatchStats::default(),
        }
    }
}

impl NodeState {
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Status implied by the latest window state.
    pub fn derive_status(&self) -> NodeStatus {
        match (&self.latest_assessment, self.window_len >= self.window_capacity) {
            (_, _) if self.window_capacity == 0 => NodeStatus::Initializing,
            (Some(a), true) if a.actuation => NodeStatus::Alert,
            (Some(_), true) => NodeStatus::Monitoring,
            _ => NodeStatus::Filling,
        }
    }
}

/// Node operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Loop not started yet
    Initializing,
    /// Collecting samples until the window is full
    Filling,
    /// Scoring every tick, no action required
    Monitoring,
    /// Latest assessment requested actuation
    Alert,
    /// Loop has exited (cancelled or source exhausted)
    Stopped,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Initializing => write!(f, "Initializing"),
            NodeStatus::Filling => write!(f, "Filling"),
            NodeStatus::Monitoring => write!(f, "Monitoring"),
            NodeStatus::Alert => write!(f, "Alert"),
            NodeStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(actuation: bool) -> HealthAssessment {
        HealthAssessment {
            thermal_stress: 0.2,
            mechanical_risk: 0.1,
            electrical_risk: 0.0,
            load_stress: 0.3,
            vehicle_health: 0.8,
            thermal_protection: actuation,
            emergency: false,
            actuation,
            confidence: 0.97,
        }
    }

    #[test]
    fn status_follows_window_and_assessment() {
        let mut state = NodeState::default();
        assert_eq!(state.derive_status(), NodeStatus::Initializing);

        state.window_capacity = 4;
        state.window_len = 2;
        assert_eq!(state.derive_status(), NodeStatus::Filling);

        state.window_len = 4;
        state.latest_assessment = Some(assessment(false));
        assert_eq!(state.derive_status(), NodeStatus::Monitoring);

        state.latest_assessment = Some(assessment(true));
        assert_eq!(state.derive_status(), NodeStatus::Alert);

        // capacity grew, window refilling
        state.window_capacity = 8;
        assert_eq!(state.derive_status(), NodeStatus::Filling);
    }
}
