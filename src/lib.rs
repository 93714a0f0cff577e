//! Fog Node: edge analytics between a vehicle sensor device and the cloud
//!
//! Samples raw telemetry at a fixed cadence, keeps a sliding window of recent
//! readings, scores vehicle health from windowed aggregates, and decides
//! locally whether to actuate the vehicle, report to the cloud, or both.
//!
//! ## Architecture
//!
//! - **Acquisition**: device and cloud HTTP links, sample sources, sinks
//! - **Processing**: window, aggregation, health model, packet builders
//! - **Pipeline**: the fixed-cadence dispatch loop and its shared state
//! - **API**: operator surface for link settings and latest outputs

pub mod acquisition;
pub mod api;
pub mod config;
pub mod pipeline;
pub mod processing;
pub mod types;

// Re-export configuration
pub use config::{HealthConfig, LinkSettings, NodeConfig, SettingsCell};

// Re-export commonly used types
pub use types::{ActuationPacket, AggregatedSummary, CloudPacket, HealthAssessment, Sample};

// Re-export pipeline entry points
pub use pipeline::{DispatchLoop, DispatchStats, NodeState};
