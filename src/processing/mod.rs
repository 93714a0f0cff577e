//! Windowed analytics: buffer, aggregation, health scoring, packet building
//!
//! Everything here is synchronous and free of I/O; the dispatch loop owns the
//! window and calls these in sequence once per tick.

mod aggregation;
mod health_model;
mod packets;
mod window;

pub use aggregation::aggregate;
pub use health_model::{
    assess, charging_efficiency, electrical_risk, harmonic_deviation, load_stress,
    mechanical_risk, thermal_stress, unit,
};
pub use packets::{build_actuation_packet, build_cloud_packet};
pub use window::TelemetryWindow;

use thiserror::Error;

/// Errors in window aggregation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Cannot aggregate an empty window")]
    EmptyWindow,
}
