//! Shared data structures for the fog analytics pipeline
//!
//! - `Sample`: one raw reading from the vehicle device
//! - `AggregatedSummary`: reduction of one full window
//! - `HealthAssessment`: health model output (subscores + decision flags)
//! - `ActuationPacket` / `CloudPacket`: outbound payloads

mod health;
mod packets;
mod sample;
mod summary;

pub use health::*;
pub use packets::*;
pub use sample::*;
pub use summary::*;
