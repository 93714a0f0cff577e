//! Outbound payloads (device actuation + cloud telemetry)
//!
//! Both packets serialize as flat JSON objects. Field names are part of the
//! device firmware and cloud ingestion contracts.

use serde::{Deserialize, Serialize};

/// Origin tag stamped on every actuation command.
pub const DECISION_ORIGIN: &str = "fog_node";

/// Immediate corrective command pushed to the vehicle device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuationPacket {
    pub timestamp_ms: i64,
    pub decision_origin: String,
    /// Always false: the decision was taken locally
    pub cloud_dependency: bool,

    pub trigger_measured_brake_temp_c: f64,
    pub trigger_brake_temp_rise_rate: f64,

    /// 1 when thermal protection fired, else 0
    pub fog_decision_critical_class: u8,
    /// 1 when any actuation is required, else 0
    pub fog_decision_actuation_triggered: u8,
    pub fog_decision_confidence: f64,

    pub fog_thermal_protection_active: bool,
    pub fog_vibration_damping_mode_active: bool,
    pub fog_predictive_service_required: bool,
    pub fog_emergency_safeguard_active: bool,
}

/// Health report posted to the cloud ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudPacket {
    pub vehicle_id: String,
    pub timestamp_ms: i64,

    pub thermal_brake_margin: f64,
    pub thermal_engine_margin: f64,
    pub thermal_stress_index: f64,

    pub mechanical_vibration_anomaly_score: f64,
    pub mechanical_dominant_fault_band_hz: f64,
    pub mechanical_vibration_rms: f64,

    pub electrical_charging_efficiency_score: f64,
    pub electrical_battery_health_pct: f64,

    pub vehicle_health_score: f64,
}
