//! Windowed aggregate types

use serde::{Deserialize, Serialize};

/// Statistical reduction of one full window of samples.
///
/// Recomputed from scratch on every full window and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSummary {
    /// Identity of the newest sample in the window
    pub device_id: String,
    pub vehicle_id: String,
    /// Timestamp of the newest sample (window end)
    pub timestamp_ms: i64,

    // === Thermal ===
    /// Peak brake temperature across the window (°C)
    pub brake_temp_c: f64,
    /// (last − first) brake temperature over the floored window span (°C/s)
    pub brake_temp_rise_rate: f64,
    pub engine_oil_temp_c: f64,
    pub radiator_temp_c: f64,

    // === Mechanical ===
    pub motor_rpm: f64,
    /// Population variance of motor RPM
    pub engine_rpm_variance: f64,
    /// Root of the mean squared per-sample vibration RMS
    pub vibration_rms: f64,
    pub dominant_vibration_hz: f64,

    // === Electrical ===
    pub battery_voltage_v: f64,
    pub output_voltage_v: f64,
    pub battery_health_pct: f64,

    // === Braking (newest sample) ===
    pub brake_pad_remaining_pct: f64,
    pub brake_disc_score: f64,

    // === Load ===
    pub engine_load_pct: f64,
    pub fuel_efficiency_kmpl: f64,
    pub vehicle_speed_kmph: f64,
}
