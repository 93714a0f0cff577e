//! Raw telemetry sample types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identity placeholder for readings that did not report a device or vehicle id.
pub const UNKNOWN_ID: &str = "unknown";

/// One raw telemetry reading pulled from the vehicle device.
///
/// Every field is defaulted: a missing key, `null`, or a value of the wrong
/// JSON type resolves to `0` (numeric) or [`UNKNOWN_ID`] (identity) instead
/// of failing the whole reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    #[serde(deserialize_with = "lenient_string")]
    pub device_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub vehicle_id: String,
    /// Device clock at capture (milliseconds)
    #[serde(deserialize_with = "lenient_i64")]
    pub timestamp_ms: i64,

    // === Thermal ===
    /// Brake temperature (°C)
    #[serde(deserialize_with = "lenient_f64")]
    pub brake_temp_c: f64,
    /// Engine oil temperature (°C)
    #[serde(deserialize_with = "lenient_f64")]
    pub engine_oil_temp_c: f64,
    /// Radiator coolant temperature (°C)
    #[serde(deserialize_with = "lenient_f64")]
    pub radiator_temp_c: f64,

    // === Mechanical ===
    #[serde(deserialize_with = "lenient_f64")]
    pub motor_rpm: f64,
    /// Vibration RMS (g)
    #[serde(deserialize_with = "lenient_f64")]
    pub vibration_rms: f64,
    /// Dominant vibration frequency (Hz)
    #[serde(deserialize_with = "lenient_f64")]
    pub dominant_vibration_hz: f64,

    // === Electrical ===
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_voltage_v: f64,
    /// Charging system output voltage (V)
    #[serde(deserialize_with = "lenient_f64")]
    pub output_voltage_v: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_health_pct: f64,

    // === Braking ===
    #[serde(deserialize_with = "lenient_f64")]
    pub brake_pad_remaining_pct: f64,
    /// Disc condition score (0-1, 1 = new)
    #[serde(deserialize_with = "lenient_f64")]
    pub brake_disc_score: f64,

    // === Load ===
    #[serde(deserialize_with = "lenient_f64")]
    pub engine_load_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fuel_efficiency_kmpl: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub vehicle_speed_kmph: f64,

    /// Readings the node does not model, passed through for display.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            device_id: UNKNOWN_ID.to_string(),
            vehicle_id: UNKNOWN_ID.to_string(),
            timestamp_ms: 0,
            brake_temp_c: 0.0,
            engine_oil_temp_c: 0.0,
            radiator_temp_c: 0.0,
            motor_rpm: 0.0,
            vibration_rms: 0.0,
            dominant_vibration_hz: 0.0,
            battery_voltage_v: 0.0,
            output_voltage_v: 0.0,
            battery_health_pct: 0.0,
            brake_pad_remaining_pct: 0.0,
            brake_disc_score: 0.0,
            engine_load_pct: 0.0,
            fuel_efficiency_kmpl: 0.0,
            vehicle_speed_kmph: 0.0,
            extra: Map::new(),
        }
    }
}

impl Sample {
    /// Build a sample from a decoded JSON body.
    ///
    /// Returns `None` unless the body is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Parse a sample from raw JSON text (one reading per document).
    pub fn from_json_str(text: &str) -> Option<Self> {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(Self::from_value)
    }
}

// ============================================================================
// Lenient field decoders
// ============================================================================

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        // Float timestamps truncate toward zero (saturating)
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        _ => 0,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => UNKNOWN_ID.to_string(),
    })
}
