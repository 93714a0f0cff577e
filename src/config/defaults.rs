//! System-wide default constants.
//!
//! Every tunable in [`NodeConfig`](super::NodeConfig) defaults to one of these.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Device Link
// ============================================================================

/// Vehicle device address (host or host:port).
pub const DEVICE_IP: &str = "192.168.213.78";

/// Device path serving one telemetry reading per GET.
pub const SAMPLE_PATH: &str = "next";

/// Device path accepting actuation commands via PUT.
pub const ACTUATION_PATH: &str = "flags";

// ============================================================================
// Sampling
// ============================================================================

/// Tick period of the dispatch loop (seconds).
pub const SAMPLE_PERIOD_SECS: f64 = 0.5;

/// Sliding window length (seconds). 10 s at 0.5 s = 20 samples.
pub const WINDOW_SECS: f64 = 10.0;

/// Longest accepted sample period (seconds).
pub const MAX_SAMPLE_PERIOD_SECS: f64 = 3_600.0;

/// Longest accepted window (seconds).
pub const MAX_WINDOW_SECS: f64 = 86_400.0;

// ============================================================================
// Cloud Link
// ============================================================================

/// Cloud ingestion endpoint for health reports.
pub const CLOUD_URL: &str =
    "https://fog-based-vehicle-monitoring.onrender.com/api/intelligence/insert";

/// A non-actuation window is reported only once this much time has passed
/// since the previous cloud send (seconds).
pub const IDLE_REPORT_INTERVAL_SECS: f64 = 10.0;

// ============================================================================
// HTTP Timeouts
// ============================================================================

/// Sample fetch timeout (ms). Kept below the sample period.
pub const FETCH_TIMEOUT_MS: u64 = 300;

/// Actuation push timeout (ms).
pub const ACTUATION_TIMEOUT_MS: u64 = 300;

/// Cloud report timeout (ms).
pub const CLOUD_TIMEOUT_MS: u64 = 2_000;

// ============================================================================
// Operator Surface
// ============================================================================

/// Operator HTTP server bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Health Model: Thermal
// ============================================================================

/// Maximum safe brake temperature (°C). Brake stress and margin reference.
pub const BRAKE_MAX_TEMP_C: f64 = 220.0;

/// Maximum safe engine oil temperature (°C).
pub const OIL_MAX_TEMP_C: f64 = 130.0;

/// Oil-minus-radiator temperature delta that counts as full cooling stress (°C).
pub const COOLING_DELTA_SPAN_C: f64 = 40.0;

pub const THERMAL_BRAKE_WEIGHT: f64 = 0.5;
pub const THERMAL_OIL_WEIGHT: f64 = 0.3;
pub const THERMAL_COOLING_WEIGHT: f64 = 0.2;

/// Oil temperature at which the reported engine margin reaches zero (°C).
pub const ENGINE_MARGIN_REFERENCE_C: f64 = 140.0;

// ============================================================================
// Health Model: Mechanical
// ============================================================================

/// Gain applied to the off-harmonic deviation (0.5 deviation = full risk).
pub const HARMONIC_DEVIATION_GAIN: f64 = 2.0;

/// Vibration RMS that counts as full vibration risk (g).
pub const VIBRATION_RMS_SPAN: f64 = 2.0;

pub const MECHANICAL_HARMONIC_WEIGHT: f64 = 0.6;
pub const MECHANICAL_RMS_WEIGHT: f64 = 0.4;

// ============================================================================
// Health Model: Load
// ============================================================================

/// RPM normalizer for the RPM/fuel-efficiency interaction term.
pub const RPM_REDLINE: f64 = 6_000.0;

/// Fuel efficiency at which the interaction term vanishes (km/l).
pub const FUEL_EFFICIENCY_REFERENCE_KMPL: f64 = 20.0;

pub const LOAD_ENGINE_WEIGHT: f64 = 0.5;
pub const LOAD_INTERACTION_WEIGHT: f64 = 0.5;

// ============================================================================
// Health Model: Composite Weights
// ============================================================================

pub const HEALTH_WEIGHT_THERMAL: f64 = 0.35;
pub const HEALTH_WEIGHT_MECHANICAL: f64 = 0.30;
pub const HEALTH_WEIGHT_ELECTRICAL: f64 = 0.20;
pub const HEALTH_WEIGHT_LOAD: f64 = 0.15;

// ============================================================================
// Health Model: Decisions
// ============================================================================

/// Brake temperature that must be exceeded for thermal protection (°C).
pub const THERMAL_PROTECTION_TEMP_C: f64 = 180.0;

/// Brake temperature rise rate that must be exceeded for thermal protection (°C/s).
pub const THERMAL_PROTECTION_RISE_RATE: f64 = 2.5;

/// Composite health below which the emergency safeguard engages.
pub const EMERGENCY_HEALTH_THRESHOLD: f64 = 0.35;

/// Composite health below which predictive service is requested.
pub const PREDICTIVE_SERVICE_THRESHOLD: f64 = 0.5;

/// Confidence when mechanical risk is maximal; rises linearly to 1.0 at zero risk.
pub const CONFIDENCE_FLOOR: f64 = 0.7;
