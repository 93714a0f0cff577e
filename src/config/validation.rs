//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against the keys of a serialized default
//! `NodeConfig`, and emit warnings with "did you mean?" suggestions. Then
//! proceed with normal serde deserialization. Warnings never break existing
//! configs.

use std::collections::HashSet;

use super::defaults;
use super::node_config::NodeConfig;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path, derived from the default config so new
/// fields are picked up without a hand-kept list.
pub fn known_config_keys() -> HashSet<String> {
    match toml::Value::try_from(NodeConfig::default()) {
        Ok(value) => walk_toml_keys(&value, "").into_iter().collect(),
        Err(_) => HashSet::new(),
    }
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
/// Ties resolve alphabetically so the suggestion is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.clone())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails: parse errors are reported later by serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

fn positive(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(format!("{field} = {value} must be a finite value > 0"));
    }
}

fn non_negative(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(format!("{field} = {value} must be a finite value >= 0"));
    }
}

/// Validate link settings given as raw values. Shared by file loading and the
/// operator settings endpoint.
pub fn validate_link(device_ip: &str, sample_period_secs: f64, window_secs: f64) -> Vec<String> {
    let mut errors = Vec::new();

    if device_ip.trim().is_empty() {
        errors.push("device.ip must not be empty".to_string());
    } else if device_ip.chars().any(char::is_whitespace) {
        errors.push(format!("device.ip = '{device_ip}' must not contain whitespace"));
    }

    positive(&mut errors, "sampling.sample_period_secs", sample_period_secs);
    if sample_period_secs > defaults::MAX_SAMPLE_PERIOD_SECS {
        errors.push(format!(
            "sampling.sample_period_secs = {sample_period_secs} exceeds {} s",
            defaults::MAX_SAMPLE_PERIOD_SECS
        ));
    }

    positive(&mut errors, "sampling.window_secs", window_secs);
    if window_secs.is_finite() && sample_period_secs.is_finite() && window_secs < sample_period_secs
    {
        errors.push(format!(
            "sampling.window_secs = {window_secs} is shorter than one sample period ({sample_period_secs} s)"
        ));
    }
    if window_secs > defaults::MAX_WINDOW_SECS {
        errors.push(format!(
            "sampling.window_secs = {window_secs} exceeds {} s",
            defaults::MAX_WINDOW_SECS
        ));
    }

    errors
}

/// Validate every section of a parsed `NodeConfig`.
///
/// Returns all violations at once; an empty list means the config is usable.
pub fn validate_ranges(config: &NodeConfig) -> Vec<String> {
    let mut errors = validate_link(
        &config.device.ip,
        config.sampling.sample_period_secs,
        config.sampling.window_secs,
    );

    if config.device.sample_path.trim_matches('/').is_empty() {
        errors.push("device.sample_path must not be empty".to_string());
    }
    if config.device.actuation_path.trim_matches('/').is_empty() {
        errors.push("device.actuation_path must not be empty".to_string());
    }

    if !(config.cloud.url.starts_with("http://") || config.cloud.url.starts_with("https://")) {
        errors.push(format!(
            "cloud.url = '{}' must start with http:// or https://",
            config.cloud.url
        ));
    }
    non_negative(
        &mut errors,
        "cloud.idle_report_interval_secs",
        config.cloud.idle_report_interval_secs,
    );

    for (field, ms) in [
        ("timeouts.fetch_ms", config.timeouts.fetch_ms),
        ("timeouts.actuation_ms", config.timeouts.actuation_ms),
        ("timeouts.cloud_ms", config.timeouts.cloud_ms),
    ] {
        if ms == 0 {
            errors.push(format!("{field} must be > 0"));
        }
    }

    if config.server.addr.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "server.addr = '{}' is not a valid socket address",
            config.server.addr
        ));
    }

    let h = &config.health;

    // Spans are divisors in the health model
    positive(&mut errors, "health.thermal.brake_max_temp_c", h.thermal.brake_max_temp_c);
    positive(&mut errors, "health.thermal.oil_max_temp_c", h.thermal.oil_max_temp_c);
    positive(&mut errors, "health.thermal.cooling_delta_span_c", h.thermal.cooling_delta_span_c);
    positive(
        &mut errors,
        "health.thermal.engine_margin_reference_c",
        h.thermal.engine_margin_reference_c,
    );
    positive(&mut errors, "health.mechanical.vibration_rms_span", h.mechanical.vibration_rms_span);
    positive(&mut errors, "health.load.rpm_redline", h.load.rpm_redline);
    positive(
        &mut errors,
        "health.load.fuel_efficiency_reference_kmpl",
        h.load.fuel_efficiency_reference_kmpl,
    );

    for (field, w) in [
        ("health.thermal.brake_weight", h.thermal.brake_weight),
        ("health.thermal.oil_weight", h.thermal.oil_weight),
        ("health.thermal.cooling_weight", h.thermal.cooling_weight),
        ("health.mechanical.harmonic_deviation_gain", h.mechanical.harmonic_deviation_gain),
        ("health.mechanical.harmonic_weight", h.mechanical.harmonic_weight),
        ("health.mechanical.rms_weight", h.mechanical.rms_weight),
        ("health.load.engine_weight", h.load.engine_weight),
        ("health.load.interaction_weight", h.load.interaction_weight),
        ("health.weights.thermal", h.weights.thermal),
        ("health.weights.mechanical", h.weights.mechanical),
        ("health.weights.electrical", h.weights.electrical),
        ("health.weights.load", h.weights.load),
    ] {
        non_negative(&mut errors, field, w);
    }

    let sum = h.weights.sum();
    if (sum - 1.0).abs() > 0.01 {
        errors.push(format!("health.weights must sum to 1.0 (got {sum:.3})"));
    }

    let d = &h.decision;
    for (field, v) in [
        ("health.decision.emergency_health", d.emergency_health),
        ("health.decision.predictive_service_health", d.predictive_service_health),
        ("health.decision.confidence_floor", d.confidence_floor),
    ] {
        if !(0.0..=1.0).contains(&v) {
            errors.push(format!("{field} = {v} must be within [0, 1]"));
        }
    }
    if d.emergency_health > d.predictive_service_health {
        errors.push(format!(
            "health.decision.emergency_health ({}) must not exceed predictive_service_health ({})",
            d.emergency_health, d.predictive_service_health
        ));
    }
    if !d.thermal_protection_temp_c.is_finite() || !d.thermal_protection_rise_rate.is_finite() {
        errors.push("health.decision thermal protection thresholds must be finite".to_string());
    }

    errors
}

// ============================================================================
// Tests
// ============================================================================
