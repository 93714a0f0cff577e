//! Node Configuration - every link, timing and health-model constant as TOML
//!
//! Each struct implements `Default` with the values in [`defaults`](super::defaults),
//! so a missing file or a missing section leaves behavior unchanged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;
use super::settings::LinkSettings;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "FOG_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "fog_node.toml";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one fog node deployment.
///
/// Load with [`NodeConfig::load()`] which searches:
/// 1. `$FOG_CONFIG`
/// 2. `./fog_node.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Vehicle device link
    #[serde(default)]
    pub device: DeviceConfig,

    /// Tick period and window length
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Cloud ingestion link
    #[serde(default)]
    pub cloud: CloudConfig,

    /// HTTP timeouts for every outbound call
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Operator HTTP surface
    #[serde(default)]
    pub server: ServerConfig,

    /// Health model weights and thresholds
    #[serde(default)]
    pub health: HealthConfig,
}

impl NodeConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults when no readable, valid file is found.
    ///
    /// Also returns the path the config came from (for the file watcher).
    pub fn load() -> (Self, Option<PathBuf>) {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded node config from {}", CONFIG_ENV_VAR);
                        return (config, Some(p));
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./fog_node.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded node config from ./{}", LOCAL_CONFIG_FILE);
                    return (config, Some(local));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        (Self::default(), None)
    }

    /// Load and validate a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are reported as warnings only.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for values the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_ranges(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Initial runtime-mutable link settings.
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            device_ip: self.device.ip.clone(),
            sample_period_secs: self.sampling.sample_period_secs,
            window_secs: self.sampling.window_secs,
        }
    }
}

// ============================================================================
// Link Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device address (host or host:port), overridable at runtime
    pub ip: String,
    /// GET path returning one sample
    pub sample_path: String,
    /// PUT path accepting actuation commands
    pub actuation_path: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ip: defaults::DEVICE_IP.to_string(),
            sample_path: defaults::SAMPLE_PATH.to_string(),
            actuation_path: defaults::ACTUATION_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub sample_period_secs: f64,
    pub window_secs: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_period_secs: defaults::SAMPLE_PERIOD_SECS,
            window_secs: defaults::WINDOW_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub url: String,
    /// Minimum gap between non-actuation cloud reports (seconds)
    pub idle_report_interval_secs: f64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            url: defaults::CLOUD_URL.to_string(),
            idle_report_interval_secs: defaults::IDLE_REPORT_INTERVAL_SECS,
        }
    }
}

impl CloudConfig {
    pub fn idle_report_interval(&self) -> Duration {
        if self.idle_report_interval_secs.is_finite() && self.idle_report_interval_secs >= 0.0 {
            Duration::from_secs_f64(self.idle_report_interval_secs.min(defaults::MAX_WINDOW_SECS))
        } else {
            Duration::from_secs_f64(defaults::IDLE_REPORT_INTERVAL_SECS)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub fetch_ms: u64,
    pub actuation_ms: u64,
    pub cloud_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            fetch_ms: defaults::FETCH_TIMEOUT_MS,
            actuation_ms: defaults::ACTUATION_TIMEOUT_MS,
            cloud_ms: defaults::CLOUD_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
        }
    }
}

// ============================================================================
// Health Model Section
// ============================================================================

/// Weights and thresholds of the health model.
///
/// Defaults reproduce the canonical scoring; override per vehicle class in
/// `[health.*]` sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default)]
    pub thermal: ThermalModelConfig,
    #[serde(default)]
    pub mechanical: MechanicalModelConfig,
    #[serde(default)]
    pub load: LoadModelConfig,
    #[serde(default)]
    pub weights: HealthWeights,
    #[serde(default)]
    pub decision: DecisionThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalModelConfig {
    pub brake_max_temp_c: f64,
    pub oil_max_temp_c: f64,
    pub cooling_delta_span_c: f64,
    pub brake_weight: f64,
    pub oil_weight: f64,
    pub cooling_weight: f64,
    pub engine_margin_reference_c: f64,
}

impl Default for ThermalModelConfig {
    fn default() -> Self {
        Self {
            brake_max_temp_c: defaults::BRAKE_MAX_TEMP_C,
            oil_max_temp_c: defaults::OIL_MAX_TEMP_C,
            cooling_delta_span_c: defaults::COOLING_DELTA_SPAN_C,
            brake_weight: defaults::THERMAL_BRAKE_WEIGHT,
            oil_weight: defaults::THERMAL_OIL_WEIGHT,
            cooling_weight: defaults::THERMAL_COOLING_WEIGHT,
            engine_margin_reference_c: defaults::ENGINE_MARGIN_REFERENCE_C,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicalModelConfig {
    pub harmonic_deviation_gain: f64,
    pub vibration_rms_span: f64,
    pub harmonic_weight: f64,
    pub rms_weight: f64,
}

impl Default for MechanicalModelConfig {
    fn default() -> Self {
        Self {
            harmonic_deviation_gain: defaults::HARMONIC_DEVIATION_GAIN,
            vibration_rms_span: defaults::VIBRATION_RMS_SPAN,
            harmonic_weight: defaults::MECHANICAL_HARMONIC_WEIGHT,
            rms_weight: defaults::MECHANICAL_RMS_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadModelConfig {
    pub rpm_redline: f64,
    pub fuel_efficiency_reference_kmpl: f64,
    pub engine_weight: f64,
    pub interaction_weight: f64,
}

impl Default for LoadModelConfig {
    fn default() -> Self {
        Self {
            rpm_redline: defaults::RPM_REDLINE,
            fuel_efficiency_reference_kmpl: defaults::FUEL_EFFICIENCY_REFERENCE_KMPL,
            engine_weight: defaults::LOAD_ENGINE_WEIGHT,
            interaction_weight: defaults::LOAD_INTERACTION_WEIGHT,
        }
    }
}

/// Composite health weights. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub thermal: f64,
    pub mechanical: f64,
    pub electrical: f64,
    pub load: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            thermal: defaults::HEALTH_WEIGHT_THERMAL,
            mechanical: defaults::HEALTH_WEIGHT_MECHANICAL,
            electrical: defaults::HEALTH_WEIGHT_ELECTRICAL,
            load: defaults::HEALTH_WEIGHT_LOAD,
        }
    }
}

impl HealthWeights {
    pub fn sum(&self) -> f64 {
        self.thermal + self.mechanical + self.electrical + self.load
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub thermal_protection_temp_c: f64,
    pub thermal_protection_rise_rate: f64,
    pub emergency_health: f64,
    pub predictive_service_health: f64,
    pub confidence_floor: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            thermal_protection_temp_c: defaults::THERMAL_PROTECTION_TEMP_C,
            thermal_protection_rise_rate: defaults::THERMAL_PROTECTION_RISE_RATE,
            emergency_health: defaults::EMERGENCY_HEALTH_THRESHOLD,
            predictive_service_health: defaults::PREDICTIVE_SERVICE_THRESHOLD,
            confidence_floor: defaults::CONFIDENCE_FLOOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(NodeConfig::default().validate().is_ok());
    }

    #[test]
    fn default_health_weights_sum_to_one() {
        let w = HealthWeights::default();
        assert!((w.sum() - 1.0).abs() < 1e-12);
        assert_eq!(w.thermal, 0.35);
        assert_eq!(w.mechanical, 0.30);
        assert_eq!(w.electrical, 0.20);
        assert_eq!(w.load, 0.15);
    }

    #[test]
    fn partial_toml_keeps_defaults_elsewhere() {
        let config = NodeConfig::from_toml_str(
            r#"
[device]
ip = "10.0.0.7"

[health.decision]
thermal_protection_temp_c = 170.0
"#,
        )
        .unwrap();
        assert_eq!(config.device.ip, "10.0.0.7");
        assert_eq!(config.device.sample_path, defaults::SAMPLE_PATH);
        assert_eq!(config.health.decision.thermal_protection_temp_c, 170.0);
        assert_eq!(
            config.health.decision.thermal_protection_rise_rate,
            defaults::THERMAL_PROTECTION_RISE_RATE
        );
        assert_eq!(config.sampling, SamplingConfig::default());
    }

    #[test]
    fn toml_round_trips_through_defaults() {
        let text = toml::to_string_pretty(&NodeConfig::default()).unwrap();
        let parsed = NodeConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, NodeConfig::default());
    }

    #[test]
    fn idle_interval_guards_bad_values() {
        let mut cloud = CloudConfig::default();
        cloud.idle_report_interval_secs = f64::NAN;
        assert_eq!(cloud.idle_report_interval(), Duration::from_secs(10));
        cloud.idle_report_interval_secs = 2.5;
        assert_eq!(cloud.idle_report_interval(), Duration::from_millis(2_500));
    }
}
