//! Runtime-mutable link settings
//!
//! The dispatch loop reads one consistent snapshot per tick; the operator API
//! and the config watcher replace the whole struct atomically.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::defaults;
use super::node_config::ConfigError;
use super::validation::validate_link;

/// Device address, tick period and window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSettings {
    pub device_ip: String,
    pub sample_period_secs: f64,
    pub window_secs: f64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            device_ip: defaults::DEVICE_IP.to_string(),
            sample_period_secs: defaults::SAMPLE_PERIOD_SECS,
            window_secs: defaults::WINDOW_SECS,
        }
    }
}

impl LinkSettings {
    /// Sample period guarded at point of use: anything non-finite, non-positive
    /// or above the maximum falls back to the default.
    pub fn effective_sample_period_secs(&self) -> f64 {
        let p = self.sample_period_secs;
        if p.is_finite() && p > 0.0 && p <= defaults::MAX_SAMPLE_PERIOD_SECS {
            p
        } else {
            defaults::SAMPLE_PERIOD_SECS
        }
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(self.effective_sample_period_secs())
    }

    /// Window capacity N = floor(window / period), never below 1.
    pub fn window_capacity(&self) -> usize {
        let window = if self.window_secs.is_finite() {
            self.window_secs.clamp(0.0, defaults::MAX_WINDOW_SECS)
        } else {
            0.0
        };
        // Epsilon absorbs float error such as 0.3 / 0.1 = 2.9999999999999996
        let n = (window / self.effective_sample_period_secs() + 1e-9).floor();
        (n as usize).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = validate_link(&self.device_ip, self.sample_period_secs, self.window_secs);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Apply a partial update, returning the merged settings without
    /// validating them.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            device_ip: patch
                .device_ip
                .as_ref()
                .map(|ip| ip.trim().to_string())
                .unwrap_or_else(|| self.device_ip.clone()),
            sample_period_secs: patch.sample_period_secs.unwrap_or(self.sample_period_secs),
            window_secs: patch.window_secs.unwrap_or(self.window_secs),
        }
    }
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub device_ip: Option<String>,
    #[serde(default)]
    pub sample_period_secs: Option<f64>,
    #[serde(default)]
    pub window_secs: Option<f64>,
}

/// Shared, lock-free cell holding the live link settings.
#[derive(Debug, Clone)]
pub struct SettingsCell(Arc<ArcSwap<LinkSettings>>);

impl SettingsCell {
    pub fn new(settings: LinkSettings) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(settings)))
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<LinkSettings> {
        self.0.load_full()
    }

    /// Replace the settings unconditionally.
    pub fn store(&self, settings: LinkSettings) {
        self.0.store(Arc::new(settings));
    }

    /// Merge a patch into the current settings, validate, and swap it in.
    /// On validation failure the cell is left untouched.
    pub fn update(&self, patch: &SettingsPatch) -> Result<LinkSettings, ConfigError> {
        let merged = self.load().merged(patch);
        merged.validate()?;
        self.store(merged.clone());
        Ok(merged)
    }
}

impl Default for SettingsCell {
    fn default() -> Self {
        Self::new(LinkSettings::default())
    }
}
