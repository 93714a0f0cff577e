//! Polling-based config file watcher.
//!
//! Checks the config file's mtime every 2 seconds. When a change is detected,
//! debounces for 500ms (to handle partial writes from editors), then reloads
//! the file and patches the link fields it changed into the live [`SettingsCell`].
//! Other sections take effect on restart.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;

use super::node_config::{ConfigError, NodeConfig};
use super::settings::{LinkSettings, SettingsCell, SettingsPatch};

/// Interval between mtime checks.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Debounce delay after detecting a change (editors often write in stages).
const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Human-readable list of link fields that differ between two snapshots.
pub fn diff_link_settings(old: &LinkSettings, new: &LinkSettings) -> Vec<String> {
    let mut changes = Vec::new();
    if old.device_ip != new.device_ip {
        changes.push(format!("device_ip: {} -> {}", old.device_ip, new.device_ip));
    }
    if old.sample_period_secs != new.sample_period_secs {
        changes.push(format!(
            "sample_period_secs: {} -> {}",
            old.sample_period_secs, new.sample_period_secs
        ));
    }
    if old.window_secs != new.window_secs {
        changes.push(format!("window_secs: {} -> {}", old.window_secs, new.window_secs));
    }
    changes
}

/// Applies config file edits to the live link settings.
///
/// Keeps the last link settings read from the file as a baseline. On reload
/// only the fields whose file value moved are patched into the cell, so
/// command-line overrides and API edits to other fields survive.
#[derive(Debug, Clone)]
pub struct ConfigReloader {
    path: PathBuf,
    baseline: LinkSettings,
    overrides: SettingsPatch,
}

impl ConfigReloader {
    /// `baseline` is the link section as read from `path`, before
    /// `overrides` (from the command line) were applied.
    pub fn new(path: PathBuf, baseline: LinkSettings, overrides: SettingsPatch) -> Self {
        Self {
            path,
            baseline,
            overrides,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the file and patch changed fields into `cell`.
    ///
    /// Returns the fields that changed in the cell. An invalid file, or a
    /// patch the cell rejects, leaves both the cell and the baseline as they were.
    pub fn reload(&mut self, cell: &SettingsCell) -> Result<Vec<String>, ConfigError> {
        let from_file = NodeConfig::load_from_file(&self.path)?.link_settings();

        let old = self.baseline.merged(&self.overrides);
        let new = from_file.merged(&self.overrides);
        let patch = SettingsPatch {
            device_ip: (old.device_ip != new.device_ip).then(|| new.device_ip.clone()),
            sample_period_secs: (old.sample_period_secs != new.sample_period_secs)
                .then_some(new.sample_period_secs),
            window_secs: (old.window_secs != new.window_secs).then_some(new.window_secs),
        };

        if patch == SettingsPatch::default() {
            self.baseline = from_file;
            return Ok(Vec::new());
        }

        let before = cell.load();
        let updated = cell.update(&patch)?;
        self.baseline = from_file;
        Ok(diff_link_settings(&before, &updated))
    }
}

/// Run the config file watcher loop until `cancel` fires.
pub async fn run_config_watcher(
    mut reloader: ConfigReloader,
    cell: SettingsCell,
    cancel: CancellationToken,
) {
    let path = reloader.path().to_path_buf();
    tracing::info!(path = %path.display(), "Config watcher started");

    let mut last_mtime = get_mtime(&path);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        // If we can't read mtime (file deleted, permissions), warn and keep polling
        let current = match get_mtime(&path) {
            Some(t) => t,
            None => {
                if last_mtime.is_some() {
                    tracing::warn!(
                        path = %path.display(),
                        "Config file not accessible, keeping current settings"
                    );
                    last_mtime = None;
                }
                continue;
            }
        };

        let changed = match last_mtime {
            Some(prev) => current != prev,
            None => true, // File reappeared
        };
        if !changed {
            continue;
        }

        // Debounce: wait, then re-check mtime to ensure write is complete
        tokio::time::sleep(DEBOUNCE_DELAY).await;
        if get_mtime(&path) != Some(current) {
            continue;
        }
        last_mtime = Some(current);

        match reloader.reload(&cell) {
            Ok(changes) if changes.is_empty() => {
                tracing::info!("Config file changed, link settings unchanged");
            }
            Ok(changes) => {
                for change in &changes {
                    tracing::info!(change = %change, "Link setting reloaded");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Config hot-reload failed, keeping previous settings");
            }
        }
    }

    tracing::info!("Config watcher stopped");
}

/// Read the modification time of a file, returning None on any error.
fn get_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
}
