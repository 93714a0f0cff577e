//! Sample source abstraction.
//!
//! Provides a unified trait for obtaining one reading per tick from different
//! sources: the live vehicle device over HTTP, or a JSON-lines replay file.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::DeviceClient;
use crate::config::LinkSettings;
use crate::types::Sample;

/// Events produced by a sample source.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleEvent {
    /// A reading was obtained.
    Sample(Sample),
    /// No reading this tick (fetch failure, timeout, malformed body).
    Absent,
    /// Source has no more data. Live devices never end.
    Eof,
}

/// Trait abstracting where samples come from.
///
/// The dispatch loop calls [`next_sample`](SampleSource::next_sample) once per
/// tick, racing it against cancellation.
#[async_trait]
pub trait SampleSource: Send + 'static {
    /// Obtain the next reading under the current link settings.
    ///
    /// Returns `Err` only on unrecoverable errors; transient failures are
    /// reported as `SampleEvent::Absent`.
    async fn next_sample(&mut self, settings: &LinkSettings) -> Result<SampleEvent>;

    /// Human-readable name for logging (e.g. "device", "replay").
    fn source_name(&self) -> &str;
}

// ============================================================================
// Device Source (live HTTP polling)
// ============================================================================

/// Polls the vehicle device at the address in the current settings.
pub struct DeviceSource {
    client: DeviceClient,
    consecutive_failures: u64,
}

impl DeviceSource {
    pub fn new(client: DeviceClient) -> Self {
        Self {
            client,
            consecutive_failures: 0,
        }
    }
}

#[async_trait]
impl SampleSource for DeviceSource {
    async fn next_sample(&mut self, settings: &LinkSettings) -> Result<SampleEvent> {
        match self.client.fetch_sample(&settings.device_ip).await {
            Ok(sample) => {
                if self.consecutive_failures > 0 {
                    tracing::info!(
                        device_ip = %settings.device_ip,
                        missed = self.consecutive_failures,
                        "Device link recovered"
                    );
                }
                self.consecutive_failures = 0;
                Ok(SampleEvent::Sample(sample))
            }
            Err(e) => {
                self.consecutive_failures += 1;
                // First failure of a streak is worth a warning, the rest are noise
                if self.consecutive_failures == 1 {
                    warn!(device_ip = %settings.device_ip, error = %e, "Sample fetch failed");
                } else {
                    debug!(device_ip = %settings.device_ip, error = %e, "Sample fetch failed");
                }
                Ok(SampleEvent::Absent)
            }
        }
    }

    fn source_name(&self) -> &str {
        "device"
    }
}

// ============================================================================
// Replay Source (JSON lines)
// ============================================================================

/// Replays recorded readings, one per tick. Blank or malformed lines become
/// absent ticks so recorded gaps are reproduced.
pub struct ReplaySource {
    samples: std::vec::IntoIter<Option<Sample>>,
}

impl ReplaySource {
    pub fn from_samples(samples: Vec<Option<Sample>>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }

    /// Parse JSON-lines text; a trailing newline does not add an absent tick.
    pub fn from_json_lines(text: &str) -> Self {
        Self::from_samples(text.lines().map(Sample::from_json_str).collect())
    }

    pub async fn open(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        let source = Self::from_json_lines(&text);
        tracing::info!(
            path = %path.display(),
            ticks = source.remaining(),
            "Replay file loaded"
        );
        Ok(source)
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

#[async_trait]
impl SampleSource for ReplaySource {
    async fn next_sample(&mut self, _settings: &LinkSettings) -> Result<SampleEvent> {
        Ok(match self.samples.next() {
            Some(Some(sample)) => SampleEvent::Sample(sample),
            Some(None) => SampleEvent::Absent,
            None => SampleEvent::Eof,
        })
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}
