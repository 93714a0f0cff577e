//! Fixed-cadence dispatch loop: sample, window, score, send, sleep.
//!
//! One tick per sample period. Each tick reads the live link settings once,
//! pulls one reading from the source, and once the window is full runs the
//! aggregation and health model and hands the resulting packets to the sink.
//! Ticks are scheduled against an absolute target so a slow tick is followed
//! by an immediate one instead of shifting the cadence.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dispatch::{decide, Dispatch};
use super::state::{DispatchStats, NodeState, NodeStatus};
use crate::acquisition::{SampleEvent, SampleSource, TelemetrySink};
use crate::config::{defaults, HealthConfig, LinkSettings, SettingsCell};
use crate::processing::{
    aggregate, assess, build_actuation_packet, build_cloud_packet, TelemetryWindow,
};
use crate::types::{AggregatedSummary, CloudPacket, HealthAssessment, Sample};

// ============================================================================
// Tick Results
// ============================================================================

enum TickOutcome {
    Continue(TickReport),
    Eof,
}

/// What one tick produced, published to `NodeState` in a single write.
#[derive(Default)]
struct TickReport {
    sample: Option<Sample>,
    scored: Option<(AggregatedSummary, HealthAssessment)>,
    actuation_sent: bool,
    cloud_sent: bool,
}

// ============================================================================
// Dispatch Loop
// ============================================================================

/// Owns the window and drives one sample source into one sink.
///
/// Built with [`new()`](DispatchLoop::new), optionally tuned with
/// [`with_health_model()`](DispatchLoop::with_health_model) and
/// [`with_idle_report_interval()`](DispatchLoop::with_idle_report_interval),
/// then consumed by [`run()`](DispatchLoop::run).
pub struct DispatchLoop<K: TelemetrySink> {
    settings: SettingsCell,
    sink: K,
    node_state: Arc<RwLock<NodeState>>,
    cancel_token: CancellationToken,
    health: HealthConfig,
    idle_report_interval: Duration,
    window: TelemetryWindow,
    stats: DispatchStats,
}

impl<K: TelemetrySink> DispatchLoop<K> {
    pub fn new(
        settings: SettingsCell,
        sink: K,
        node_state: Arc<RwLock<NodeState>>,
        cancel_token: CancellationToken,
    ) -> Self {
        let window = TelemetryWindow::new(settings.load().window_capacity());
        Self {
            settings,
            sink,
            node_state,
            cancel_token,
            health: HealthConfig::default(),
            idle_report_interval: Duration::from_secs_f64(defaults::IDLE_REPORT_INTERVAL_SECS),
            window,
            stats: DispatchStats::default(),
        }
    }

    pub fn with_health_model(mut self, health: HealthConfig) -> Self {
        self.health = health;
        self
    }

    pub fn with_idle_report_interval(mut self, interval: Duration) -> Self {
        self.idle_report_interval = interval;
        self
    }

    /// Run until the source is exhausted or cancellation.
    ///
    /// Returns the final counters.
    pub async fn run<S: SampleSource>(mut self, source: &mut S) -> DispatchStats {
        let cancel = self.cancel_token.clone();
        let start = Instant::now();
        let mut last_cloud = start;
        let mut next_target = start;

        {
            let mut state = self.node_state.write().await;
            state.source = source.source_name().to_string();
            state.window_capacity = self.window.capacity();
            state.status = NodeStatus::Filling;
        }

        info!(
            source = source.source_name(),
            window = self.window.capacity(),
            "[DispatchLoop] Started"
        );

        loop {
            let settings = self.settings.load();

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[DispatchLoop] Shutdown signal received");
                    break;
                }
                result = self.tick(source, &settings, &mut last_cloud) => result,
            };

            match outcome {
                Ok(TickOutcome::Continue(report)) => self.publish(report).await,
                Ok(TickOutcome::Eof) => {
                    info!(
                        ticks = self.stats.ticks,
                        samples = self.stats.samples_received,
                        "[DispatchLoop] Source reached end"
                    );
                    break;
                }
                Err(e) => {
                    self.stats.tick_errors += 1;
                    warn!(error = %e, "[DispatchLoop] Tick failed, continuing");
                    self.publish(TickReport::default()).await;
                }
            }

            next_target += settings.sample_period();
            if next_target > Instant::now() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("[DispatchLoop] Shutdown signal received");
                        break;
                    }
                    _ = tokio::time::sleep_until(next_target) => {}
                }
            }
        }

        {
            let mut state = self.node_state.write().await;
            state.stats = self.stats;
            state.status = NodeStatus::Stopped;
        }

        info!(
            ticks = self.stats.ticks,
            actuations = self.stats.actuations_sent,
            cloud_reports = self.stats.cloud_reports_sent,
            dispatch_failures = self.stats.dispatch_failures,
            "[DispatchLoop] Stopped"
        );
        self.stats
    }

    async fn tick<S: SampleSource>(
        &mut self,
        source: &mut S,
        settings: &LinkSettings,
        last_cloud: &mut Instant,
    ) -> anyhow::Result<TickOutcome> {
        let capacity = settings.window_capacity();
        if capacity != self.window.capacity() {
            info!(
                from = self.window.capacity(),
                to = capacity,
                "[DispatchLoop] Window resized"
            );
            self.window.resize(capacity);
        }

        let sample = match source.next_sample(settings).await? {
            SampleEvent::Eof => return Ok(TickOutcome::Eof),
            SampleEvent::Absent => {
                self.stats.samples_absent += 1;
                None
            }
            SampleEvent::Sample(s) => {
                self.stats.samples_received += 1;
                Some(s)
            }
        };
        self.stats.ticks += 1;

        let mut report = TickReport {
            sample: sample.clone(),
            ..TickReport::default()
        };

        self.window.push(sample);
        if !self.window.is_full() {
            debug!(
                len = self.window.len(),
                capacity = self.window.capacity(),
                "[DispatchLoop] Window filling"
            );
            return Ok(TickOutcome::Continue(report));
        }

        let summary = aggregate(&self.window.snapshot(), settings.effective_sample_period_secs())?;
        let assessment = assess(&summary, &self.health);
        self.stats.windows_scored += 1;

        match decide(assessment.actuation, last_cloud.elapsed(), self.idle_report_interval) {
            Dispatch::ActuateAndReport => {
                let actuation = build_actuation_packet(&summary, &assessment, &self.health);
                let cloud = build_cloud_packet(&summary, &assessment, &self.health);
                info!(
                    vehicle_id = %summary.vehicle_id,
                    health = %format!("{:.3}", assessment.vehicle_health),
                    thermal_protection = assessment.thermal_protection,
                    emergency = assessment.emergency,
                    "[DispatchLoop] Actuation triggered"
                );

                match self.sink.send_actuation(&settings.device_ip, &actuation).await {
                    Ok(()) => {
                        self.stats.actuations_sent += 1;
                        report.actuation_sent = true;
                    }
                    Err(e) => {
                        self.stats.dispatch_failures += 1;
                        warn!(device_ip = %settings.device_ip, error = %e, "[DispatchLoop] Actuation push failed");
                    }
                }
                report.cloud_sent = self.report_to_cloud(&cloud).await;
                *last_cloud = Instant::now();
            }
            Dispatch::Report => {
                let cloud = build_cloud_packet(&summary, &assessment, &self.health);
                report.cloud_sent = self.report_to_cloud(&cloud).await;
                *last_cloud = Instant::now();
            }
            Dispatch::Hold => {
                debug!(
                    health = %format!("{:.3}", assessment.vehicle_health),
                    "[DispatchLoop] No dispatch this tick"
                );
            }
        }

        report.scored = Some((summary, assessment));
        Ok(TickOutcome::Continue(report))
    }

    async fn report_to_cloud(&mut self, packet: &CloudPacket) -> bool {
        match self.sink.send_cloud(packet).await {
            Ok(()) => {
                self.stats.cloud_reports_sent += 1;
                true
            }
            Err(e) => {
                self.stats.dispatch_failures += 1;
                warn!(error = %e, "[DispatchLoop] Cloud report failed");
                false
            }
        }
    }

    async fn publish(&self, report: TickReport) {
        let now = chrono::Utc::now();
        let mut state = self.node_state.write().await;

        if let Some(sample) = report.sample {
            state.latest_sample = Some(sample);
        }
        if let Some((summary, assessment)) = report.scored {
            state.latest_summary = Some(summary);
            state.latest_assessment = Some(assessment);
        }
        if report.actuation_sent {
            state.last_actuation_at = Some(now);
        }
        if report.cloud_sent {
            state.last_cloud_report_at = Some(now);
        }

        state.last_tick_at = Some(now);
        state.window_len = self.window.len();
        state.window_capacity = self.window.capacity();
        state.stats = self.stats;
        state.status = state.derive_status();
    }
}
