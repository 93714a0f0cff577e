//! Dispatch decision: what to send for one scored window.

use std::time::Duration;

/// Outcome of one scored window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Actuation to the device and a report to the cloud
    ActuateAndReport,
    /// Periodic cloud report only
    Report,
    /// Nothing to send
    Hold,
}

/// Actuation always goes out with a report. Otherwise a report is due once
/// the time since the last cloud send strictly exceeds `idle_interval`.
pub fn decide(actuation: bool, since_last_cloud: Duration, idle_interval: Duration) -> Dispatch {
    if actuation {
        Dispatch::ActuateAndReport
    } else if since_last_cloud > idle_interval {
        Dispatch::Report
    } else {
        Dispatch::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(10);

    #[test]
    fn actuation_always_sends_both() {
        assert_eq!(decide(true, Duration::ZERO, IDLE), Dispatch::ActuateAndReport);
        assert_eq!(decide(true, Duration::from_secs(60), IDLE), Dispatch::ActuateAndReport);
    }

    #[test]
    fn idle_report_only_after_interval_exceeded() {
        assert_eq!(decide(false, Duration::from_secs(3), IDLE), Dispatch::Hold);
        assert_eq!(decide(false, IDLE, IDLE), Dispatch::Hold);
        assert_eq!(
            decide(false, IDLE + Duration::from_millis(1), IDLE),
            Dispatch::Report
        );
    }
}
