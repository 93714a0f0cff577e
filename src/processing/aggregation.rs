//! Aggregator - reduces a full window into one `AggregatedSummary`
//!
//! Field reductions:
//!
//! | Reduction | Fields |
//! |-----------|--------|
//! | newest    | device_id, vehicle_id, timestamp_ms, brake_pad_remaining_pct, brake_disc_score |
//! | max       | brake_temp_c |
//! | mean      | oil/radiator temps, rpm, dominant Hz, voltages, battery health, load, fuel, speed |
//! | variance  | engine_rpm_variance (population, from motor_rpm) |
//! | RMS       | vibration_rms |
//! | rate      | brake_temp_rise_rate |
//!
//! Pure: no I/O, no clock.

use statrs::statistics::Statistics;

use super::AggregationError;
use crate::types::{AggregatedSummary, Sample};

/// Reduce `samples` (oldest first) into a summary.
///
/// `sample_period_secs` floors the time span used for the brake rise rate, so
/// closely spaced timestamps cannot blow the rate up.
pub fn aggregate(
    samples: &[Sample],
    sample_period_secs: f64,
) -> Result<AggregatedSummary, AggregationError> {
    let (first, last) = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AggregationError::EmptyWindow),
    };

    let column = |f: fn(&Sample) -> f64| -> Vec<f64> { samples.iter().map(f).collect() };
    let mean_of = |f: fn(&Sample) -> f64| bounded_mean(&column(f));

    let brake = column(|s| s.brake_temp_c);
    let rpm = column(|s| s.motor_rpm);

    Ok(AggregatedSummary {
        device_id: last.device_id.clone(),
        vehicle_id: last.vehicle_id.clone(),
        timestamp_ms: last.timestamp_ms,

        brake_temp_c: peak(&brake),
        brake_temp_rise_rate: rise_rate(first, last, sample_period_secs),
        engine_oil_temp_c: mean_of(|s| s.engine_oil_temp_c),
        radiator_temp_c: mean_of(|s| s.radiator_temp_c),

        motor_rpm: bounded_mean(&rpm),
        engine_rpm_variance: population_variance(&rpm),
        vibration_rms: root_mean_square(&column(|s| s.vibration_rms)),
        dominant_vibration_hz: mean_of(|s| s.dominant_vibration_hz),

        battery_voltage_v: mean_of(|s| s.battery_voltage_v),
        output_voltage_v: mean_of(|s| s.output_voltage_v),
        battery_health_pct: mean_of(|s| s.battery_health_pct),

        brake_pad_remaining_pct: last.brake_pad_remaining_pct,
        brake_disc_score: last.brake_disc_score,

        engine_load_pct: mean_of(|s| s.engine_load_pct),
        fuel_efficiency_kmpl: mean_of(|s| s.fuel_efficiency_kmpl),
        vehicle_speed_kmph: mean_of(|s| s.vehicle_speed_kmph),
    })
}

// ============================================================================
// Reductions
// ============================================================================

fn peak(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::max(values.iter())
}

/// Arithmetic mean, bounded to the observed [min, max] so float rounding
/// cannot push it outside the data.
fn bounded_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let lo = Statistics::min(values.iter());
    let hi = Statistics::max(values.iter());
    Statistics::mean(values.iter()).max(lo).min(hi)
}

fn population_variance(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    Statistics::population_variance(values.iter()).max(0.0)
}

fn root_mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::quadratic_mean(values.iter()).max(0.0)
}

/// (last − first) brake temperature per second over
/// `max(span, sample_period)`; 0 when the divisor is not positive.
fn rise_rate(first: &Sample, last: &Sample, sample_period_secs: f64) -> f64 {
    let span_secs = last.timestamp_ms.saturating_sub(first.timestamp_ms) as f64 / 1000.0;
    let dt = span_secs.max(sample_period_secs);
    if !(dt > 0.0) {
        return 0.0;
    }
    (last.brake_temp_c - first.brake_temp_c) / dt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, brake: f64, rpm: f64) -> Sample {
        Sample {
            device_id: "dev-1".to_string(),
            vehicle_id: "veh-1".to_string(),
            timestamp_ms: ts,
            brake_temp_c: brake,
            motor_rpm: rpm,
            engine_oil_temp_c: 90.0 + brake / 100.0,
            vibration_rms: 0.3,
            ..Sample::default()
        }
    }

    #[test]
    fn empty_window_is_an_error() {
        assert!(matches!(aggregate(&[], 0.5), Err(AggregationError::EmptyWindow)));
    }

    #[test]
    fn single_sample_window() {
        let s = sample(1_000, 120.0, 2_000.0);
        let summary = aggregate(std::slice::from_ref(&s), 0.5).unwrap();
        assert_eq!(summary.brake_temp_c, 120.0);
        assert_eq!(summary.motor_rpm, 2_000.0);
        assert_eq!(summary.engine_rpm_variance, 0.0);
        assert_eq!(summary.brake_temp_rise_rate, 0.0);
        assert!((summary.vibration_rms - 0.3).abs() < 1e-12);
    }

    #[test]
    fn reductions_follow_field_classes() {
        let samples = vec![
            sample(0, 100.0, 1_000.0),
            sample(500, 140.0, 2_000.0),
            Sample {
                device_id: "dev-2".to_string(),
                brake_pad_remaining_pct: 61.0,
                brake_disc_score: 0.8,
                ..sample(1_000, 120.0, 3_000.0)
            },
        ];
        let summary = aggregate(&samples, 0.5).unwrap();

        assert_eq!(summary.device_id, "dev-2");
        assert_eq!(summary.timestamp_ms, 1_000);
        assert_eq!(summary.brake_temp_c, 140.0);
        assert!((summary.motor_rpm - 2_000.0).abs() < 1e-9);
        // population variance of 1000, 2000, 3000
        assert!((summary.engine_rpm_variance - 666_666.666_666_7).abs() < 1e-3);
        assert_eq!(summary.brake_pad_remaining_pct, 61.0);
        assert_eq!(summary.brake_disc_score, 0.8);
        // (120 - 100) / 1.0 s
        assert!((summary.brake_temp_rise_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn rise_rate_uses_floored_dt() {
        // 10 ms apart, period 0.1 s: dt = max(0.01, 0.1) = 0.1
        let samples = vec![sample(0, 100.0, 0.0), sample(10, 101.0, 0.0)];
        let summary = aggregate(&samples, 0.1).unwrap();
        assert!((summary.brake_temp_rise_rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rise_rate_survives_reversed_timestamps() {
        let samples = vec![sample(5_000, 100.0, 0.0), sample(0, 110.0, 0.0)];
        let summary = aggregate(&samples, 0.5).unwrap();
        assert!((summary.brake_temp_rise_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn rise_rate_zero_without_positive_divisor() {
        let samples = vec![sample(0, 100.0, 0.0), sample(0, 150.0, 0.0)];
        let summary = aggregate(&samples, 0.0).unwrap();
        assert_eq!(summary.brake_temp_rise_rate, 0.0);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let samples: Vec<Sample> = (0..20)
            .map(|i| sample(i * 500, 80.0 + i as f64 * 1.7, 1_500.0 + (i % 3) as f64 * 250.0))
            .collect();
        assert_eq!(aggregate(&samples, 0.5).unwrap(), aggregate(&samples, 0.5).unwrap());
    }

    #[test]
    fn spread_stats_non_negative_and_means_bounded() {
        let samples: Vec<Sample> = [0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1]
            .iter()
            .enumerate()
            .map(|(i, v)| Sample {
                battery_voltage_v: *v,
                vibration_rms: -v,
                ..sample(i as i64 * 500, 90.0, 1_234.567)
            })
            .collect();
        let summary = aggregate(&samples, 0.5).unwrap();
        assert!(summary.engine_rpm_variance >= 0.0);
        assert!(summary.vibration_rms >= 0.0);
        assert!(summary.battery_voltage_v >= 0.1 && summary.battery_voltage_v <= 0.1);
        assert!(summary.motor_rpm >= 1_234.567 && summary.motor_rpm <= 1_234.567);
    }
}
