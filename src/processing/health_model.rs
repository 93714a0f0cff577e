//! Health Model
//!
//! Deterministic, rule-based scoring of one windowed summary. Four subscores
//! feed a weighted composite; decision flags compare the composite and the
//! brake readings against fixed thresholds.
//!
//! ```text
//! thermal    = u(wb·u(brake/Bmax) + wo·u(oil/Omax) + wc·u((oil − rad)/ΔC))
//! mechanical = u(wh·u(g·dev) + wr·u(rms/Rspan))      dev = |r − round(r)|, r = hz / (rpm/60)
//! electrical = u(1 − out/batt)                        0 when batt = 0
//! load       = u(we·u(load/100) + wi·u((rpm/redline)·(1 − fuel/Fref)))
//! health     = u(1 − Σ w·subscore)
//! ```
//!
//! `u` clamps to [0, 1] and maps NaN to 0, so every output stays in range for
//! arbitrary inputs.

use crate::config::HealthConfig;
use crate::types::{AggregatedSummary, HealthAssessment};

/// Clamp to [0, 1]; NaN becomes 0.
pub fn unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Distance of the dominant vibration frequency from the nearest shaft
/// harmonic, in [0, 0.5] for finite inputs. Shaft frequency is rpm/60, or
/// 1 Hz when the motor is stopped.
pub fn harmonic_deviation(dominant_vibration_hz: f64, motor_rpm: f64) -> f64 {
    let shaft_hz = if motor_rpm == 0.0 { 1.0 } else { motor_rpm / 60.0 };
    let ratio = dominant_vibration_hz / shaft_hz;
    (ratio - ratio.round()).abs()
}

/// Output-to-battery voltage ratio, clamped; 0 with no battery voltage.
pub fn charging_efficiency(output_voltage_v: f64, battery_voltage_v: f64) -> f64 {
    if battery_voltage_v == 0.0 {
        0.0
    } else {
        unit(output_voltage_v / battery_voltage_v)
    }
}

pub fn thermal_stress(s: &AggregatedSummary, cfg: &HealthConfig) -> f64 {
    let t = &cfg.thermal;
    unit(
        t.brake_weight * unit(s.brake_temp_c / t.brake_max_temp_c)
            + t.oil_weight * unit(s.engine_oil_temp_c / t.oil_max_temp_c)
            + t.cooling_weight
                * unit((s.engine_oil_temp_c - s.radiator_temp_c) / t.cooling_delta_span_c),
    )
}

pub fn mechanical_risk(s: &AggregatedSummary, cfg: &HealthConfig) -> f64 {
    let m = &cfg.mechanical;
    let deviation = harmonic_deviation(s.dominant_vibration_hz, s.motor_rpm);
    unit(
        m.harmonic_weight * unit(m.harmonic_deviation_gain * deviation)
            + m.rms_weight * unit(s.vibration_rms / m.vibration_rms_span),
    )
}

pub fn electrical_risk(s: &AggregatedSummary) -> f64 {
    if s.battery_voltage_v == 0.0 {
        0.0
    } else {
        unit(1.0 - s.output_voltage_v / s.battery_voltage_v)
    }
}

pub fn load_stress(s: &AggregatedSummary, cfg: &HealthConfig) -> f64 {
    let l = &cfg.load;
    let interaction =
        (s.motor_rpm / l.rpm_redline) * (1.0 - s.fuel_efficiency_kmpl / l.fuel_efficiency_reference_kmpl);
    unit(l.engine_weight * unit(s.engine_load_pct / 100.0) + l.interaction_weight * unit(interaction))
}

/// Score one summary.
pub fn assess(summary: &AggregatedSummary, cfg: &HealthConfig) -> HealthAssessment {
    let thermal = thermal_stress(summary, cfg);
    let mechanical = mechanical_risk(summary, cfg);
    let electrical = electrical_risk(summary);
    let load = load_stress(summary, cfg);

    let w = &cfg.weights;
    let vehicle_health = unit(
        1.0 - (w.thermal * thermal
            + w.mechanical * mechanical
            + w.electrical * electrical
            + w.load * load),
    );

    let d = &cfg.decision;
    let thermal_protection = summary.brake_temp_c > d.thermal_protection_temp_c
        && summary.brake_temp_rise_rate > d.thermal_protection_rise_rate;
    let emergency = vehicle_health < d.emergency_health;

    HealthAssessment {
        thermal_stress: thermal,
        mechanical_risk: mechanical,
        electrical_risk: electrical,
        load_stress: load,
        vehicle_health,
        thermal_protection,
        emergency,
        actuation: thermal_protection || emergency,
        confidence: unit(d.confidence_floor + (1.0 - d.confidence_floor) * (1.0 - mechanical)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> AggregatedSummary {
        AggregatedSummary {
            device_id: "dev".to_string(),
            vehicle_id: "veh".to_string(),
            timestamp_ms: 0,
            brake_temp_c: 90.0,
            brake_temp_rise_rate: 0.0,
            engine_oil_temp_c: 95.0,
            radiator_temp_c: 85.0,
            motor_rpm: 1_800.0,
            engine_rpm_variance: 0.0,
            vibration_rms: 0.2,
            dominant_vibration_hz: 60.0,
            battery_voltage_v: 12.6,
            output_voltage_v: 12.4,
            battery_health_pct: 92.0,
            brake_pad_remaining_pct: 70.0,
            brake_disc_score: 0.9,
            engine_load_pct: 35.0,
            fuel_efficiency_kmpl: 14.0,
            vehicle_speed_kmph: 60.0,
        }
    }

    fn in_unit(x: f64) -> bool {
        (0.0..=1.0).contains(&x)
    }

    fn assert_all_in_unit(a: &HealthAssessment) {
        for v in [
            a.thermal_stress,
            a.mechanical_risk,
            a.electrical_risk,
            a.load_stress,
            a.vehicle_health,
            a.confidence,
        ] {
            assert!(in_unit(v), "{v} out of [0, 1] in {a:?}");
        }
    }

    #[test]
    fn unit_clamps_and_zeroes_nan() {
        assert_eq!(unit(-3.0), 0.0);
        assert_eq!(unit(7.0), 1.0);
        assert_eq!(unit(0.25), 0.25);
        assert_eq!(unit(f64::NAN), 0.0);
        assert_eq!(unit(f64::INFINITY), 1.0);
    }

    #[test]
    fn healthy_cruise_needs_no_action() {
        let a = assess(&summary(), &HealthConfig::default());
        assert_all_in_unit(&a);
        assert!(a.vehicle_health > 0.6, "{a:?}");
        assert!(!a.thermal_protection);
        assert!(!a.emergency);
        assert!(!a.actuation);
    }

    #[test]
    fn harmonic_deviation_on_and_off_harmonic() {
        // 1800 rpm = 30 Hz shaft; 60 Hz is the second harmonic
        assert!(harmonic_deviation(60.0, 1_800.0) < 1e-12);
        // 75 Hz at 30 Hz shaft = 2.5, maximally off-harmonic
        assert!((harmonic_deviation(75.0, 1_800.0) - 0.5).abs() < 1e-12);
        // stopped motor uses 1 Hz shaft
        assert!((harmonic_deviation(2.25, 0.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn outputs_stay_in_unit_for_extreme_inputs() {
        let cfg = HealthConfig::default();
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1e12, 1e12, 0.0] {
            let s = AggregatedSummary {
                brake_temp_c: v,
                brake_temp_rise_rate: v,
                engine_oil_temp_c: v,
                radiator_temp_c: -v,
                motor_rpm: v,
                vibration_rms: v,
                dominant_vibration_hz: v,
                battery_voltage_v: v,
                output_voltage_v: -v,
                engine_load_pct: v,
                fuel_efficiency_kmpl: -v,
                ..summary()
            };
            assert_all_in_unit(&assess(&s, &cfg));
        }
    }

    #[test]
    fn thermal_protection_requires_both_thresholds_strictly() {
        let cfg = HealthConfig::default();

        let hot_and_rising = AggregatedSummary {
            brake_temp_c: 185.0,
            brake_temp_rise_rate: 3.0,
            ..summary()
        };
        let a = assess(&hot_and_rising, &cfg);
        assert!(a.thermal_protection);
        assert!(a.actuation);

        let exactly_at = AggregatedSummary {
            brake_temp_c: 180.0,
            brake_temp_rise_rate: 2.5,
            ..summary()
        };
        assert!(!assess(&exactly_at, &cfg).thermal_protection);

        let temp_at = AggregatedSummary {
            brake_temp_c: 180.0,
            brake_temp_rise_rate: 5.0,
            ..summary()
        };
        assert!(!assess(&temp_at, &cfg).thermal_protection);

        let rate_at = AggregatedSummary {
            brake_temp_c: 200.0,
            brake_temp_rise_rate: 2.5,
            ..summary()
        };
        assert!(!assess(&rate_at, &cfg).thermal_protection);
    }

    #[test]
    fn hot_but_steady_brakes_do_not_trigger_protection() {
        // Four identical samples at 200 °C aggregate to rise rate 0
        let s = AggregatedSummary {
            brake_temp_c: 200.0,
            brake_temp_rise_rate: 0.0,
            ..summary()
        };
        let a = assess(&s, &HealthConfig::default());
        assert!(!a.thermal_protection);
    }

    #[test]
    fn zero_battery_voltage_means_zero_electrical_risk() {
        let s = AggregatedSummary {
            battery_voltage_v: 0.0,
            output_voltage_v: 5.0,
            ..summary()
        };
        assert_eq!(electrical_risk(&s), 0.0);
        assert_eq!(charging_efficiency(s.output_voltage_v, s.battery_voltage_v), 0.0);
    }

    #[test]
    fn emergency_is_strictly_below_threshold() {
        let mut cfg = HealthConfig::default();
        let s = summary();
        let health = assess(&s, &cfg).vehicle_health;

        cfg.decision.emergency_health = health;
        assert!(!assess(&s, &cfg).emergency);

        cfg.decision.emergency_health = health + 1e-9;
        let a = assess(&s, &cfg);
        assert!(a.emergency);
        assert!(a.actuation);
        assert!(!a.thermal_protection);
    }

    #[test]
    fn degraded_vehicle_triggers_emergency() {
        let s = AggregatedSummary {
            brake_temp_c: 150.0,
            engine_oil_temp_c: 130.0,
            radiator_temp_c: 50.0,
            motor_rpm: 3_000.0,
            dominant_vibration_hz: 75.0,
            vibration_rms: 2.0,
            battery_voltage_v: 12.0,
            output_voltage_v: 0.0,
            engine_load_pct: 100.0,
            fuel_efficiency_kmpl: 0.0,
            ..summary()
        };
        let a = assess(&s, &HealthConfig::default());
        assert!((a.mechanical_risk - 1.0).abs() < 1e-12);
        assert!((a.electrical_risk - 1.0).abs() < 1e-12);
        // 0.5·1 + 0.5·(3000/6000)·(1 − 0)
        assert!((a.load_stress - 0.75).abs() < 1e-12);
        // 1 − (0.35·0.840909 + 0.30 + 0.20 + 0.15·0.75)
        assert!((a.vehicle_health - 0.093_181_818).abs() < 1e-6, "{a:?}");
        assert!(a.emergency);
        assert!(!a.thermal_protection);
        assert!((a.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn confidence_tracks_mechanical_risk() {
        let a = assess(&summary(), &HealthConfig::default());
        assert!((a.confidence - (0.7 + 0.3 * (1.0 - a.mechanical_risk))).abs() < 1e-12);
    }
}
