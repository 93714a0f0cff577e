//! Packet Builders - summary + assessment to outbound payloads. Never fail.

use super::health_model::{charging_efficiency, harmonic_deviation, unit};
use crate::config::HealthConfig;
use crate::types::{ActuationPacket, AggregatedSummary, CloudPacket, HealthAssessment, DECISION_ORIGIN};

/// Corrective command for the vehicle device.
pub fn build_actuation_packet(
    summary: &AggregatedSummary,
    assessment: &HealthAssessment,
    cfg: &HealthConfig,
) -> ActuationPacket {
    ActuationPacket {
        timestamp_ms: summary.timestamp_ms,
        decision_origin: DECISION_ORIGIN.to_string(),
        cloud_dependency: false,
        trigger_measured_brake_temp_c: summary.brake_temp_c,
        trigger_brake_temp_rise_rate: summary.brake_temp_rise_rate,
        fog_decision_critical_class: u8::from(assessment.thermal_protection),
        fog_decision_actuation_triggered: u8::from(assessment.actuation),
        fog_decision_confidence: assessment.confidence,
        fog_thermal_protection_active: assessment.thermal_protection,
        fog_vibration_damping_mode_active: assessment.emergency,
        fog_predictive_service_required: assessment.vehicle_health
            < cfg.decision.predictive_service_health,
        fog_emergency_safeguard_active: assessment.emergency,
    }
}

/// Health report for the cloud backend.
pub fn build_cloud_packet(
    summary: &AggregatedSummary,
    assessment: &HealthAssessment,
    cfg: &HealthConfig,
) -> CloudPacket {
    let t = &cfg.thermal;
    CloudPacket {
        vehicle_id: summary.vehicle_id.clone(),
        timestamp_ms: summary.timestamp_ms,
        thermal_brake_margin: unit((t.brake_max_temp_c - summary.brake_temp_c) / t.brake_max_temp_c),
        thermal_engine_margin: unit(
            (t.engine_margin_reference_c - summary.engine_oil_temp_c) / t.engine_margin_reference_c,
        ),
        thermal_stress_index: assessment.thermal_stress,
        mechanical_vibration_anomaly_score: unit(harmonic_deviation(
            summary.dominant_vibration_hz,
            summary.motor_rpm,
        )),
        mechanical_dominant_fault_band_hz: summary.dominant_vibration_hz,
        mechanical_vibration_rms: summary.vibration_rms,
        electrical_charging_efficiency_score: charging_efficiency(
            summary.output_voltage_v,
            summary.battery_voltage_v,
        ),
        electrical_battery_health_pct: summary.battery_health_pct,
        vehicle_health_score: assessment.vehicle_health,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::assess;

    fn summary() -> AggregatedSummary {
        AggregatedSummary {
            device_id: "esp32-01".to_string(),
            vehicle_id: "KA-01-1234".to_string(),
            timestamp_ms: 1_700_000_000_000,
            brake_temp_c: 190.0,
            brake_temp_rise_rate: 4.0,
            engine_oil_temp_c: 105.0,
            radiator_temp_c: 88.0,
            motor_rpm: 2_400.0,
            engine_rpm_variance: 1_500.0,
            vibration_rms: 0.6,
            dominant_vibration_hz: 50.0,
            battery_voltage_v: 12.5,
            output_voltage_v: 12.0,
            battery_health_pct: 84.0,
            brake_pad_remaining_pct: 40.0,
            brake_disc_score: 0.7,
            engine_load_pct: 60.0,
            fuel_efficiency_kmpl: 11.0,
            vehicle_speed_kmph: 72.0,
        }
    }

    #[test]
    fn actuation_packet_mirrors_decision() {
        let cfg = HealthConfig::default();
        let s = summary();
        let a = assess(&s, &cfg);
        assert!(a.thermal_protection);

        let pkt = build_actuation_packet(&s, &a, &cfg);
        assert_eq!(pkt.timestamp_ms, s.timestamp_ms);
        assert_eq!(pkt.decision_origin, "fog_node");
        assert!(!pkt.cloud_dependency);
        assert_eq!(pkt.trigger_measured_brake_temp_c, 190.0);
        assert_eq!(pkt.trigger_brake_temp_rise_rate, 4.0);
        assert_eq!(pkt.fog_decision_critical_class, 1);
        assert_eq!(pkt.fog_decision_actuation_triggered, 1);
        assert_eq!(pkt.fog_decision_confidence, a.confidence);
        assert!(pkt.fog_thermal_protection_active);
        assert_eq!(pkt.fog_vibration_damping_mode_active, a.emergency);
        assert_eq!(pkt.fog_emergency_safeguard_active, a.emergency);
        assert_eq!(pkt.fog_predictive_service_required, a.vehicle_health < 0.5);
    }

    #[test]
    fn quiet_assessment_sets_zero_classes() {
        let cfg = HealthConfig::default();
        let s = AggregatedSummary {
            brake_temp_c: 80.0,
            brake_temp_rise_rate: 0.0,
            ..summary()
        };
        let a = assess(&s, &cfg);
        let pkt = build_actuation_packet(&s, &a, &cfg);
        assert_eq!(pkt.fog_decision_critical_class, 0);
        assert_eq!(pkt.fog_decision_actuation_triggered, 0);
        assert!(!pkt.fog_thermal_protection_active);
    }

    #[test]
    fn cloud_packet_margins_and_scores() {
        let cfg = HealthConfig::default();
        let s = summary();
        let a = assess(&s, &cfg);
        let pkt = build_cloud_packet(&s, &a, &cfg);

        assert_eq!(pkt.vehicle_id, "KA-01-1234");
        assert!((pkt.thermal_brake_margin - 30.0 / 220.0).abs() < 1e-12);
        assert!((pkt.thermal_engine_margin - 35.0 / 140.0).abs() < 1e-12);
        assert_eq!(pkt.thermal_stress_index, a.thermal_stress);
        // 2400 rpm = 40 Hz shaft, 50 Hz = 1.25 harmonics
        assert!((pkt.mechanical_vibration_anomaly_score - 0.25).abs() < 1e-12);
        assert_eq!(pkt.mechanical_dominant_fault_band_hz, 50.0);
        assert_eq!(pkt.mechanical_vibration_rms, 0.6);
        assert!((pkt.electrical_charging_efficiency_score - 0.96).abs() < 1e-12);
        assert_eq!(pkt.electrical_battery_health_pct, 84.0);
        assert_eq!(pkt.vehicle_health_score, a.vehicle_health);
    }

    #[test]
    fn overheated_margins_clamp_to_zero() {
        let cfg = HealthConfig::default();
        let s = AggregatedSummary {
            brake_temp_c: 400.0,
            engine_oil_temp_c: 160.0,
            ..summary()
        };
        let pkt = build_cloud_packet(&s, &assess(&s, &cfg), &cfg);
        assert_eq!(pkt.thermal_brake_margin, 0.0);
        assert_eq!(pkt.thermal_engine_margin, 0.0);
    }

    #[test]
    fn zero_battery_reports_zero_charging_efficiency() {
        let cfg = HealthConfig::default();
        let s = AggregatedSummary {
            battery_voltage_v: 0.0,
            ..summary()
        };
        let a = assess(&s, &cfg);
        assert_eq!(a.electrical_risk, 0.0);
        let pkt = build_cloud_packet(&s, &a, &cfg);
        assert_eq!(pkt.electrical_charging_efficiency_score, 0.0);
    }

    #[test]
    fn packets_serialize_as_flat_objects() {
        let cfg = HealthConfig::default();
        let s = summary();
        let a = assess(&s, &cfg);
        let json = serde_json::to_value(build_actuation_packet(&s, &a, &cfg)).unwrap();
        assert_eq!(json["decision_origin"], "fog_node");
        assert_eq!(json["cloud_dependency"], false);
        assert_eq!(json["fog_decision_critical_class"], 1);

        let json = serde_json::to_value(build_cloud_packet(&s, &a, &cfg)).unwrap();
        assert_eq!(json["vehicle_id"], "KA-01-1234");
        assert!(json["vehicle_health_score"].is_f64());
    }
}
