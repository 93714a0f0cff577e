//! Vehicle Device Simulator
//!
//! Emulates the vehicle sensor device for bench runs without hardware:
//! - `GET /next` returns one synthetic telemetry reading
//! - `PUT /flags` accepts actuation commands from the fog node
//!
//! Readings cycle through scripted driving phases that exercise every branch
//! of the health model:
//! - Cruise (healthy baseline)
//! - Hard braking (brake temperature climbing fast)
//! - Engine overheat (oil temperature and load up, cooling delta wide)
//! - Misaligned shaft (off-harmonic vibration)
//! - Charging fault (output voltage collapses)
//!
//! An active thermal protection command cools the brakes, so the loop closes.
//!
//! # Usage
//! ```bash
//! ./device-simulator --addr 127.0.0.1:9000 --seed 7 &
//! ./fog-node --device-ip 127.0.0.1:9000
//! ```

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use fog_node::{ActuationPacket, Sample};

// ============================================================================
// Vehicle Constants
// ============================================================================

/// Cruise brake temperature (°C)
const BASE_BRAKE_TEMP: f64 = 85.0;
/// Cruise engine oil temperature (°C)
const BASE_OIL_TEMP: f64 = 92.0;
/// Cruise radiator temperature (°C)
const BASE_RADIATOR_TEMP: f64 = 84.0;
/// Cruise motor speed
const BASE_RPM: f64 = 1_800.0;
/// Nominal battery voltage (V)
const BASE_BATTERY_V: f64 = 12.6;
/// Nominal charging output (V)
const BASE_OUTPUT_V: f64 = 12.4;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "device-simulator")]
#[command(about = "Vehicle sensor device simulator for fog node bench testing")]
#[command(version)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    addr: String,

    /// Vehicle identifier reported in every reading
    #[arg(long, default_value = "SIM-VEHICLE-01")]
    vehicle_id: String,

    /// Readings per driving phase
    #[arg(long, default_value = "40", value_parser = clap::value_parser!(u64).range(1..))]
    phase_len: u64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Driving Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Cruise,
    HardBraking,
    EngineOverheat,
    MisalignedShaft,
    ChargingFault,
}

impl Phase {
    const CYCLE: [Phase; 6] = [
        Phase::Cruise,
        Phase::HardBraking,
        Phase::Cruise,
        Phase::EngineOverheat,
        Phase::MisalignedShaft,
        Phase::ChargingFault,
    ];

    fn at(reading: u64, phase_len: u64) -> Self {
        let idx = (reading / phase_len) as usize % Self::CYCLE.len();
        Self::CYCLE[idx]
    }

    fn name(self) -> &'static str {
        match self {
            Phase::Cruise => "Cruise",
            Phase::HardBraking => "Hard Braking",
            Phase::EngineOverheat => "Engine Overheat",
            Phase::MisalignedShaft => "Misaligned Shaft",
            Phase::ChargingFault => "Charging Fault",
        }
    }
}

// ============================================================================
// Simulation State
// ============================================================================

struct Vehicle {
    rng: StdRng,
    vehicle_id: String,
    phase_len: u64,
    readings: u64,
    phase: Phase,
    brake_temp: f64,
    oil_temp: f64,
    brake_pad_pct: f64,
    /// Set by a thermal protection command, cleared once brakes are cool
    brake_cooling: bool,
    noise: Normal<f64>,
    vibration_noise: Normal<f64>,
}

impl Vehicle {
    fn new(vehicle_id: String, phase_len: u64, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            vehicle_id,
            phase_len,
            readings: 0,
            phase: Phase::Cruise,
            brake_temp: BASE_BRAKE_TEMP,
            oil_temp: BASE_OIL_TEMP,
            brake_pad_pct: 78.0,
            brake_cooling: false,
            noise: Normal::new(0.0, 1.0).context("noise distribution")?,
            vibration_noise: Normal::new(0.0, 0.03).context("vibration distribution")?,
        })
    }

    fn next_reading(&mut self) -> Sample {
        let phase = Phase::at(self.readings, self.phase_len);
        if phase != self.phase {
            info!(phase = phase.name(), reading = self.readings, "Phase change");
            self.phase = phase;
        }
        self.readings += 1;

        let n = self.noise.sample(&mut self.rng);
        let vn = self.vibration_noise.sample(&mut self.rng);

        // Brake temperature relaxes toward cruise unless the phase heats it
        let brake_target = match phase {
            Phase::HardBraking if !self.brake_cooling => self.brake_temp + 6.0,
            _ => BASE_BRAKE_TEMP,
        };
        self.brake_temp += (brake_target - self.brake_temp) * 0.5 + n;
        if self.brake_cooling {
            self.brake_temp -= 4.0;
            if self.brake_temp < BASE_BRAKE_TEMP + 20.0 {
                info!("Brakes cooled, protection released");
                self.brake_cooling = false;
            }
        }
        self.brake_temp = self.brake_temp.max(20.0);

        let oil_target = match phase {
            Phase::EngineOverheat => 138.0,
            _ => BASE_OIL_TEMP,
        };
        self.oil_temp += (oil_target - self.oil_temp) * 0.1 + n * 0.3;

        if phase == Phase::HardBraking {
            self.brake_pad_pct = (self.brake_pad_pct - 0.02).max(0.0);
        }

        let rpm = match phase {
            Phase::EngineOverheat => 4_200.0,
            Phase::HardBraking => 1_200.0,
            _ => BASE_RPM,
        } + n * 15.0;
        let shaft_hz = rpm / 60.0;

        // Healthy vibration sits on the 2nd harmonic; a misaligned shaft
        // shows up halfway between harmonics
        let (dominant_hz, vibration_rms) = match phase {
            Phase::MisalignedShaft => (shaft_hz * 2.5, 1.6 + vn * 4.0),
            _ => (shaft_hz * 2.0, 0.25 + vn),
        };

        let output_v = match phase {
            Phase::ChargingFault => 3.0 + n * 0.2,
            _ => BASE_OUTPUT_V + n * 0.05,
        };

        let (load_pct, fuel_kmpl, speed) = match phase {
            Phase::EngineOverheat => (92.0, 4.0, 95.0),
            Phase::HardBraking => (15.0, 18.0, 40.0),
            _ => (35.0, 14.0, 70.0),
        };

        Sample {
            device_id: "sim-device".to_string(),
            vehicle_id: self.vehicle_id.clone(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            brake_temp_c: self.brake_temp,
            engine_oil_temp_c: self.oil_temp,
            radiator_temp_c: BASE_RADIATOR_TEMP + (self.oil_temp - BASE_OIL_TEMP) * 0.2,
            motor_rpm: rpm,
            vibration_rms: vibration_rms.abs(),
            dominant_vibration_hz: dominant_hz,
            battery_voltage_v: BASE_BATTERY_V + n * 0.02,
            output_voltage_v: output_v.max(0.0),
            battery_health_pct: 91.0,
            brake_pad_remaining_pct: self.brake_pad_pct,
            brake_disc_score: 0.92,
            engine_load_pct: load_pct + n,
            fuel_efficiency_kmpl: fuel_kmpl,
            vehicle_speed_kmph: speed + n,
            ..Sample::default()
        }
    }

    fn apply(&mut self, cmd: &ActuationPacket) {
        if cmd.fog_thermal_protection_active && !self.brake_cooling {
            warn!(
                brake_temp_c = cmd.trigger_measured_brake_temp_c,
                rise_rate = cmd.trigger_brake_temp_rise_rate,
                "Thermal protection engaged, cooling brakes"
            );
            self.brake_cooling = true;
        }
        if cmd.fog_emergency_safeguard_active {
            warn!(confidence = cmd.fog_decision_confidence, "Emergency safeguard engaged");
        }
        if cmd.fog_predictive_service_required {
            info!("Predictive service requested");
        }
    }
}

type SharedVehicle = Arc<Mutex<Vehicle>>;

// ============================================================================
// HTTP Handlers
// ============================================================================

async fn next_reading(State(vehicle): State<SharedVehicle>) -> Json<Sample> {
    let mut v = vehicle.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    Json(v.next_reading())
}

async fn receive_flags(
    State(vehicle): State<SharedVehicle>,
    Json(cmd): Json<ActuationPacket>,
) -> &'static str {
    info!(
        origin = %cmd.decision_origin,
        critical_class = cmd.fog_decision_critical_class,
        actuation = cmd.fog_decision_actuation_triggered,
        "Actuation command received"
    );
    let mut v = vehicle.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    v.apply(&cmd);
    "ok"
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let vehicle = Vehicle::new(args.vehicle_id.clone(), args.phase_len, args.seed)?;

    let app = Router::new()
        .route("/next", get(next_reading))
        .route("/flags", put(receive_flags))
        .with_state(Arc::new(Mutex::new(vehicle)));

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", args.addr))?;

    info!(
        addr = %args.addr,
        vehicle_id = %args.vehicle_id,
        phase_len = args.phase_len,
        "Device simulator listening"
    );
    if let Some(seed) = args.seed {
        info!(seed, "Random seed");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("Simulator server error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_cycle_in_order() {
        assert_eq!(Phase::at(0, 10), Phase::Cruise);
        assert_eq!(Phase::at(10, 10), Phase::HardBraking);
        assert_eq!(Phase::at(35, 10), Phase::EngineOverheat);
        assert_eq!(Phase::at(59, 10), Phase::ChargingFault);
        assert_eq!(Phase::at(60, 10), Phase::Cruise);
    }

    #[test]
    fn seeded_readings_are_reproducible() {
        let mut a = Vehicle::new("V".to_string(), 5, Some(7)).unwrap();
        let mut b = Vehicle::new("V".to_string(), 5, Some(7)).unwrap();
        for _ in 0..12 {
            let (ra, rb) = (a.next_reading(), b.next_reading());
            assert_eq!(ra.brake_temp_c, rb.brake_temp_c);
            assert_eq!(ra.dominant_vibration_hz, rb.dominant_vibration_hz);
        }
    }

    #[test]
    fn hard_braking_heats_brakes() {
        let mut v = Vehicle::new("V".to_string(), 20, Some(1)).unwrap();
        for _ in 0..20 {
            v.next_reading();
        }
        let start = v.brake_temp;
        for _ in 0..15 {
            v.next_reading();
        }
        assert!(v.brake_temp > start + 30.0, "{} -> {}", start, v.brake_temp);
    }
}
