//! Health model output

use serde::{Deserialize, Serialize};

/// Scored health vector for one window.
///
/// All scores are in [0, 1]. Risk/stress scores grow with danger;
/// `vehicle_health` and `confidence` grow with wellbeing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub thermal_stress: f64,
    pub mechanical_risk: f64,
    pub electrical_risk: f64,
    pub load_stress: f64,
    /// Composite score: 1 − weighted sum of the four subscores
    pub vehicle_health: f64,
    /// Brake temperature and its rise rate both past their thresholds
    pub thermal_protection: bool,
    /// Composite health below the emergency threshold
    pub emergency: bool,
    /// `thermal_protection || emergency`
    pub actuation: bool,
    pub confidence: f64,
}
