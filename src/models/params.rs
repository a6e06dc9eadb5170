//! Per-run simulation inputs

use serde::{Deserialize, Serialize};

use crate::error::DegradationError;
use crate::solver::{IntegratorMethod, SolverConfiguration};

/// Seconds in a Julian year
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Exposure conditions and numerical settings of one simulation
///
/// # Example
///
/// ```rust
/// use degrad_rs::models::SimulationParams;
/// use degrad_rs::solver::IntegratorMethod;
///
/// let params = SimulationParams::new(40.0, 0.05, 0.75)
///     .with_method(IntegratorMethod::Radau)
///     .with_output_points(200);
///
/// assert!((params.temperature_kelvin() - 313.15).abs() < 1e-12);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub temperature_celsius: f64,
    /// Free disinfectant in the water (ppm)
    pub disinfectant_ppm: f64,
    pub duration_years: f64,
    /// Scales the reference initial antioxidant concentration
    #[serde(default = "unit")]
    pub antioxidant_multiplier: f64,
    /// Scales the oxygen saturation concentration
    #[serde(default = "unit")]
    pub oxygen_multiplier: f64,
    #[serde(default)]
    pub method: IntegratorMethod,
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
    #[serde(default = "default_output_points")]
    pub output_points: usize,
}

fn unit() -> f64 {
    1.0
}

fn default_rtol() -> f64 {
    1e-6
}

fn default_atol() -> f64 {
    1e-9
}

fn default_output_points() -> usize {
    100
}

impl SimulationParams {
    pub fn new(temperature_celsius: f64, disinfectant_ppm: f64, duration_years: f64) -> Self {
        Self {
            temperature_celsius,
            disinfectant_ppm,
            duration_years,
            antioxidant_multiplier: unit(),
            oxygen_multiplier: unit(),
            method: IntegratorMethod::default(),
            rtol: default_rtol(),
            atol: default_atol(),
            output_points: default_output_points(),
        }
    }

    pub fn with_antioxidant_multiplier(mut self, multiplier: f64) -> Self {
        self.antioxidant_multiplier = multiplier;
        self
    }

    pub fn with_oxygen_multiplier(mut self, multiplier: f64) -> Self {
        self.oxygen_multiplier = multiplier;
        self
    }

    pub fn with_method(mut self, method: IntegratorMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn with_output_points(mut self, output_points: usize) -> Self {
        self.output_points = output_points;
        self
    }

    pub fn temperature_kelvin(&self) -> f64 {
        self.temperature_celsius + 273.15
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_years * SECONDS_PER_YEAR
    }

    /// Integrator settings for these parameters
    pub fn solver_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::time_evolution(self.duration_seconds(), self.output_points.max(2))
            .with_method(self.method)
            .with_tolerances(self.rtol, self.atol)
    }

    pub fn validate(&self) -> Result<(), DegradationError> {
        let invalid = |msg: String| Err(DegradationError::InvalidParameter(msg));

        if !(self.temperature_kelvin() > 0.0) {
            return invalid(format!("temperature must exceed absolute zero, got {} °C", self.temperature_celsius));
        }
        if !self.disinfectant_ppm.is_finite() {
            return invalid(format!("disinfectant concentration must be finite, got {}", self.disinfectant_ppm));
        }
        if !(self.duration_years > 0.0) || !self.duration_years.is_finite() {
            return invalid(format!("duration must be positive, got {} years", self.duration_years));
        }
        if !(self.antioxidant_multiplier >= 0.0) || !(self.oxygen_multiplier >= 0.0) {
            return invalid("concentration multipliers must be non-negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = SimulationParams::new(40.0, 0.0, 1.0);
        assert_eq!(p.method, IntegratorMethod::Bdf);
        assert_eq!(p.rtol, 1e-6);
        assert_eq!(p.atol, 1e-9);
        assert_eq!(p.output_points, 100);
        assert_eq!(p.duration_seconds(), SECONDS_PER_YEAR);
    }

    #[test]
    fn test_configuration_keeps_at_least_two_points() {
        let config = SimulationParams::new(40.0, 0.0, 1.0).with_output_points(0).solver_configuration();
        assert_eq!(config.output_times().len(), 2);
        assert_eq!(config.total_time, SECONDS_PER_YEAR);
    }

    #[test]
    fn test_validation() {
        assert!(SimulationParams::new(-300.0, 0.0, 1.0).validate().is_err());
        assert!(SimulationParams::new(40.0, 0.0, 0.0).validate().is_err());
        assert!(SimulationParams::new(40.0, f64::NAN, 1.0).validate().is_err());
        assert!(SimulationParams::new(40.0, 0.0, 1.0).with_antioxidant_multiplier(-1.0).validate().is_err());
        // negative ppm is allowed and treated as no disinfectant
        assert!(SimulationParams::new(40.0, -0.1, 1.0).validate().is_ok());
    }

    #[test]
    fn test_json_defaults() {
        let p: SimulationParams = serde_json::from_str(
            r#"{"temperature_celsius": 60.0, "disinfectant_ppm": 0.5, "duration_years": 0.1, "method": "Radau"}"#,
        )
        .unwrap();
        assert_eq!(p.method, IntegratorMethod::Radau);
        assert_eq!(p.antioxidant_multiplier, 1.0);
        assert_eq!(p.output_points, 100);
    }
}
