//! Core solver traits and types

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{DegradationError, SolverError};
use crate::solver::methods::{BdfSolver, RadauSolver};
use crate::solver::scenario::Scenario;

// =================================================================================================
// Solver Trait
// =================================================================================================

/// Trait for numerical solvers
///
/// # Responsibility
/// Integrates the equations provided by a [`crate::physics::PhysicalModel`]
/// from the scenario's initial state over `[0, config.total_time]` and samples
/// the solution at the configured output times.
///
/// A failed integration is reported as `Err`; nothing partial is returned.
pub trait Solver: Send + Sync {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<Trajectory, SolverError>;

    /// Name of the solver (used to display and logging)
    fn name(&self) -> &str;
}

// =================================================================================================
// Integrator selection
// =================================================================================================

/// Stiff integration method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntegratorMethod {
    /// Variable-order (1–5) backward differentiation formulas
    #[default]
    #[serde(rename = "BDF")]
    Bdf,
    /// Three-stage Radau IIA (order 5)
    #[serde(rename = "Radau")]
    Radau,
}

impl IntegratorMethod {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorMethod::Bdf => "BDF",
            IntegratorMethod::Radau => "Radau",
        }
    }

    /// Order of the embedded error estimator, used for step-size selection
    pub fn error_estimator_order(&self) -> i32 {
        match self {
            IntegratorMethod::Bdf => 1,
            IntegratorMethod::Radau => 3,
        }
    }

    pub fn solver(&self) -> Box<dyn Solver> {
        match self {
            IntegratorMethod::Bdf => Box::new(BdfSolver::new()),
            IntegratorMethod::Radau => Box::new(RadauSolver::new()),
        }
    }
}

impl fmt::Display for IntegratorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorMethod {
    type Err = DegradationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bdf" => Ok(IntegratorMethod::Bdf),
            "radau" => Ok(IntegratorMethod::Radau),
            other => Err(DegradationError::Configuration(format!(
                "unknown integration method '{other}' (expected 'BDF' or 'Radau')"
            ))),
        }
    }
}

// =================================================================================================
// Solver Configuration
// =================================================================================================

/// Numerical settings of one integration
///
/// # Example
///
/// ```rust
/// use degrad_rs::solver::{IntegratorMethod, SolverConfiguration};
///
/// let config = SolverConfiguration::time_evolution(3600.0, 5)
///     .with_method(IntegratorMethod::Radau)
///     .with_tolerances(1e-8, 1e-12);
///
/// assert_eq!(config.output_times(), vec![0.0, 900.0, 1800.0, 2700.0, 3600.0]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    pub method: IntegratorMethod,
    /// End of the integration interval (s)
    pub total_time: f64,
    /// Number of equally spaced output samples, both ends included
    pub output_points: usize,
    pub rtol: f64,
    pub atol: f64,
    /// Initial step; chosen automatically when `None`
    pub first_step: Option<f64>,
    pub max_step: f64,
    /// Guard against runaway integrations
    pub max_steps: usize,
}

impl SolverConfiguration {
    /// Create a time resolution configuration with default tolerances
    pub fn time_evolution(total_time: f64, output_points: usize) -> Self {
        Self {
            method: IntegratorMethod::default(),
            total_time,
            output_points,
            rtol: 1e-6,
            atol: 1e-9,
            first_step: None,
            max_step: f64::INFINITY,
            max_steps: 500_000,
        }
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

    pub fn with_first_step(mut self, first_step: f64) -> Self {
        self.first_step = Some(first_step);
        self
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sample times `linspace(0, total_time, max(2, output_points))`
    pub fn output_times(&self) -> Vec<f64> {
        let n = self.output_points.max(2);
        let step = self.total_time / (n - 1) as f64;
        let mut times: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
        times[n - 1] = self.total_time;
        times
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SolverError> {
        let invalid = |msg: String| Err(SolverError::InvalidConfiguration(msg));

        if !(self.total_time > 0.0) || !self.total_time.is_finite() {
            return invalid(format!("total time must be positive and finite, got {}", self.total_time));
        }
        if !(self.rtol > 0.0) || !(self.atol > 0.0) {
            return invalid(format!("tolerances must be positive, got rtol={} atol={}", self.rtol, self.atol));
        }
        if !(self.max_step > 0.0) {
            return invalid(format!("max step must be positive, got {}", self.max_step));
        }
        if let Some(h) = self.first_step {
            if !(h > 0.0) || h > self.total_time {
                return invalid(format!("first step must lie in (0, total_time], got {h}"));
            }
        }
        if self.max_steps == 0 {
            return invalid("max steps must be at least 1".to_string());
        }
        Ok(())
    }
}

// =================================================================================================
// Trajectory
// =================================================================================================

/// Work counters of one integration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStatistics {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
    pub jacobian_evaluations: usize,
    pub lu_decompositions: usize,
}

/// Solution sampled at the output times
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub time_points: Vec<f64>,
    pub states: Vec<DVector<f64>>,
    pub statistics: SolverStatistics,
    pub metadata: HashMap<String, String>,
}

impl Trajectory {
    pub fn new(time_points: Vec<f64>, states: Vec<DVector<f64>>, statistics: SolverStatistics) -> Self {
        Self { time_points, states, statistics, metadata: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("BDF".parse::<IntegratorMethod>().unwrap(), IntegratorMethod::Bdf);
        assert_eq!("radau".parse::<IntegratorMethod>().unwrap(), IntegratorMethod::Radau);
        assert!(matches!(
            "LSODA".parse::<IntegratorMethod>(),
            Err(DegradationError::Configuration(_))
        ));
    }

    #[test]
    fn test_method_serde_names() {
        let json = serde_json::to_string(&IntegratorMethod::Bdf).unwrap();
        assert_eq!(json, "\"BDF\"");
        let m: IntegratorMethod = serde_json::from_str("\"Radau\"").unwrap();
        assert_eq!(m, IntegratorMethod::Radau);
    }

    #[test]
    fn test_output_times_never_fewer_than_two() {
        let config = SolverConfiguration::time_evolution(10.0, 1);
        assert_eq!(config.output_times(), vec![0.0, 10.0]);

        let config = SolverConfiguration::time_evolution(1.0, 101);
        let times = config.output_times();
        assert_eq!(times.len(), 101);
        assert_eq!(*times.last().unwrap(), 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(SolverConfiguration::time_evolution(0.0, 10).validate().is_err());
        assert!(SolverConfiguration::time_evolution(f64::NAN, 10).validate().is_err());
        assert!(SolverConfiguration::time_evolution(1.0, 10).with_tolerances(0.0, 1e-9).validate().is_err());
        assert!(SolverConfiguration::time_evolution(1.0, 10).with_first_step(2.0).validate().is_err());
        assert!(SolverConfiguration::time_evolution(1.0, 10).with_max_steps(0).validate().is_err());
        assert!(SolverConfiguration::time_evolution(1.0, 10).validate().is_ok());
    }

    #[test]
    fn test_trajectory_metadata() {
        let mut traj = Trajectory::new(vec![0.0], vec![DVector::zeros(2)], SolverStatistics::default());
        traj.add_metadata("solver", "BDF");
        assert_eq!(traj.get_metadata("solver"), Some("BDF"));
        assert_eq!(traj.len(), 1);
        assert!(traj.final_state().is_some());
    }
}
