//! Simulation scenario definition
//!
//! A scenario combines a physical model with the state it starts from.

use nalgebra::DVector;

use crate::error::SolverError;
use crate::physics::traits::PhysicalModel;

/// Simulation scenario
///
/// This is the "WHAT to solve" (not "HOW to solve"): the same scenario can be
/// integrated with either stiff method.
pub struct Scenario {
    /// Physical model (equations)
    pub model: Box<dyn PhysicalModel>,

    /// State at `t = 0`
    pub initial_state: DVector<f64>,
}

impl Scenario {
    /// Create a scenario
    pub fn new(model: Box<dyn PhysicalModel>, initial_state: DVector<f64>) -> Self {
        Self { model, initial_state }
    }

    /// Create a scenario starting from the model's own initial state
    pub fn from_model(model: Box<dyn PhysicalModel>) -> Self {
        let initial_state = model.setup_initial_state();
        Self { model, initial_state }
    }

    /// Checks that the initial state matches the model and is finite
    pub fn validate(&self) -> Result<(), SolverError> {
        let expected = self.model.dimension();
        if self.initial_state.len() != expected {
            return Err(SolverError::DimensionMismatch { expected, found: self.initial_state.len() });
        }
        crate::solver::validate_state(&self.initial_state, 0.0)
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }

    pub fn dimension(&self) -> usize {
        self.initial_state.len()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("points", &self.model.points())
            .field("dimension", &self.dimension())
            .field("half bandwidth", &self.model.half_bandwidth())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
