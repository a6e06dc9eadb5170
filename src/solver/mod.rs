//! Numerical solvers
//!
//! This module provides the time integrators and the problem definition
//! they operate on.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Physical model (right-hand side, Jacobian band structure)
//!    - Initial state
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Method (BDF or Radau)
//!    - Tolerances, output times, step limits
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns the sampled trajectory
//!    - Independent of physics
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `IntegratorMethod`, `SolverConfiguration`, `Trajectory`
//! - **`boundary`**: face conditions of the wall and the disinfectant equilibrium
//! - **`scenario`**: model + initial state
//! - **`methods`**: `BdfSolver`, `RadauSolver` and the banded linear algebra they share
//!
//! # Quick Start Example
//!
//! ```rust
//! use degrad_rs::physics::PhysicalModel;
//! use degrad_rs::solver::{IntegratorMethod, Scenario, SolverConfiguration};
//! use nalgebra::DVector;
//!
//! struct Relaxation;
//! impl PhysicalModel for Relaxation {
//!     fn points(&self) -> usize { 3 }
//!     fn compute_physics(&self, _t: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
//!         for i in 0..3 {
//!             dy[i] = -(i as f64 + 1.0) * y[i];
//!         }
//!     }
//!     fn half_bandwidth(&self) -> Option<usize> { Some(0) }
//!     fn setup_initial_state(&self) -> DVector<f64> { DVector::from_element(3, 1.0) }
//!     fn name(&self) -> &str { "Relaxation" }
//! }
//!
//! // 1. Create scenario (WHAT to solve)
//! let scenario = Scenario::from_model(Box::new(Relaxation));
//!
//! // 2. Create configuration (HOW to solve)
//! let config = SolverConfiguration::time_evolution(2.0, 21)
//!     .with_method(IntegratorMethod::Radau);
//!
//! // 3. Solve
//! let result = config.method.solver().solve(&scenario, &config).unwrap();
//! assert_eq!(result.len(), 21);
//! ```
//!
//! # Error Handling
//!
//! Solvers return `Result<Trajectory, SolverError>`. Common errors:
//! - Invalid configuration (non-positive time or tolerances)
//! - Dimension mismatch between model and initial state
//! - Step size collapse (repeated Newton failures)
//! - Non-finite values in the state

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod boundary;
pub mod methods;
mod scenario;
mod traits;

use nalgebra::DVector;

use crate::error::SolverError;

/// Rejects states containing NaN or infinite values
pub(crate) fn validate_state(state: &DVector<f64>, time: f64) -> Result<(), SolverError> {
    if state.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SolverError::NonFinite { time })
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use boundary::{
    DomainBoundaries, ExposureGeometry, Face, FaceBoundary, FaceCondition,
    equilibrium_disinfectant_concentration,
};
pub use methods::{BdfSolver, RadauSolver};
pub use scenario::Scenario;
pub use traits::{IntegratorMethod, Solver, SolverConfiguration, SolverStatistics, Trajectory};
