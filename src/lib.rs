//! degrad-rs: Polyethylene Degradation Simulation
//!
//! Predicts antioxidant depletion, oxidation induction time (OIT) and
//! molar-mass changes in PE pipe walls and films exposed to disinfected water.
//!
//! # Architecture
//!
//! degrad-rs keeps physics and numerics apart:
//!
//! 1. **Physics** (what to solve)
//!    - [`chemistry`] resolves Arrhenius coefficients and evaluates the
//!      12-species radical oxidation scheme
//!    - [`models`] assembles the reaction–diffusion system across the wall
//!
//! 2. **Numerics** (how to solve)
//!    - [`solver`] integrates any [`physics::PhysicalModel`] with stiff
//!      implicit methods (BDF, Radau IIA) on a banded Jacobian
//!
//! [`output`] reduces the raw concentration field to engineering quantities.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use degrad_rs::prelude::*;
//!
//! # fn main() -> Result<(), DegradationError> {
//! let model = suez_film_model(None)?;
//! let params = SimulationParams::new(40.0, 0.05, 0.75).with_method(IntegratorMethod::Radau);
//!
//! let result = model.simulate(&params);
//! if result.success {
//!     let oit = model.average_oit(&result);
//!     println!("OIT after 9 months: {:.1} min", oit[oit.len() - 1]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: species, state layout and the model trait
//! - [`chemistry`]: coefficients, kinetics and material data
//! - [`solver`]: integrators and boundary conditions
//! - [`models`]: the degradation model, parameters and results
//! - [`output`]: post-processing and validation metrics
//! - [`config`]: JSON model configuration
//! - [`logging`]: logger setup

// Core modules
pub mod chemistry;
pub mod physics;

pub mod models;
pub mod solver;

pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use degrad_rs::prelude::*;
    //! ```
    pub use crate::chemistry::{CoefficientTables, KineticParameters, MaterialInput, MaterialProperties};
    pub use crate::error::{DegradationError, SolverError};
    pub use crate::models::{
        DegradationModel, SimulationParams, SimulationResult, colin_pipe_model, simulate_batch, suez_film_model,
    };
    pub use crate::output::{DerivedQuantity, ValidationMetrics};
    pub use crate::physics::{PhysicalModel, Species};
    pub use crate::solver::{ExposureGeometry, IntegratorMethod, Scenario, Solver, SolverConfiguration};
}
