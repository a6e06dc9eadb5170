//! PE degradation models
//!
//! [`DegradationModel`] is the entry point: it owns geometry, material and
//! kinetics and turns a [`SimulationParams`] into a [`SimulationResult`].
//! The solver only sees the [`DegradationSystem`] it builds, through the
//! [`PhysicalModel`](crate::physics::PhysicalModel) trait.
//!
//! # Geometries
//!
//! ## Pipe
//!
//! Water on the inner face only. Disinfectant cannot leave through the outer
//! face and the antioxidant evaporates there with a smaller coefficient.
//!
//! ## Film
//!
//! Both faces in water and treated identically, so profiles are symmetric
//! about the midplane.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod batch;
pub mod degradation;
pub mod params;
pub mod presets;
pub mod reaction_diffusion;
pub mod result;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use batch::{simulate_batch, simulate_ensemble};
pub use degradation::{DegradationModel, MIN_NODES};
pub use params::{MONTHS_PER_YEAR, SECONDS_PER_YEAR, SimulationParams};
pub use presets::{colin_pipe_model, suez_film_model};
pub use reaction_diffusion::DegradationSystem;
pub use result::SimulationResult;
