//! Physical models
//!
//! A physical model encapsulates the equations of a system, here the
//! semi-discrete reaction–diffusion balance of a polymer wall.
//!
//! # Core Concepts
//!
//! - **Species**: the twelve tracked chemical species, in a fixed storage order
//! - **Physical Model**: evaluates `dy/dt = f(t, y)` for a flat state vector
//! - **Concentration Field**: species × node view of a state vector
//!
//! # Architecture
//!
//! Physical models are **separate from numerical solvers**:
//! - The model provides the **equations** (physics)
//! - The solver provides the **method** to integrate them (numerics)
//!
//! # Implementing a New Physical Model
//!
//! ```rust
//! use degrad_rs::physics::PhysicalModel;
//! use nalgebra::DVector;
//!
//! struct Decay {
//!     rate: f64,
//! }
//!
//! impl PhysicalModel for Decay {
//!     fn points(&self) -> usize { 1 }
//!
//!     fn compute_physics(&self, _t: f64, state: &DVector<f64>, derivative: &mut DVector<f64>) {
//!         derivative[0] = -self.rate * state[0];
//!     }
//!
//!     fn setup_initial_state(&self) -> DVector<f64> {
//!         DVector::from_element(1, 1.0)
//!     }
//!
//!     fn name(&self) -> &str { "Decay" }
//! }
//!
//! let model = Decay { rate: 2.0 };
//! let y0 = model.setup_initial_state();
//! let mut dydt = DVector::zeros(1);
//! model.compute_physics(0.0, &y0, &mut dydt);
//! assert_eq!(dydt[0], -2.0);
//! ```

pub mod data;
pub mod traits;

pub use data::{ConcentrationField, state_index};
pub use traits::{PhysicalModel, SPECIES_COUNT, Species, species_index_table};
