//! Stiff time integrators
//!
//! - **`bdf`**: variable-order backward differentiation formulas
//! - **`radau`**: three-stage Radau IIA
//! - **`banded`**: band storage, banded LU and the grouped finite-difference Jacobian
//! - **`common`**: RHS counter, norms, initial step and output sampling

pub mod banded;
pub mod bdf;
mod common;
pub mod radau;

pub use banded::{BandedLu, BandedMatrix};
pub use bdf::BdfSolver;
pub use common::OdeFunction;
pub use radau::RadauSolver;
