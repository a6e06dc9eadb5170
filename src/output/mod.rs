//! Post-processing of simulation results
//!
//! - [`postprocess`]: OIT, molar mass, surface values, interpolation and
//!   threshold crossings. Pure functions of a [`SimulationResult`](crate::models::SimulationResult).
//! - [`validation`]: measured OIT series and goodness-of-fit metrics.
//!
//! # Example
//!
//! ```rust
//! use degrad_rs::output::{ValidationMetrics, time_to_threshold};
//! use ndarray::array;
//!
//! let t = array![0.0, 1.0, 2.0];
//! let oit = array![200.0, 150.0, 50.0];
//! assert_eq!(time_to_threshold(t.view(), oit.view(), 100.0), Some(1.5));
//!
//! let m = ValidationMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
//! assert_eq!(m.rmse, 0.0);
//! ```

pub mod postprocess;
pub mod validation;

pub use postprocess::{
    DerivedQuantity, INVERSE_MOLAR_MASS_FLOOR, OIT_REFERENCE_FLOOR, average_oit, calculate_molar_mass, calculate_oit,
    derived_series, interpolate, interpolate_at_times, interpolate_series, molar_mass_profiles, oit_profiles,
    surface_concentration, time_to_threshold,
};
pub use validation::{Comparison, ExperimentalSeries, SUEZ_INITIAL_OIT, ValidationMetrics, compare_with_reference};
