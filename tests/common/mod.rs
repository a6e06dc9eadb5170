//! Common utilities for integration tests

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
#[allow(unused_imports)]
pub use mock_models::{ExponentialDecay, HeatEquation, Robertson};
#[allow(unused_imports)]
pub use test_helpers::{assert_vectors_close, compute_l2_error, create_scenario, relative_error, small_film_model};
