//! Helper functions for integration tests

#![allow(dead_code)]

use degrad_rs::chemistry::MaterialProperties;
use degrad_rs::models::DegradationModel;
use degrad_rs::physics::PhysicalModel;
use degrad_rs::solver::{ExposureGeometry, Scenario};
use nalgebra::DVector;

/// Assert that two vectors are close element-wise (absolute tolerance)
pub fn assert_vectors_close(v1: &DVector<f64>, v2: &DVector<f64>, tolerance: f64, message: &str) {
    assert_eq!(v1.len(), v2.len(), "{}: Dimension mismatch", message);
    for (i, (a, b)) in v1.iter().zip(v2.iter()).enumerate() {
        let diff = (a - b).abs();
        assert!(diff < tolerance, "{}: Element {} differs by {} (tolerance {})", message, i, diff, tolerance);
    }
}

/// Root-mean-square difference between two vectors
pub fn compute_l2_error(v1: &DVector<f64>, v2: &DVector<f64>) -> f64 {
    if v1.is_empty() {
        return 0.0;
    }
    ((v1 - v2).norm_squared() / v1.len() as f64).sqrt()
}

/// Relative error |computed - exact| / |exact|
pub fn relative_error(computed: f64, exact: f64) -> f64 {
    if exact.abs() < 1e-14 {
        computed.abs()
    } else {
        (computed - exact).abs() / exact.abs()
    }
}

/// Scenario starting from the model's own initial state
pub fn create_scenario<M: PhysicalModel + 'static>(model: M) -> Scenario {
    Scenario::from_model(Box::new(model))
}

/// Thin film with few nodes, fast enough for integration tests
pub fn small_film_model(nodes: usize, initial_oit: f64) -> DegradationModel {
    let material = MaterialProperties::new(degrad_rs::chemistry::MaterialInput {
        initial_oit,
        ..Default::default()
    })
    .unwrap();
    DegradationModel::new(0.4e-3, nodes, ExposureGeometry::Film, material).unwrap()
}
