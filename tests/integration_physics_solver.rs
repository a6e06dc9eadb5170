//! Integration tests: physics module + solver module
//!
//! These tests verify that the degradation system and the stiff solvers
//! work correctly together.

use degrad_rs::chemistry::{CoefficientTables, KineticParameters};
use degrad_rs::error::SolverError;
use degrad_rs::models::SimulationParams;
use degrad_rs::physics::{ConcentrationField, PhysicalModel, SPECIES_COUNT, Species};
use degrad_rs::solver::{BdfSolver, IntegratorMethod, RadauSolver, Scenario, Solver, SolverConfiguration};
use nalgebra::DVector;

mod common;
use common::{ExponentialDecay, Robertson, create_scenario, relative_error, small_film_model};

// =================================================================================================
// Basic Integration Tests
// =================================================================================================

#[test]
fn test_output_grid_is_exact() {
    let scenario = create_scenario(ExponentialDecay::new(4, 0.1));
    let config = SolverConfiguration::time_evolution(10.0, 11);
    let result = BdfSolver::new().solve(&scenario, &config).unwrap();

    assert_eq!(result.time_points.len(), 11);
    assert_eq!(result.time_points[0], 0.0);
    assert_eq!(*result.time_points.last().unwrap(), 10.0);
    assert!((result.time_points[3] - 3.0).abs() < 1e-12);

    // first sample is the initial state itself
    assert_eq!(result.states[0], DVector::from_element(4, 1.0));
    let expected = (-1.0f64).exp();
    assert!(relative_error(result.final_state().unwrap()[2], expected) < 1e-4);
}

#[test]
fn test_dimension_mismatch_is_reported() {
    let scenario = Scenario::new(Box::new(Robertson), DVector::from_vec(vec![1.0, 0.0]));
    let config = SolverConfiguration::time_evolution(1.0, 2);
    for solver in [Box::new(BdfSolver::new()) as Box<dyn Solver>, Box::new(RadauSolver::new())] {
        let err = solver.solve(&scenario, &config).unwrap_err();
        assert_eq!(err, SolverError::DimensionMismatch { expected: 3, found: 2 });
    }
}

#[test]
fn test_invalid_configuration_is_reported() {
    let scenario = create_scenario(Robertson);
    let config = SolverConfiguration::time_evolution(-1.0, 5);
    let err = BdfSolver::new().solve(&scenario, &config).unwrap_err();
    assert!(matches!(err, SolverError::InvalidConfiguration(_)));
}

#[test]
fn test_step_guard_on_stiff_problem() {
    let scenario = create_scenario(Robertson);
    let config = SolverConfiguration::time_evolution(1e5, 3).with_max_steps(5);
    let err = RadauSolver::new().solve(&scenario, &config).unwrap_err();
    assert!(matches!(err, SolverError::MaxStepsExceeded { steps: 5, .. }));
}

// =================================================================================================
// Degradation system through the solver
// =================================================================================================

#[test]
fn test_degradation_system_is_banded() {
    let model = small_film_model(6, 200.0);
    let params = SimulationParams::new(40.0, 0.05, 0.01);
    let coefficients = model.resolve_coefficients(params.temperature_kelvin());
    let system = model.build_system(&params, &coefficients);

    assert_eq!(system.dimension(), 6 * SPECIES_COUNT);
    assert_eq!(system.half_bandwidth(), Some(SPECIES_COUNT));

    // perturbing node 0 leaves the RHS of node 2 untouched
    let y0 = system.setup_initial_state();
    let mut f0 = DVector::zeros(y0.len());
    system.compute_physics(0.0, &y0, &mut f0);
    let mut y1 = y0.clone();
    y1[Species::Antioxidant.index()] *= 2.0;
    let mut f1 = DVector::zeros(y0.len());
    system.compute_physics(0.0, &y1, &mut f1);
    for i in 2 * SPECIES_COUNT..y0.len() {
        assert_eq!(f0[i], f1[i]);
    }
}

#[test]
fn test_both_methods_integrate_the_wall() {
    let model = small_film_model(6, 200.0);
    let base = SimulationParams::new(40.0, 0.05, 0.05).with_output_points(4);

    let bdf = model.simulate(&base.clone().with_method(IntegratorMethod::Bdf));
    let radau = model.simulate(&base.with_method(IntegratorMethod::Radau));
    assert!(bdf.success, "{:?}", bdf.message);
    assert!(radau.success, "{:?}", radau.message);

    let a = model.average_oit(&bdf);
    let b = model.average_oit(&radau);
    for k in 0..4 {
        assert!((a[k] - b[k]).abs() < 1e-3 * 200.0, "t[{k}]: {} vs {}", a[k], b[k]);
    }
}

#[test]
fn test_dirichlet_faces_hold() {
    let model = small_film_model(7, 200.0);
    let params = SimulationParams::new(45.0, 0.1, 0.02).with_output_points(3);
    let result = model.simulate(&params);
    assert!(result.success);

    let doc = result.species(Species::Disinfectant);
    for k in 0..3 {
        assert_eq!(doc[[0, k]], result.disinfectant_boundary);
        assert_eq!(doc[[6, k]], result.disinfectant_boundary);
    }
    // interior starts clean and is filled from the faces
    assert_eq!(doc[[3, 0]], 0.0);
    assert!(doc[[1, 2]] > 0.0);
}

#[test]
fn test_custom_tables_change_the_result() {
    let model = small_film_model(6, 200.0);
    let faster = model.clone().with_kinetics(
        KineticParameters::default().with_tables(
            CoefficientTables::default().with_scaled_diffusion(Species::Antioxidant, 10.0),
        ),
    );
    let params = SimulationParams::new(40.0, 0.0, 0.1).with_output_points(3);
    let a = model.average_oit(&model.simulate(&params));
    let b = faster.average_oit(&faster.simulate(&params));
    // faster diffusion feeds the extracting faces
    assert!(b[2] < a[2]);

    let field = ConcentrationField::zeros(6);
    assert_eq!(field.to_state_vector().len(), 6 * SPECIES_COUNT);
}
