//! End-to-end degradation scenarios
//!
//! Physical sanity checks on full simulations: product formation, film
//! symmetry, Arrhenius acceleration, grid convergence and the reference
//! film at 40 °C.

use degrad_rs::chemistry::{InitialConcentrations, KineticParameters};
use degrad_rs::error::DegradationError;
use degrad_rs::models::{DegradationModel, SimulationParams, simulate_batch, suez_film_model};
use degrad_rs::output::{ExperimentalSeries, calculate_molar_mass, calculate_oit, compare_with_reference, time_to_threshold};
use degrad_rs::physics::Species;
use degrad_rs::solver::ExposureGeometry;
use ndarray::array;

mod common;
use common::small_film_model;

#[test]
fn test_no_initiation_no_products() {
    let kinetics = KineticParameters::default()
        .with_initial_concentrations(InitialConcentrations { hydroperoxide: 0.0, ..Default::default() });
    let model = small_film_model(9, 200.0).with_kinetics(kinetics);
    let result = model.simulate(&SimulationParams::new(40.0, 0.0, 0.5).with_output_points(6));
    assert!(result.success, "{:?}", result.message);

    for species in [Species::Carbonyl, Species::ChainScission, Species::Crosslink, Species::GraftedChlorine] {
        let worst = result.species(species).iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(worst < 1e-10, "{species} reached {worst:e}");
    }
}

#[test]
fn test_pipe_outer_face_is_shielded() {
    let params = SimulationParams::new(40.0, 1.0, 0.5).with_output_points(6);
    let pipe = DegradationModel::new(4.5e-3, 20, ExposureGeometry::Pipe, Default::default()).unwrap();
    let film = DegradationModel::new(4.5e-3, 20, ExposureGeometry::Film, Default::default()).unwrap();

    let wet_dry = pipe.simulate(&params);
    let wet_wet = film.simulate(&params);
    assert!(wet_dry.success, "{:?}", wet_dry.message);
    assert!(wet_wet.success, "{:?}", wet_wet.message);

    let last = wet_dry.n_times() - 1;
    let boundary = wet_dry.disinfectant_boundary;
    assert!(boundary > 0.0);

    // no-flux outer face: disinfectant only arrives by crossing the wall
    let doc = wet_dry.profile(Species::Disinfectant, last);
    assert!((doc[0] - boundary).abs() <= 1e-9 * boundary);
    assert!(doc[19] < 1e-2 * boundary, "outer DOC {:e} vs boundary {boundary:e}", doc[19]);

    // evaporation at the dry face is slower than extraction plus attack at the wet face
    let ah = wet_dry.profile(Species::Antioxidant, last);
    assert!(ah[19] > ah[0], "outer AH {:e} should exceed inner AH {:e}", ah[19], ah[0]);

    // two-sided exposure wets the outer face and ages the wall faster
    assert!((wet_wet.profile(Species::Disinfectant, last)[19] - boundary).abs() <= 1e-9 * boundary);
    let pipe_oit = pipe.average_oit(&wet_dry);
    let film_oit = film.average_oit(&wet_wet);
    assert_eq!(pipe_oit[0], film_oit[0]);
    assert!(film_oit[last] < pipe_oit[last], "film {} vs pipe {}", film_oit[last], pipe_oit[last]);
}

#[test]
fn test_film_profiles_are_symmetric() {
    let model = small_film_model(11, 200.0);
    let result = model.simulate(&SimulationParams::new(40.0, 0.05, 0.25).with_output_points(4));
    assert!(result.success, "{:?}", result.message);

    let last = result.n_times() - 1;
    for species in [Species::Oxygen, Species::Disinfectant, Species::Antioxidant, Species::Hydroperoxide, Species::Carbonyl] {
        let profile = result.profile(species, last);
        let scale = profile.iter().fold(1e-12f64, |m, v| m.max(v.abs()));
        for i in 0..11 {
            let mirror = profile[10 - i];
            assert!(
                (profile[i] - mirror).abs() <= 1e-4 * scale,
                "{species}: node {i} = {} but mirror = {}",
                profile[i],
                mirror
            );
        }
    }
}

#[test]
fn test_higher_temperature_depletes_faster() {
    let model = small_film_model(15, 200.0);
    let params: Vec<_> = [30.0, 45.0, 60.0]
        .iter()
        .map(|&t| SimulationParams::new(t, 0.05, 3.0).with_output_points(200))
        .collect();

    let lifetimes: Vec<f64> = simulate_batch(&model, &params)
        .iter()
        .map(|r| {
            assert!(r.success, "{:?}", r.message);
            let oit = model.average_oit(r);
            time_to_threshold(r.times_years().view(), oit.view(), 100.0)
                .unwrap_or_else(|| panic!("OIT never halved at {} °C", r.params.temperature_celsius))
        })
        .collect();
    println!("years to half OIT at 30/45/60 °C: {lifetimes:?}");

    assert!(lifetimes[2] < lifetimes[1]);
    assert!(lifetimes[1] < lifetimes[0]);
}

#[test]
fn test_grid_refinement_convergence() {
    let params = SimulationParams::new(40.0, 0.05, 0.75).with_output_points(10);
    let coarse = suez_film_model(None).unwrap();
    let fine = DegradationModel::new(coarse.thickness(), 100, coarse.geometry(), *coarse.material()).unwrap();

    let a = coarse.average_oit(&coarse.simulate(&params));
    let b = fine.average_oit(&fine.simulate(&params));
    assert_eq!(a.len(), b.len());
    let reference = coarse.material().initial_oit();
    for k in 0..a.len() {
        assert!((a[k] - b[k]).abs() < 0.05 * reference, "t[{k}]: nz=50 {} vs nz=100 {}", a[k], b[k]);
    }
}

#[test]
fn test_reference_film_in_water() {
    let model = suez_film_model(None).unwrap();
    let result = model.simulate(&SimulationParams::new(40.0, 0.0, 0.75));
    assert!(result.success, "{:?}", result.message);

    let oit = model.average_oit(&result);
    assert!((oit[0] - 291.07).abs() < 1e-9);
    for k in 1..oit.len() {
        assert!(oit[k] <= oit[k - 1] + 1e-9, "OIT rose at sample {k}: {} -> {}", oit[k - 1], oit[k]);
    }
    assert!(oit[oit.len() - 1] < oit[0]);

    let comparison = compare_with_reference(&ExperimentalSeries::suez_water(), result.times_months().view(), oit.view());
    assert_eq!(comparison.predicted.len(), 6);
    assert!(comparison.metrics.rmse.is_finite());
}

#[test]
fn test_degenerate_post_processing_is_floored() {
    let oit = calculate_oit(&array![[1.0, -2.0], [3.0, 4.0]], 1e-13, 291.07);
    assert!(oit.iter().all(|v| *v == 0.0));

    let mw = calculate_molar_mass(&array![1e9, 0.0], &array![0.0, 10.0], 150.0);
    assert!(mw.iter().all(|v| v.is_finite() && *v > 0.0));
    assert!(mw[1] <= 1e6);
}

#[test]
fn test_unknown_geometry_is_a_configuration_error() {
    let err = DegradationModel::from_mode(1e-3, 20, "slab", Default::default()).unwrap_err();
    assert!(matches!(err, DegradationError::Configuration(_)));
}

#[test]
fn test_success_flag_and_units() {
    let model = small_film_model(5, 200.0);
    let result = model.simulate(&SimulationParams::new(40.0, 0.0, 1.0).with_output_points(13));
    assert!(result.success);
    assert!(result.message.is_none());
    assert_eq!(result.concentrations.dim(), (12, 5, 13));
    assert!((result.times_months()[12] - 12.0).abs() < 1e-9);
    assert!(result.initial_antioxidant > 0.0);
    assert_eq!(result.disinfectant_boundary, 0.0);
}
