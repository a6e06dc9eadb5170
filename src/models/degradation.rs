//! PE wall degradation model
//!
//! [`DegradationModel`] owns the geometry, the material and the kinetic
//! parameters. Each call to [`DegradationModel::simulate`] resolves the
//! coefficients at the requested temperature, builds a fresh
//! [`DegradationSystem`] and integrates it. The model itself is never
//! mutated, so one instance can serve parallel simulations.
//!
//! # Example
//!
//! ```rust,no_run
//! use degrad_rs::models::{DegradationModel, SimulationParams};
//! use degrad_rs::chemistry::MaterialProperties;
//! use degrad_rs::solver::ExposureGeometry;
//!
//! let model = DegradationModel::new(0.4e-3, 50, ExposureGeometry::Film, MaterialProperties::default())?;
//! let result = model.simulate(&SimulationParams::new(40.0, 0.05, 0.75));
//! assert!(result.success);
//! let oit = model.average_oit(&result);
//! # Ok::<(), degrad_rs::error::DegradationError>(())
//! ```

use std::time::Instant;

use log::{debug, info, warn};
use ndarray::{Array1, Array2};

use crate::chemistry::{CoefficientCache, KineticParameters, MaterialProperties, ResolvedCoefficients};
use crate::error::DegradationError;
use crate::models::{DegradationSystem, SimulationParams, SimulationResult};
use crate::output::{self, DerivedQuantity};
use crate::physics::{ConcentrationField, Species};
use crate::solver::{DomainBoundaries, ExposureGeometry, Scenario, equilibrium_disinfectant_concentration};

/// Fewest grid nodes that leave one interior node
pub const MIN_NODES: usize = 3;

/// One-dimensional PE wall exposed to disinfected water
#[derive(Debug, Clone)]
pub struct DegradationModel {
    /// Wall or film thickness (m)
    thickness: f64,
    nodes: usize,
    geometry: ExposureGeometry,
    material: MaterialProperties,
    kinetics: KineticParameters,
    /// Node coordinates from the water face (m)
    grid: Array1<f64>,
}

impl DegradationModel {
    /// Uniform grid of `nodes` points across `thickness`
    ///
    /// # Errors
    ///
    /// [`DegradationError::Configuration`] when `nodes < 3` or the thickness
    /// is not a positive finite number.
    pub fn new(
        thickness: f64,
        nodes: usize,
        geometry: ExposureGeometry,
        material: MaterialProperties,
    ) -> Result<Self, DegradationError> {
        if nodes < MIN_NODES {
            return Err(DegradationError::Configuration(format!(
                "at least {MIN_NODES} grid nodes are required, got {nodes}"
            )));
        }
        if !(thickness > 0.0) || !thickness.is_finite() {
            return Err(DegradationError::Configuration(format!(
                "thickness must be positive and finite, got {thickness}"
            )));
        }

        Ok(Self {
            thickness,
            nodes,
            geometry,
            material,
            kinetics: KineticParameters::default(),
            grid: Array1::linspace(0.0, thickness, nodes),
        })
    }

    /// Same as [`DegradationModel::new`] with the geometry given by name
    pub fn from_mode(
        thickness: f64,
        nodes: usize,
        mode: &str,
        material: MaterialProperties,
    ) -> Result<Self, DegradationError> {
        Self::new(thickness, nodes, mode.parse()?, material)
    }

    pub fn with_kinetics(mut self, kinetics: KineticParameters) -> Self {
        self.kinetics = kinetics;
        self
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn spacing(&self) -> f64 {
        self.thickness / (self.nodes - 1) as f64
    }

    pub fn grid(&self) -> &Array1<f64> {
        &self.grid
    }

    pub fn geometry(&self) -> ExposureGeometry {
        self.geometry
    }

    pub fn material(&self) -> &MaterialProperties {
        &self.material
    }

    pub fn kinetics(&self) -> &KineticParameters {
        &self.kinetics
    }

    /// All coefficient families at `temperature` (K)
    pub fn resolve_coefficients(&self, temperature: f64) -> ResolvedCoefficients {
        self.kinetics.tables.resolve(temperature)
    }

    /// Face concentrations of oxygen and disinfectant for `params`
    fn face_concentrations(&self, params: &SimulationParams, coefficients: &ResolvedCoefficients) -> (f64, f64) {
        let oxygen = self.kinetics.initial.oxygen_saturation * params.oxygen_multiplier;
        let disinfectant = equilibrium_disinfectant_concentration(
            params.disinfectant_ppm,
            coefficients,
            self.material.amorphous_fraction(),
        );
        (oxygen, disinfectant)
    }

    fn initial_antioxidant(&self, params: &SimulationParams) -> f64 {
        self.kinetics.initial.antioxidant * params.antioxidant_multiplier
    }

    /// Uniform initial state with the Dirichlet face values already imposed
    pub fn initial_field(&self, params: &SimulationParams, boundaries: &DomainBoundaries) -> ConcentrationField {
        let initial = &self.kinetics.initial;
        let mut field = ConcentrationField::zeros(self.nodes);
        field.fill(Species::Oxygen, initial.oxygen_saturation * params.oxygen_multiplier);
        field.fill(Species::Antioxidant, self.initial_antioxidant(params));
        field.fill(Species::Hydroperoxide, initial.hydroperoxide);
        field.fill(Species::PolymerBackbone, initial.polymer);
        boundaries.apply_to(&mut field);
        field
    }

    /// Right-hand side for `params` with coefficients already resolved
    pub fn build_system(&self, params: &SimulationParams, coefficients: &ResolvedCoefficients) -> DegradationSystem {
        let (oxygen, disinfectant) = self.face_concentrations(params, coefficients);
        let boundaries = DomainBoundaries::for_geometry(self.geometry, oxygen, disinfectant, coefficients);
        let initial = self.initial_field(params, &boundaries);
        DegradationSystem::new(self.spacing(), self.kinetics.scheme(coefficients), coefficients, boundaries, initial)
    }

    /// Runs one simulation
    ///
    /// Never panics and never returns an error: invalid parameters and
    /// integrator failures give a result with `success == false` and a
    /// message.
    pub fn simulate(&self, params: &SimulationParams) -> SimulationResult {
        let coefficients = self.resolve_coefficients(params.temperature_kelvin());
        self.simulate_with(params, &coefficients)
    }

    /// [`DegradationModel::simulate`] reusing coefficients from `cache`
    pub fn simulate_cached(&self, params: &SimulationParams, cache: &mut CoefficientCache) -> SimulationResult {
        let coefficients = cache.resolve(&self.kinetics.tables, params.temperature_kelvin()).clone();
        self.simulate_with(params, &coefficients)
    }

    fn simulate_with(&self, params: &SimulationParams, coefficients: &ResolvedCoefficients) -> SimulationResult {
        let antioxidant = self.initial_antioxidant(params);
        let (_, disinfectant) = self.face_concentrations(params, coefficients);

        if let Err(e) = params.validate() {
            warn!("Rejected simulation parameters: {e}");
            return SimulationResult::failed(self.nodes, params.clone(), antioxidant, disinfectant, e.to_string());
        }

        info!(
            "Running simulation: T = {} °C, DOC = {} ppm, {} years, {} geometry, {} nodes, {}",
            params.temperature_celsius,
            params.disinfectant_ppm,
            params.duration_years,
            self.geometry,
            self.nodes,
            params.method
        );
        debug!("Disinfectant at water face: {disinfectant:e} mol/L");

        let system = self.build_system(params, coefficients);
        let scenario = Scenario::from_model(Box::new(system));
        let config = params.solver_configuration();

        let start = Instant::now();
        let outcome = params.method.solver().solve(&scenario, &config);
        let elapsed = start.elapsed();

        match outcome {
            Ok(trajectory) => {
                let stats = &trajectory.statistics;
                info!(
                    "Simulation finished in {:.2?}: {} steps ({} rejected), {} RHS evaluations, {} LU",
                    elapsed, stats.accepted_steps, stats.rejected_steps, stats.rhs_evaluations, stats.lu_decompositions
                );
                SimulationResult::completed(trajectory, self.nodes, params.clone(), antioxidant, disinfectant)
            }
            Err(e) => {
                warn!("Simulation failed after {elapsed:.2?}: {e}");
                SimulationResult::failed(self.nodes, params.clone(), antioxidant, disinfectant, e.to_string())
            }
        }
    }

    // ====================================== Post-processing ======================================

    /// OIT per node and output time using the material's initial OIT
    pub fn oit_profiles(&self, result: &SimulationResult) -> Array2<f64> {
        output::oit_profiles(result, self.material.initial_oit())
    }

    pub fn average_oit(&self, result: &SimulationResult) -> Array1<f64> {
        output::average_oit(result, self.material.initial_oit())
    }

    /// Saito molar mass per node and output time (kg/mol)
    pub fn molar_mass(&self, result: &SimulationResult) -> Array2<f64> {
        output::molar_mass_profiles(result, self.material.molar_mass())
    }

    pub fn interpolate_at_times(
        &self,
        result: &SimulationResult,
        targets_months: &[f64],
        quantity: DerivedQuantity,
    ) -> Array1<f64> {
        output::interpolate_at_times(result, self.material.initial_oit(), targets_months, quantity)
    }
}
