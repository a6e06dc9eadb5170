//! Simulation results

use ndarray::{Array1, Array3, ArrayView1, ArrayView2, Axis, s};

use crate::models::params::{MONTHS_PER_YEAR, SECONDS_PER_YEAR, SimulationParams};
use crate::physics::{SPECIES_COUNT, Species, state_index};
use crate::solver::{SolverStatistics, Trajectory};

/// Outcome of [`crate::models::DegradationModel::simulate`]
///
/// `concentrations` is indexed `[species, node, time]`. When `success` is
/// false the time axis is empty and `message` says why.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub success: bool,
    /// Output times (s)
    pub times: Array1<f64>,
    pub concentrations: Array3<f64>,
    /// Initial antioxidant concentration actually used (mol/L), the OIT reference
    pub initial_antioxidant: f64,
    /// Disinfectant concentration imposed at water-contacting faces (mol/L)
    pub disinfectant_boundary: f64,
    pub params: SimulationParams,
    pub message: Option<String>,
    pub statistics: Option<SolverStatistics>,
}

impl SimulationResult {
    pub(crate) fn completed(
        trajectory: Trajectory,
        nodes: usize,
        params: SimulationParams,
        initial_antioxidant: f64,
        disinfectant_boundary: f64,
    ) -> Self {
        let states = &trajectory.states;
        let concentrations = Array3::from_shape_fn((SPECIES_COUNT, nodes, states.len()), |(s, z, k)| {
            states[k][state_index(s, z)]
        });
        Self {
            success: true,
            times: Array1::from(trajectory.time_points),
            concentrations,
            initial_antioxidant,
            disinfectant_boundary,
            params,
            message: None,
            statistics: Some(trajectory.statistics),
        }
    }

    pub(crate) fn failed(
        nodes: usize,
        params: SimulationParams,
        initial_antioxidant: f64,
        disinfectant_boundary: f64,
        message: String,
    ) -> Self {
        Self {
            success: false,
            times: Array1::zeros(0),
            concentrations: Array3::zeros((SPECIES_COUNT, nodes, 0)),
            initial_antioxidant,
            disinfectant_boundary,
            params,
            message: Some(message),
            statistics: None,
        }
    }

    pub fn times_years(&self) -> Array1<f64> {
        &self.times / SECONDS_PER_YEAR
    }

    pub fn times_months(&self) -> Array1<f64> {
        self.times_years() * MONTHS_PER_YEAR
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    pub fn nodes(&self) -> usize {
        self.concentrations.len_of(Axis(1))
    }

    /// History of one species, `[node, time]`
    pub fn species(&self, species: Species) -> ArrayView2<'_, f64> {
        self.concentrations.index_axis(Axis(0), species.index())
    }

    /// Spatial profile of one species at output `time_index`
    pub fn profile(&self, species: Species, time_index: usize) -> ArrayView1<'_, f64> {
        self.concentrations.slice(s![species.index(), .., time_index])
    }

    /// Smallest value reached by `species` anywhere, `None` on an empty result
    pub fn minimum(&self, species: Species) -> Option<f64> {
        self.species(species).iter().copied().reduce(f64::min)
    }
}
