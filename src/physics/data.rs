//! Concentration fields
//!
//! A [`ConcentrationField`] is the species × node matrix of concentrations at
//! one instant. Integrators see the same data as a flat node-major vector
//! (`node * SPECIES_COUNT + species`), which keeps all couplings of the
//! reaction–diffusion system within a band of half-width `SPECIES_COUNT`.

use nalgebra::{DMatrix, DVector};

use crate::physics::traits::{SPECIES_COUNT, Species};

/// Position of `(species, node)` in the flat state vector
#[inline]
pub const fn state_index(species: usize, node: usize) -> usize {
    node * SPECIES_COUNT + species
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationField {
    values: DMatrix<f64>,
}

impl ConcentrationField {
    /// All-zero field over `nodes` grid points
    pub fn zeros(nodes: usize) -> Self {
        Self { values: DMatrix::zeros(SPECIES_COUNT, nodes) }
    }

    /// Rebuilds a field from a node-major state vector
    ///
    /// Returns `None` when the length is not a multiple of the species count.
    pub fn from_state_vector(state: &DVector<f64>) -> Option<Self> {
        if state.len() % SPECIES_COUNT != 0 {
            return None;
        }
        let nodes = state.len() / SPECIES_COUNT;
        // column-major storage of a (species × nodes) matrix is exactly node-major
        Some(Self { values: DMatrix::from_column_slice(SPECIES_COUNT, nodes, state.as_slice()) })
    }

    pub fn to_state_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(self.values.as_slice())
    }

    pub fn nodes(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, species: Species, node: usize) -> f64 {
        self.values[(species.index(), node)]
    }

    pub fn set(&mut self, species: Species, node: usize, value: f64) {
        self.values[(species.index(), node)] = value;
    }

    /// Sets `species` to `value` at every node
    pub fn fill(&mut self, species: Species, value: f64) {
        self.values.row_mut(species.index()).fill(value);
    }

    /// Spatial profile of one species
    pub fn profile(&self, species: Species) -> Vec<f64> {
        self.values.row(species.index()).iter().copied().collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }
}
