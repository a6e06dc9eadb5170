//! Core physics traits and species definitions

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::DegradationError;

// =================================================================================================
// Species
// =================================================================================================

/// Number of chemical species tracked at every node
pub const SPECIES_COUNT: usize = 12;

/// Chemical species of the degradation scheme
///
/// The declaration order is the storage order: `Species::Oxygen.index() == 0`
/// through `Species::Crosslink.index() == 11`. Every array in the crate indexed
/// by species uses this order.
///
/// | Index | Symbol | Meaning |
/// |-------|--------|---------|
/// | 0 | O2 | dissolved oxygen |
/// | 1 | DOC | dissolved chlorine-based disinfectant |
/// | 2 | AH | phenolic antioxidant |
/// | 3 | P | alkyl radical |
/// | 4 | PO2 | peroxy radical |
/// | 5 | POOH | hydroperoxide |
/// | 6 | PH | polymer backbone (abstractable C–H) |
/// | 7 | Q | caged radical pair |
/// | 8 | CO | carbonyl |
/// | 9 | PCl | grafted chlorine |
/// | 10 | S | chain scissions |
/// | 11 | X | crosslinks |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Oxygen,
    Disinfectant,
    Antioxidant,
    AlkylRadical,
    PeroxyRadical,
    Hydroperoxide,
    PolymerBackbone,
    CagedPair,
    Carbonyl,
    GraftedChlorine,
    ChainScission,
    Crosslink,
}

impl Species {
    /// All species in storage order
    pub const ALL: [Species; SPECIES_COUNT] = [
        Species::Oxygen,
        Species::Disinfectant,
        Species::Antioxidant,
        Species::AlkylRadical,
        Species::PeroxyRadical,
        Species::Hydroperoxide,
        Species::PolymerBackbone,
        Species::CagedPair,
        Species::Carbonyl,
        Species::GraftedChlorine,
        Species::ChainScission,
        Species::Crosslink,
    ];

    /// Species that diffuse through the wall
    pub const MOBILE: [Species; 3] = [Species::Oxygen, Species::Disinfectant, Species::Antioxidant];

    /// Position of the species in every per-node block
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short chemical symbol
    pub const fn name(self) -> &'static str {
        match self {
            Species::Oxygen => "O2",
            Species::Disinfectant => "DOC",
            Species::Antioxidant => "AH",
            Species::AlkylRadical => "P",
            Species::PeroxyRadical => "PO2",
            Species::Hydroperoxide => "POOH",
            Species::PolymerBackbone => "PH",
            Species::CagedPair => "Q",
            Species::Carbonyl => "CO",
            Species::GraftedChlorine => "PCl",
            Species::ChainScission => "S",
            Species::Crosslink => "X",
        }
    }

    /// Look a species up by its chemical symbol
    pub fn from_name(name: &str) -> Option<Species> {
        Species::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn from_index(index: usize) -> Option<Species> {
        Species::ALL.get(index).copied()
    }

    /// True for oxygen, disinfectant and antioxidant
    pub const fn is_mobile(self) -> bool {
        matches!(self, Species::Oxygen | Species::Disinfectant | Species::Antioxidant)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Species {
    type Err = DegradationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::from_name(s)
            .ok_or_else(|| DegradationError::InvalidParameter(format!("unknown species '{s}'")))
    }
}

/// Symbol → index table, for debugging and ad-hoc inspection
pub fn species_index_table() -> HashMap<&'static str, usize> {
    Species::ALL.iter().map(|s| (s.name(), s.index())).collect()
}

// =================================================================================================
// Physical Model Trait
// =================================================================================================

/// Trait for physical models
///
/// # Responsibility
/// Evaluates the right-hand side `f(t, y)` of the semi-discrete system
/// `dy/dt = f(t, y)`. Does NOT integrate it (that's the Solver's job).
///
/// The model provides the "physics" (reactions, diffusion stencils, face
/// conditions), the Solver provides the "numerics".
///
/// # State layout
/// The state vector is flat. Models with several variables per grid point
/// store them node-major (`node * variables + variable`) and report the
/// coupling width through [`PhysicalModel::half_bandwidth`] so implicit
/// solvers can exploit the banded Jacobian.
pub trait PhysicalModel: Send + Sync {
    /// Number of spatial points
    fn points(&self) -> usize;

    /// Number of unknowns per spatial point
    fn variables_per_point(&self) -> usize {
        1
    }

    /// Length of the flat state vector
    fn dimension(&self) -> usize {
        self.points() * self.variables_per_point()
    }

    /// Writes `dy/dt` evaluated at `(t, state)` into `derivative`
    ///
    /// `derivative` has the same length as `state`; every entry must be
    /// overwritten.
    fn compute_physics(&self, t: f64, state: &DVector<f64>, derivative: &mut DVector<f64>);

    /// Largest `|i - j|` for which `∂f_i/∂y_j` can be non-zero
    ///
    /// `None` means a dense Jacobian.
    fn half_bandwidth(&self) -> Option<usize> {
        None
    }

    /// Creates the initial state for this physical model
    fn setup_initial_state(&self) -> DVector<f64>;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Tests
// =================================================================================================
