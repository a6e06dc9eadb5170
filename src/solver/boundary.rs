//! Face conditions of the wall
//!
//! The wall is discretised on `[0, L]` with node 0 on the water side (face 0)
//! and node `nz − 1` on the outer side (face L). Each mobile species gets one
//! [`FaceCondition`] per face; immobile species only react at face nodes.
//!
//! | Geometry | Species | Face 0 | Face L |
//! |----------|---------|--------|--------|
//! | pipe | O2 | fixed at saturation | fixed at saturation |
//! | pipe | DOC | fixed at equilibrium | no flux |
//! | pipe | AH | extraction (β₀) | evaporation (β_L) |
//! | film | O2 | fixed at saturation | fixed at saturation |
//! | film | DOC | fixed at equilibrium | fixed at equilibrium |
//! | film | AH | extraction (β₀) | extraction (β₀) |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chemistry::{ExchangeCoefficient, ResolvedCoefficients};
use crate::error::DegradationError;
use crate::physics::{ConcentrationField, Species};

// =================================================================================================
// Exposure geometry
// =================================================================================================

/// Which faces see water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureGeometry {
    /// Water inside, air outside
    Pipe,
    /// Immersed film, water on both faces
    Film,
}

impl ExposureGeometry {
    pub fn name(&self) -> &'static str {
        match self {
            ExposureGeometry::Pipe => "pipe",
            ExposureGeometry::Film => "film",
        }
    }
}

impl fmt::Display for ExposureGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExposureGeometry {
    type Err = DegradationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pipe" => Ok(ExposureGeometry::Pipe),
            "film" => Ok(ExposureGeometry::Film),
            other => Err(DegradationError::Configuration(format!(
                "invalid geometry mode '{other}' (expected 'pipe' or 'film')"
            ))),
        }
    }
}

// =================================================================================================
// Face conditions
// =================================================================================================

/// Boundary treatment of one mobile species at one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceCondition {
    /// Concentration held at the given value (`dC/dt = 0`)
    Dirichlet(f64),
    /// First-order loss `−β·C` replacing diffusion, with β in 1/s
    Exchange(f64),
    /// Zero gradient, mirrored ghost node: `D·2(C_neighbour − C)/dz²`
    NoFlux,
}

/// Conditions of the three mobile species at one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBoundary {
    pub oxygen: FaceCondition,
    pub disinfectant: FaceCondition,
    pub antioxidant: FaceCondition,
}

impl FaceBoundary {
    /// Condition of `species`, `None` for immobile species
    pub fn condition(&self, species: Species) -> Option<FaceCondition> {
        match species {
            Species::Oxygen => Some(self.oxygen),
            Species::Disinfectant => Some(self.disinfectant),
            Species::Antioxidant => Some(self.antioxidant),
            _ => None,
        }
    }

    pub fn conditions(&self) -> [(Species, FaceCondition); 3] {
        [
            (Species::Oxygen, self.oxygen),
            (Species::Disinfectant, self.disinfectant),
            (Species::Antioxidant, self.antioxidant),
        ]
    }
}

/// Face selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Node 0, water side
    Inner,
    /// Node `nz − 1`
    Outer,
}

impl Face {
    /// Grid node of this face on an `nodes`-point grid
    pub fn node(self, nodes: usize) -> usize {
        match self {
            Face::Inner => 0,
            Face::Outer => nodes.saturating_sub(1),
        }
    }
}

/// Both faces of the wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBoundaries {
    pub inner: FaceBoundary,
    pub outer: FaceBoundary,
}

impl DomainBoundaries {
    /// Face conditions for `geometry`
    ///
    /// `oxygen` and `disinfectant` are the fixed face concentrations; exchange
    /// coefficients come from `coefficients`.
    pub fn for_geometry(
        geometry: ExposureGeometry,
        oxygen: f64,
        disinfectant: f64,
        coefficients: &ResolvedCoefficients,
    ) -> Self {
        let beta_water = coefficients.exchange(ExchangeCoefficient::Extraction);
        let inner = FaceBoundary {
            oxygen: FaceCondition::Dirichlet(oxygen),
            disinfectant: FaceCondition::Dirichlet(disinfectant),
            antioxidant: FaceCondition::Exchange(beta_water),
        };
        let outer = match geometry {
            ExposureGeometry::Pipe => FaceBoundary {
                oxygen: FaceCondition::Dirichlet(oxygen),
                disinfectant: FaceCondition::NoFlux,
                antioxidant: FaceCondition::Exchange(coefficients.exchange(ExchangeCoefficient::Evaporation)),
            },
            ExposureGeometry::Film => inner,
        };
        Self { inner, outer }
    }

    pub fn face(&self, face: Face) -> &FaceBoundary {
        match face {
            Face::Inner => &self.inner,
            Face::Outer => &self.outer,
        }
    }

    /// Writes the Dirichlet values into the face nodes of `field`
    pub fn apply_to(&self, field: &mut ConcentrationField) {
        let nodes = field.nodes();
        for face in [Face::Inner, Face::Outer] {
            for (species, condition) in self.face(face).conditions() {
                if let FaceCondition::Dirichlet(value) = condition {
                    field.set(species, face.node(nodes), value);
                }
            }
        }
    }
}

// =================================================================================================
// Disinfectant equilibrium
// =================================================================================================

/// Disinfectant concentration in the polymer at a water-contacting face
///
/// `S(T)·pd(T)·ppm` in the amorphous phase, scaled by the amorphous fraction.
/// Zero when `ppm ≤ 0`.
pub fn equilibrium_disinfectant_concentration(
    ppm: f64,
    coefficients: &ResolvedCoefficients,
    amorphous_fraction: f64,
) -> f64 {
    if ppm <= 0.0 {
        return 0.0;
    }
    coefficients.solubility() * coefficients.vapour_pressure() * ppm * amorphous_fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::CoefficientTables;

    fn coefficients() -> ResolvedCoefficients {
        CoefficientTables::default().resolve(313.15)
    }

    #[test]
    fn test_geometry_parsing() {
        assert_eq!("pipe".parse::<ExposureGeometry>().unwrap(), ExposureGeometry::Pipe);
        assert_eq!("film".parse::<ExposureGeometry>().unwrap(), ExposureGeometry::Film);
        let err = "tube".parse::<ExposureGeometry>().unwrap_err();
        assert!(matches!(err, DegradationError::Configuration(_)));
        assert!(err.to_string().contains("tube"));
    }

    #[test]
    fn test_pipe_faces() {
        let k = coefficients();
        let b = DomainBoundaries::for_geometry(ExposureGeometry::Pipe, 3.8e-4, 1e-6, &k);
        assert_eq!(b.inner.disinfectant, FaceCondition::Dirichlet(1e-6));
        assert_eq!(b.outer.disinfectant, FaceCondition::NoFlux);
        assert_eq!(b.outer.oxygen, FaceCondition::Dirichlet(3.8e-4));
        assert_eq!(b.inner.antioxidant, FaceCondition::Exchange(1.9e-9));
        assert_eq!(b.outer.antioxidant, FaceCondition::Exchange(1.0e-10));
        assert_eq!(b.inner.condition(Species::Carbonyl), None);
    }

    #[test]
    fn test_film_faces_are_symmetric() {
        let b = DomainBoundaries::for_geometry(ExposureGeometry::Film, 3.8e-4, 1e-6, &coefficients());
        assert_eq!(b.inner, b.outer);
    }

    #[test]
    fn test_apply_to_sets_dirichlet_nodes_only() {
        let b = DomainBoundaries::for_geometry(ExposureGeometry::Pipe, 3.8e-4, 2e-6, &coefficients());
        let mut field = ConcentrationField::zeros(5);
        b.apply_to(&mut field);
        assert_eq!(field.get(Species::Disinfectant, 0), 2e-6);
        assert_eq!(field.get(Species::Disinfectant, 4), 0.0);
        assert_eq!(field.get(Species::Oxygen, 4), 3.8e-4);
        assert_eq!(field.get(Species::Oxygen, 2), 0.0);
        assert_eq!(field.get(Species::Antioxidant, 0), 0.0);
    }

    #[test]
    fn test_equilibrium_concentration() {
        let k = coefficients();
        assert_eq!(equilibrium_disinfectant_concentration(0.0, &k, 0.55), 0.0);
        assert_eq!(equilibrium_disinfectant_concentration(-1.0, &k, 0.55), 0.0);

        let c1 = equilibrium_disinfectant_concentration(1.0, &k, 0.55);
        let c2 = equilibrium_disinfectant_concentration(2.0, &k, 0.55);
        assert!(c1 > 0.0);
        assert!((c2 - 2.0 * c1).abs() < 1e-15 * c2.abs().max(1.0));
        let expected = k.solubility() * k.vapour_pressure() * 0.55;
        assert!((c1 - expected).abs() <= 1e-12 * expected);
    }

    #[test]
    fn test_face_nodes() {
        assert_eq!(Face::Inner.node(50), 0);
        assert_eq!(Face::Outer.node(50), 49);
    }
}
