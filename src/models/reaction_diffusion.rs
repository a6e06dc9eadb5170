//! Semi-discrete reaction–diffusion system of the wall
//!
//! # Equations
//!
//! For each species `s` and interior node `i`:
//!
//! ```text
//! dCₛ,ᵢ/dt = Dₛ · (Cₛ,ᵢ₊₁ − 2Cₛ,ᵢ + Cₛ,ᵢ₋₁) / dz² + Rₛ(Cᵢ)
//! ```
//!
//! with `Dₛ = 0` for immobile species and `Rₛ` from
//! [`crate::chemistry::ReactionScheme`]. At the two face nodes the diffusion
//! term of each mobile species is replaced according to its
//! [`FaceCondition`].

use nalgebra::DVector;

use crate::chemistry::{ReactionScheme, ResolvedCoefficients};
use crate::physics::{ConcentrationField, PhysicalModel, SPECIES_COUNT, Species};
use crate::solver::{DomainBoundaries, FaceBoundary, FaceCondition};

/// Right-hand side of the degradation model at one temperature
#[derive(Debug, Clone)]
pub struct DegradationSystem {
    nodes: usize,
    spacing: f64,
    scheme: ReactionScheme,
    /// Per species, zero for immobile ones
    diffusion: [f64; SPECIES_COUNT],
    boundaries: DomainBoundaries,
    initial: ConcentrationField,
}

impl DegradationSystem {
    /// `initial` must cover `nodes ≥ 3` grid points spaced `spacing` apart
    pub fn new(
        spacing: f64,
        scheme: ReactionScheme,
        coefficients: &ResolvedCoefficients,
        boundaries: DomainBoundaries,
        initial: ConcentrationField,
    ) -> Self {
        let diffusion = Species::ALL.map(|s| coefficients.diffusion(s));
        Self { nodes: initial.nodes(), spacing, scheme, diffusion, boundaries, initial }
    }

    pub fn boundaries(&self) -> &DomainBoundaries {
        &self.boundaries
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    fn apply_face(
        &self,
        face: &FaceBoundary,
        y: &[f64],
        node: usize,
        neighbour: usize,
        rates: &mut [f64; SPECIES_COUNT],
    ) {
        let inv_dz2 = 1.0 / (self.spacing * self.spacing);
        for (species, condition) in face.conditions() {
            let i = species.index();
            let c = y[node * SPECIES_COUNT + i];
            rates[i] = match condition {
                FaceCondition::Dirichlet(_) => 0.0,
                FaceCondition::Exchange(beta) => rates[i] - beta * c,
                FaceCondition::NoFlux => {
                    let c_next = y[neighbour * SPECIES_COUNT + i];
                    rates[i] + self.diffusion[i] * 2.0 * (c_next - c) * inv_dz2
                }
            };
        }
    }
}

impl PhysicalModel for DegradationSystem {
    fn points(&self) -> usize {
        self.nodes
    }

    fn variables_per_point(&self) -> usize {
        SPECIES_COUNT
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>, derivative: &mut DVector<f64>) {
        let y = state.as_slice();
        let out = derivative.as_mut_slice();
        let last = self.nodes - 1;
        let inv_dz2 = 1.0 / (self.spacing * self.spacing);

        for node in 0..self.nodes {
            let base = node * SPECIES_COUNT;
            let mut rates = self.scheme.rates(&y[base..base + SPECIES_COUNT]);

            if node == 0 {
                self.apply_face(&self.boundaries.inner, y, node, 1, &mut rates);
            } else if node == last {
                self.apply_face(&self.boundaries.outer, y, node, last - 1, &mut rates);
            } else {
                for species in Species::MOBILE {
                    let i = base + species.index();
                    let laplacian = y[i + SPECIES_COUNT] - 2.0 * y[i] + y[i - SPECIES_COUNT];
                    rates[species.index()] += self.diffusion[species.index()] * laplacian * inv_dz2;
                }
            }

            out[base..base + SPECIES_COUNT].copy_from_slice(&rates);
        }
    }

    fn half_bandwidth(&self) -> Option<usize> {
        Some(SPECIES_COUNT)
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        self.initial.to_state_vector()
    }

    fn name(&self) -> &str {
        "PE wall degradation"
    }

    fn description(&self) -> Option<&str> {
        Some("12-species oxidation and disinfectant attack with O2/DOC/AH diffusion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::KineticParameters;
    use crate::physics::state_index;
    use crate::solver::ExposureGeometry;

    fn system(geometry: ExposureGeometry, nodes: usize, doc: f64) -> DegradationSystem {
        let kinetics = KineticParameters::new();
        let k = kinetics.tables.resolve(313.15);
        let boundaries = DomainBoundaries::for_geometry(geometry, 3.8e-4, doc, &k);
        let mut field = ConcentrationField::zeros(nodes);
        field.fill(Species::Oxygen, 3.8e-4);
        field.fill(Species::Antioxidant, 1.8e-3);
        field.fill(Species::PolymerBackbone, 60.0);
        boundaries.apply_to(&mut field);
        DegradationSystem::new(1e-3 / (nodes - 1) as f64, kinetics.scheme(&k), &k, boundaries, field)
    }

    fn derivative(sys: &DegradationSystem) -> DVector<f64> {
        let y = sys.setup_initial_state();
        let mut dy = DVector::zeros(y.len());
        sys.compute_physics(0.0, &y, &mut dy);
        dy
    }

    #[test]
    fn test_dirichlet_faces_are_frozen() {
        let sys = system(ExposureGeometry::Pipe, 6, 1e-6);
        let dy = derivative(&sys);
        assert_eq!(dy[state_index(Species::Oxygen.index(), 0)], 0.0);
        assert_eq!(dy[state_index(Species::Disinfectant.index(), 0)], 0.0);
        assert_eq!(dy[state_index(Species::Oxygen.index(), 5)], 0.0);
    }

    #[test]
    fn test_disinfectant_diffuses_from_the_face() {
        let sys = system(ExposureGeometry::Pipe, 6, 1e-6);
        let dy = derivative(&sys);
        assert!(dy[state_index(Species::Disinfectant.index(), 1)] > 0.0);
        assert_eq!(dy[state_index(Species::Disinfectant.index(), 3)], 0.0);
    }

    #[test]
    fn test_antioxidant_exchange_at_faces() {
        let sys = system(ExposureGeometry::Pipe, 6, 0.0);
        let dy = derivative(&sys);
        let inner = dy[state_index(Species::Antioxidant.index(), 0)];
        let outer = dy[state_index(Species::Antioxidant.index(), 5)];
        assert!((inner + 1.9e-9 * 1.8e-3).abs() < 1e-20);
        assert!((outer + 1.0e-10 * 1.8e-3).abs() < 1e-20);
        assert_eq!(dy[state_index(Species::Antioxidant.index(), 2)], 0.0);
    }

    #[test]
    fn test_film_derivative_is_mirror_symmetric() {
        let sys = system(ExposureGeometry::Film, 7, 1e-6);
        let dy = derivative(&sys);
        for s in 0..SPECIES_COUNT {
            for node in 0..7 {
                let a = dy[state_index(s, node)];
                let b = dy[state_index(s, 6 - node)];
                assert!((a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1e-30));
            }
        }
    }

    #[test]
    fn test_bandwidth_and_dimension() {
        let sys = system(ExposureGeometry::Pipe, 5, 0.0);
        assert_eq!(sys.dimension(), 5 * SPECIES_COUNT);
        assert_eq!(sys.half_bandwidth(), Some(SPECIES_COUNT));
    }
}
