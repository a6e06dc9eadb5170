//! Oxidation and disinfectant-attack reaction scheme
//!
//! Local (per-node) production rates of the twelve species. Transport is
//! added on top by [`crate::models::DegradationSystem`].
//!
//! # Scheme
//!
//! ```text
//! POOH        → 2P• + PH + S + γco·CO            k1u
//! 2 POOH      → P• + PO2• + S + γco·CO           k1b
//! DOC + PH    → P•                               k1d
//! P• + O2     → PO2•                             k2
//! PO2• + PH   → POOH + P•                        k3
//! P• + P•     → γ4·X + (1 − γ4)·PH               k4
//! P• + DOC    → PCl                              k4d
//! P• + PO2•   → γ5·X + (1 − γ5)·POOH             k5
//! PO2• + PO2• → Q + O2                           k60
//! Q           → X                                k61
//! Q           → CO + PH                          k62
//! Q           → 2P• + 2S + 2γco·CO               k63
//! PO2• + AH   → inactive                         k7   (n per AH)
//! DOC + AH    → inactive                         k8d  (n per AH)
//! ```

use serde::{Deserialize, Serialize};

use crate::chemistry::arrhenius::{CoefficientTables, RateConstant, ResolvedCoefficients};
use crate::physics::SPECIES_COUNT;

/// Fractional product yields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Yields {
    /// Scissions per POOH decomposition (γ1s)
    pub scission: f64,
    /// Carbonyls per POOH decomposition (γ1co)
    pub carbonyl: f64,
    /// Crosslink fraction of P• + P• (γ4)
    pub coupling_crosslink: f64,
    /// Crosslink fraction of P• + PO2• (γ5)
    pub peroxy_crosslink: f64,
}

impl Default for Yields {
    fn default() -> Self {
        Self { scission: 1.0, carbonyl: 0.61, coupling_crosslink: 0.5, peroxy_crosslink: 0.0 }
    }
}

/// Initial and reference concentrations (mol/L)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConcentrations {
    pub polymer: f64,
    pub hydroperoxide: f64,
    /// Oxygen in equilibrium with air
    pub oxygen_saturation: f64,
    pub antioxidant: f64,
}

impl Default for InitialConcentrations {
    fn default() -> Self {
        Self { polymer: 60.0, hydroperoxide: 1e-2, oxygen_saturation: 3.8e-4, antioxidant: 1.8e-3 }
    }
}

/// Everything the kinetic scheme needs apart from temperature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticParameters {
    pub tables: CoefficientTables,
    pub yields: Yields,
    pub initial: InitialConcentrations,
    /// Radicals trapped per antioxidant molecule
    pub antioxidant_functionality: f64,
}

impl Default for KineticParameters {
    fn default() -> Self {
        Self {
            tables: CoefficientTables::default(),
            yields: Yields::default(),
            initial: InitialConcentrations::default(),
            antioxidant_functionality: 4.0,
        }
    }
}

impl KineticParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(mut self, tables: CoefficientTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_yields(mut self, yields: Yields) -> Self {
        self.yields = yields;
        self
    }

    pub fn with_initial_concentrations(mut self, initial: InitialConcentrations) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_antioxidant_functionality(mut self, functionality: f64) -> Self {
        self.antioxidant_functionality = functionality;
        self
    }

    /// Binds the scheme to coefficients resolved at one temperature
    pub fn scheme(&self, coefficients: &ResolvedCoefficients) -> ReactionScheme {
        ReactionScheme::new(coefficients, self.yields, self.antioxidant_functionality)
    }
}

// =================================================================================================
// Reaction scheme
// =================================================================================================

/// Rate constants at a fixed temperature, ready for repeated evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionScheme {
    k1u: f64,
    k1b: f64,
    k1d: f64,
    k2: f64,
    k3: f64,
    k4: f64,
    k4d: f64,
    k5: f64,
    k60: f64,
    k61: f64,
    k62: f64,
    k63: f64,
    k7: f64,
    k8d: f64,
    yields: Yields,
    functionality: f64,
}

impl ReactionScheme {
    pub fn new(coefficients: &ResolvedCoefficients, yields: Yields, functionality: f64) -> Self {
        let k = |key| coefficients.rate(key);
        Self {
            k1u: k(RateConstant::K1u),
            k1b: k(RateConstant::K1b),
            k1d: k(RateConstant::K1d),
            k2: k(RateConstant::K2),
            k3: k(RateConstant::K3),
            k4: k(RateConstant::K4),
            k4d: k(RateConstant::K4d),
            k5: k(RateConstant::K5),
            k60: k(RateConstant::K60),
            k61: k(RateConstant::K61),
            k62: k(RateConstant::K62),
            k63: k(RateConstant::K63),
            k7: k(RateConstant::K7),
            k8d: k(RateConstant::K8d),
            yields,
            functionality,
        }
    }

    /// Net chemical production of each species at one node
    ///
    /// `c` holds the node's concentrations in species order.
    pub fn rates(&self, c: &[f64]) -> [f64; SPECIES_COUNT] {
        let (o2, doc, ah, p, po2, pooh, ph, q) = (c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]);
        let Yields { scission: y1s, carbonyl: y1co, coupling_crosslink: y4, peroxy_crosslink: y5 } =
            self.yields;
        let n = self.functionality;

        // reaction velocities
        let r1u = self.k1u * pooh;
        let r1b = self.k1b * pooh * pooh;
        let r1d = self.k1d * doc * ph;
        let r2 = self.k2 * o2 * p;
        let r3 = self.k3 * ph * po2;
        let r4 = self.k4 * p * p;
        let r4d = self.k4d * p * doc;
        let r5 = self.k5 * p * po2;
        let r60 = self.k60 * po2 * po2;
        let r61 = self.k61 * q;
        let r62 = self.k62 * q;
        let r63 = self.k63 * q;
        let r7 = n * self.k7 * po2 * ah;
        let r8d = n * self.k8d * doc * ah;

        [
            -r2 + r60,
            -r1d - r4d - r8d,
            -r8d - r7,
            r1d + 2.0 * r1u + r1b - r2 + r3 - 2.0 * r4 - r4d - r5 + 2.0 * r63,
            r1b + r2 - r3 - r5 - 2.0 * r60 - r7,
            -r1u - 2.0 * r1b + r3 + (1.0 - y5) * r5,
            -r1d - (2.0 + y1s) * r1u - (1.0 + y1s) * r1b - r3
                + 2.0 * y4 * r4
                + (3.0 * y5 - 1.0) * r5
                + 2.0 * r61
                - 2.0 * (1.0 + y1s) * r63,
            r60 - r61 - r62 - r63,
            y1co * r1u + y1co * r1b + r62 + 2.0 * y1co * r63,
            r4d,
            y1s * r1u + y1s * r1b + 2.0 * y1s * r63,
            y4 * r4 + y5 * r5 + r61,
        ]
    }
}
