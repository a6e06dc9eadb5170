//! Temperature-dependent coefficients
//!
//! Every rate, diffusion and boundary-exchange coefficient follows
//!
//! ```text
//! k(T) = A · exp(−Eₐ / (R·T))     if Eₐ > 0
//! k(T) = A                         otherwise
//! ```
//!
//! with `R = 8.314 J·mol⁻¹·K⁻¹`. Disinfectant solubility and vapour pressure
//! carry their own exponentials (see [`SolubilityParameters`]).
//!
//! [`CoefficientTables`] are immutable values. Resolving them at a temperature
//! is a pure function returning [`ResolvedCoefficients`]; callers that want to
//! skip recomputation keep a [`CoefficientCache`] of their own.

use serde::{Deserialize, Serialize};

use crate::physics::Species;

/// Universal gas constant (J·mol⁻¹·K⁻¹)
pub const GAS_CONSTANT: f64 = 8.314;

// =================================================================================================
// Arrhenius parameters
// =================================================================================================

/// Activation energy (J/mol) and pre-exponential factor of one coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusParameters {
    pub activation_energy: f64,
    pub pre_exponential: f64,
}

impl ArrheniusParameters {
    pub const fn new(activation_energy: f64, pre_exponential: f64) -> Self {
        Self { activation_energy, pre_exponential }
    }

    /// Coefficient value at `temperature` (K)
    pub fn evaluate(&self, temperature: f64) -> f64 {
        if self.activation_energy > 0.0 {
            self.pre_exponential * (-self.activation_energy / (GAS_CONSTANT * temperature)).exp()
        } else {
            self.pre_exponential
        }
    }

    /// Same activation energy, pre-exponential multiplied by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self { pre_exponential: self.pre_exponential * factor, ..self }
    }
}

// =================================================================================================
// Coefficient keys
// =================================================================================================

/// Elementary rate constants of the oxidation / disinfectant scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateConstant {
    /// Unimolecular POOH decomposition
    K1u,
    /// Bimolecular POOH decomposition
    K1b,
    /// Disinfectant attack on the backbone
    K1d,
    /// O2 addition to P•
    K2,
    /// H abstraction by PO2•
    K3,
    /// P• + P• termination
    K4,
    /// P• + disinfectant (chlorine grafting)
    K4d,
    /// P• + PO2• termination
    K5,
    /// PO2• + PO2• → caged pair
    K60,
    /// Cage coupling (crosslink)
    K61,
    /// Cage disproportionation (carbonyl)
    K62,
    /// Cage escape
    K63,
    /// PO2• scavenging by antioxidant
    K7,
    /// Antioxidant consumption by disinfectant
    K8d,
}

impl RateConstant {
    pub const COUNT: usize = 14;

    pub const ALL: [RateConstant; Self::COUNT] = [
        RateConstant::K1u,
        RateConstant::K1b,
        RateConstant::K1d,
        RateConstant::K2,
        RateConstant::K3,
        RateConstant::K4,
        RateConstant::K4d,
        RateConstant::K5,
        RateConstant::K60,
        RateConstant::K61,
        RateConstant::K62,
        RateConstant::K63,
        RateConstant::K7,
        RateConstant::K8d,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            RateConstant::K1u => "k1u",
            RateConstant::K1b => "k1b",
            RateConstant::K1d => "k1d",
            RateConstant::K2 => "k2",
            RateConstant::K3 => "k3",
            RateConstant::K4 => "k4",
            RateConstant::K4d => "k4d",
            RateConstant::K5 => "k5",
            RateConstant::K60 => "k60",
            RateConstant::K61 => "k61",
            RateConstant::K62 => "k62",
            RateConstant::K63 => "k63",
            RateConstant::K7 => "k7",
            RateConstant::K8d => "k8d",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// First-order antioxidant loss coefficients at the two faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeCoefficient {
    /// Extraction into water at the inner face (β₀)
    Extraction,
    /// Evaporation at the outer face (β_L)
    Evaporation,
}

impl ExchangeCoefficient {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Slot of a mobile species in the diffusion table
fn diffusion_slot(species: Species) -> Option<usize> {
    Species::MOBILE.iter().position(|s| *s == species)
}

// =================================================================================================
// Solubility
// =================================================================================================

/// Disinfectant solubility and vapour-pressure constants
///
/// ```text
/// S(T)  = S₀ · exp(−Eₛ / T)          Eₛ in K
/// pd(T) = pd₀ · exp(−Eₚ / (R·T))      Eₚ in J/mol
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolubilityParameters {
    pub solubility_prefactor: f64,
    pub solubility_temperature: f64,
    pub vapour_pressure_prefactor: f64,
    pub vapour_pressure_energy: f64,
}

impl SolubilityParameters {
    pub fn solubility(&self, temperature: f64) -> f64 {
        self.solubility_prefactor * (-self.solubility_temperature / temperature).exp()
    }

    pub fn vapour_pressure(&self, temperature: f64) -> f64 {
        self.vapour_pressure_prefactor
            * (-self.vapour_pressure_energy / (GAS_CONSTANT * temperature)).exp()
    }
}

impl Default for SolubilityParameters {
    fn default() -> Self {
        Self {
            solubility_prefactor: 2.6e-9,
            solubility_temperature: -2690.0,
            vapour_pressure_prefactor: 5.7e4,
            vapour_pressure_energy: 26440.0,
        }
    }
}

// =================================================================================================
// Coefficient tables
// =================================================================================================

/// The three coefficient families plus solubility constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTables {
    rates: [ArrheniusParameters; RateConstant::COUNT],
    diffusion: [ArrheniusParameters; 3],
    exchange: [ArrheniusParameters; 2],
    solubility: SolubilityParameters,
}

impl Default for CoefficientTables {
    fn default() -> Self {
        let p = ArrheniusParameters::new;
        Self {
            // same order as RateConstant::ALL
            rates: [
                p(140e3, 8.0e12),
                p(105e3, 2.8e9),
                p(0.0, 2.7e-5),
                p(0.0, 1.0e8),
                p(73e3, 1.5e10),
                p(0.0, 8.0e11),
                p(21.1e3, 6.6e9),
                p(5.9e3, 1.5e12),
                p(80e3, 4.9e19),
                p(0.0, 2.0e6),
                p(5e3, 1.2e6),
                p(17.4e3, 4.8e9),
                p(49.9e3, 1.3e9),
                p(0.0, 5.0e-2),
            ],
            // O2, DOC, AH (m²/s)
            diffusion: [p(35e3, 4.3e-5), p(0.0, 2.0e-11), p(115.7e3, 9.1e4)],
            // β₀, β_L (1/s)
            exchange: [p(0.0, 1.9e-9), p(0.0, 1.0e-10)],
            solubility: SolubilityParameters::default(),
        }
    }
}

impl CoefficientTables {
    pub fn rate(&self, key: RateConstant) -> ArrheniusParameters {
        self.rates[key.index()]
    }

    /// `None` for species that do not diffuse
    pub fn diffusion(&self, species: Species) -> Option<ArrheniusParameters> {
        diffusion_slot(species).map(|i| self.diffusion[i])
    }

    pub fn exchange(&self, key: ExchangeCoefficient) -> ArrheniusParameters {
        self.exchange[key.index()]
    }

    pub fn solubility(&self) -> &SolubilityParameters {
        &self.solubility
    }

    pub fn with_rate(mut self, key: RateConstant, params: ArrheniusParameters) -> Self {
        self.rates[key.index()] = params;
        self
    }

    pub fn with_scaled_rate(mut self, key: RateConstant, factor: f64) -> Self {
        self.rates[key.index()] = self.rates[key.index()].scaled(factor);
        self
    }

    /// Scales the diffusivity of a mobile species; immobile species are ignored
    pub fn with_scaled_diffusion(mut self, species: Species, factor: f64) -> Self {
        if let Some(i) = diffusion_slot(species) {
            self.diffusion[i] = self.diffusion[i].scaled(factor);
        }
        self
    }

    pub fn with_scaled_exchange(mut self, key: ExchangeCoefficient, factor: f64) -> Self {
        self.exchange[key.index()] = self.exchange[key.index()].scaled(factor);
        self
    }

    pub fn with_solubility(mut self, solubility: SolubilityParameters) -> Self {
        self.solubility = solubility;
        self
    }

    /// Evaluates every coefficient at `temperature` (K)
    pub fn resolve(&self, temperature: f64) -> ResolvedCoefficients {
        ResolvedCoefficients {
            temperature,
            rates: self.rates.map(|p| p.evaluate(temperature)),
            diffusion: self.diffusion.map(|p| p.evaluate(temperature)),
            exchange: self.exchange.map(|p| p.evaluate(temperature)),
            solubility: self.solubility.solubility(temperature),
            vapour_pressure: self.solubility.vapour_pressure(temperature),
        }
    }
}

// =================================================================================================
// Resolved coefficients
// =================================================================================================

/// All coefficients evaluated at a single temperature
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCoefficients {
    temperature: f64,
    rates: [f64; RateConstant::COUNT],
    diffusion: [f64; 3],
    exchange: [f64; 2],
    solubility: f64,
    vapour_pressure: f64,
}

impl ResolvedCoefficients {
    /// Temperature (K) these values belong to
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn rate(&self, key: RateConstant) -> f64 {
        self.rates[key.index()]
    }

    /// Diffusivity in m²/s, zero for immobile species
    pub fn diffusion(&self, species: Species) -> f64 {
        diffusion_slot(species).map_or(0.0, |i| self.diffusion[i])
    }

    pub fn exchange(&self, key: ExchangeCoefficient) -> f64 {
        self.exchange[key.index()]
    }

    /// Disinfectant solubility in the amorphous phase
    pub fn solubility(&self) -> f64 {
        self.solubility
    }

    pub fn vapour_pressure(&self) -> f64 {
        self.vapour_pressure
    }
}

// =================================================================================================
// Cache
// =================================================================================================

/// Memo of the last resolution
///
/// Hits only when both the temperature and the tables match the previous
/// call; otherwise all families are recomputed together.
#[derive(Debug, Default)]
pub struct CoefficientCache {
    last: Option<(CoefficientTables, ResolvedCoefficients)>,
    hits: usize,
    misses: usize,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, tables: &CoefficientTables, temperature: f64) -> &ResolvedCoefficients {
        let hit = matches!(
            &self.last,
            Some((cached, resolved)) if cached == tables && resolved.temperature == temperature
        );
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
            self.last = None;
        }
        &self
            .last
            .get_or_insert_with(|| (tables.clone(), tables.resolve(temperature)))
            .1
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
