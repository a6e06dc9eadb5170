//! Chemistry: coefficients, reaction scheme and material data
//!
//! - **`arrhenius`**: coefficient tables and their resolution at a temperature
//! - **`kinetics`**: yields, initial concentrations and the local reaction rates
//! - **`material`**: semicrystalline polymer properties

pub mod arrhenius;
pub mod kinetics;
pub mod material;

pub use arrhenius::{
    ArrheniusParameters, CoefficientCache, CoefficientTables, ExchangeCoefficient, GAS_CONSTANT,
    RateConstant, ResolvedCoefficients, SolubilityParameters,
};
pub use kinetics::{InitialConcentrations, KineticParameters, ReactionScheme, Yields};
pub use material::{MaterialInput, MaterialProperties};
