//! Semicrystalline polymer properties

use serde::{Deserialize, Serialize};

use crate::error::DegradationError;

/// Raw material inputs, as found in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialInput {
    /// Initial weight-average molar mass (kg/mol)
    pub molar_mass: f64,
    /// Bulk density (g/cm³)
    pub density: f64,
    /// Amorphous-phase density (g/cm³)
    pub amorphous_density: f64,
    /// Crystalline mass fraction
    pub crystallinity: f64,
    /// OIT of the unaged material (min)
    pub initial_oit: f64,
    /// Carbon black mass fraction
    pub carbon_black: f64,
}

impl Default for MaterialInput {
    fn default() -> Self {
        Self {
            molar_mass: 150.0,
            density: 0.95,
            amorphous_density: 0.85,
            crystallinity: 0.45,
            initial_oit: 165.0,
            carbon_black: 0.02,
        }
    }
}

/// Material properties with cached derived fractions
///
/// Built through [`MaterialProperties::new`] (validated) or from a
/// [`MaterialInput`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaterialInput", into = "MaterialInput")]
pub struct MaterialProperties {
    input: MaterialInput,
    amorphous_fraction: f64,
    amorphous_volume_ratio: f64,
}

impl MaterialProperties {
    pub fn new(input: MaterialInput) -> Result<Self, DegradationError> {
        if !(0.0..1.0).contains(&input.crystallinity) {
            return Err(DegradationError::InvalidParameter(format!(
                "crystallinity must lie in [0, 1), got {}",
                input.crystallinity
            )));
        }
        if !(input.molar_mass > 0.0) {
            return Err(DegradationError::InvalidParameter(format!(
                "initial molar mass must be positive, got {}",
                input.molar_mass
            )));
        }
        if !(input.initial_oit >= 0.0) {
            return Err(DegradationError::InvalidParameter(format!(
                "initial OIT must be non-negative, got {}",
                input.initial_oit
            )));
        }

        let amorphous_fraction = 1.0 - input.crystallinity;
        let amorphous_volume_ratio = if input.amorphous_density > 1e-9 {
            (input.density / input.amorphous_density) * amorphous_fraction
        } else {
            amorphous_fraction
        };

        Ok(Self { input, amorphous_fraction, amorphous_volume_ratio })
    }

    pub fn molar_mass(&self) -> f64 {
        self.input.molar_mass
    }

    pub fn density(&self) -> f64 {
        self.input.density
    }

    pub fn amorphous_density(&self) -> f64 {
        self.input.amorphous_density
    }

    pub fn crystallinity(&self) -> f64 {
        self.input.crystallinity
    }

    pub fn initial_oit(&self) -> f64 {
        self.input.initial_oit
    }

    pub fn carbon_black(&self) -> f64 {
        self.input.carbon_black
    }

    /// Amorphous mass fraction `1 − Xc`
    pub fn amorphous_fraction(&self) -> f64 {
        self.amorphous_fraction
    }

    /// Amorphous volume per unit polymer volume `(ρ/ρa)·(1 − Xc)`
    pub fn amorphous_volume_ratio(&self) -> f64 {
        self.amorphous_volume_ratio
    }

    pub fn input(&self) -> &MaterialInput {
        &self.input
    }
}

impl Default for MaterialProperties {
    fn default() -> Self {
        let input = MaterialInput::default();
        Self {
            input,
            amorphous_fraction: 1.0 - input.crystallinity,
            amorphous_volume_ratio: input.density / input.amorphous_density * (1.0 - input.crystallinity),
        }
    }
}

impl TryFrom<MaterialInput> for MaterialProperties {
    type Error = DegradationError;

    fn try_from(input: MaterialInput) -> Result<Self, Self::Error> {
        Self::new(input)
    }
}

impl From<MaterialProperties> for MaterialInput {
    fn from(material: MaterialProperties) -> Self {
        material.input
    }
}
