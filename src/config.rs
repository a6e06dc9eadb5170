//! JSON model configuration
//!
//! ```json
//! {
//!   "thickness": 0.0004,
//!   "nodes": 50,
//!   "geometry": "film",
//!   "material": { "initial_oit": 291.07, "carbon_black": 0.018 },
//!   "kinetics": { "antioxidant_functionality": 4.0 }
//! }
//! ```
//!
//! Missing material and kinetic fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chemistry::{KineticParameters, MaterialInput, MaterialProperties};
use crate::error::DegradationError;
use crate::models::DegradationModel;
use crate::solver::ExposureGeometry;

/// Serialized form of a [`DegradationModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Wall or film thickness (m)
    pub thickness: f64,
    pub nodes: usize,
    /// `"pipe"` or `"film"`
    pub geometry: String,
    #[serde(default)]
    pub material: MaterialInput,
    #[serde(default)]
    pub kinetics: KineticParameters,
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DegradationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DegradationError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, DegradationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates everything and builds the model
    pub fn build(&self) -> Result<DegradationModel, DegradationError> {
        let geometry: ExposureGeometry = self.geometry.parse()?;
        let material = MaterialProperties::new(self.material)?;
        Ok(DegradationModel::new(self.thickness, self.nodes, geometry, material)?.with_kinetics(self.kinetics.clone()))
    }
}

impl From<&DegradationModel> for ModelConfig {
    fn from(model: &DegradationModel) -> Self {
        Self {
            thickness: model.thickness(),
            nodes: model.nodes(),
            geometry: model.geometry().name().to_string(),
            material: *model.material().input(),
            kinetics: model.kinetics().clone(),
        }
    }
}
