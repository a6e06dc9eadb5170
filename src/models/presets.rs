//! Reference configurations

use crate::chemistry::{MaterialInput, MaterialProperties};
use crate::error::DegradationError;
use crate::models::DegradationModel;
use crate::output::SUEZ_INITIAL_OIT;
use crate::solver::ExposureGeometry;

/// 400 µm PE100 film immersed on both sides, as aged on the SUEZ platform
///
/// `initial_oit` defaults to the measured 291.07 min when `None`.
pub fn suez_film_model(initial_oit: Option<f64>) -> Result<DegradationModel, DegradationError> {
    let material = MaterialProperties::new(MaterialInput {
        initial_oit: initial_oit.unwrap_or(SUEZ_INITIAL_OIT),
        carbon_black: 0.018,
        ..MaterialInput::default()
    })?;
    DegradationModel::new(0.4e-3, 50, ExposureGeometry::Film, material)
}

/// 4.5 mm pipe wall carrying water on the inside only
pub fn colin_pipe_model() -> Result<DegradationModel, DegradationError> {
    let material = MaterialProperties::new(MaterialInput {
        initial_oit: 165.0,
        carbon_black: 0.025,
        ..MaterialInput::default()
    })?;
    DegradationModel::new(4.5e-3, 100, ExposureGeometry::Pipe, material)
}
