//! Error types
//!
//! Two families of failure exist in this crate:
//!
//! - [`DegradationError`]: problems with the *inputs* (model dimensions,
//!   geometry selector, configuration files). These abort before any
//!   integration starts.
//! - [`SolverError`]: the integrator could not reach the end of the requested
//!   interval. [`crate::models::DegradationModel::simulate`] folds these into
//!   an unsuccessful [`crate::models::SimulationResult`] instead of returning
//!   them.

use thiserror::Error;

/// Errors raised while building or configuring a model
#[derive(Debug, Error)]
pub enum DegradationError {
    /// Invalid model set-up (geometry selector, node count, thickness, method name)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A physical parameter outside its admissible range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Logger could not be installed (usually because one already is)
    #[error("logging error: {0}")]
    Logging(String),
}

/// Errors raised by the time integrators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("invalid solver configuration: {0}")]
    InvalidConfiguration(String),

    /// Step size dropped below the floating-point spacing at `time`
    #[error("required step size is less than spacing between numbers at t = {time:e}")]
    StepSizeTooSmall { time: f64 },

    /// Zero pivot met while factorising the Newton matrix
    #[error("singular iteration matrix (zero pivot in column {column})")]
    SingularMatrix { column: usize },

    #[error("maximum number of steps ({steps}) exceeded at t = {time:e}")]
    MaxStepsExceeded { steps: usize, time: f64 },

    #[error("state dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Integration stopped before every output time was sampled
    #[error("only {produced} of {expected} output samples were produced")]
    IncompleteOutput { produced: usize, expected: usize },

    /// Right-hand side produced NaN or infinite values
    #[error("non-finite derivative at t = {time:e}")]
    NonFinite { time: f64 },
}
