//! Logger set-up
//!
//! The library itself only emits records through the `log` facade. Binaries,
//! benches and notebooks that want to see them call [`init_logging`] once.

use log::LevelFilter;
use simplelog::{ColorChoice, Config, ConfigBuilder, TermLogger, TerminalMode};

use crate::error::DegradationError;

/// Install a terminal logger at `level`
///
/// Fails if a global logger is already installed.
pub fn init_logging(level: LevelFilter) -> Result<(), DegradationError> {
    TermLogger::init(level, logger_config(), TerminalMode::Mixed, ColorChoice::Auto)
        .map_err(|e| DegradationError::Logging(e.to_string()))
}

fn logger_config() -> Config {
    ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Off)
        .build()
}
