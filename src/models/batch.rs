//! Independent simulations run side by side
//!
//! Each simulation resolves its own coefficients, so workers share nothing
//! mutable. With the `parallel` feature the work is spread over the rayon
//! thread pool; results always come back in input order.

use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::models::{DegradationModel, SimulationParams, SimulationResult};

/// One model, many parameter sets
pub fn simulate_batch(model: &DegradationModel, params: &[SimulationParams]) -> Vec<SimulationResult> {
    info!("Batch of {} simulations on one model", params.len());

    #[cfg(feature = "parallel")]
    let results: Vec<SimulationResult> = params.par_iter().map(|p| model.simulate(p)).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<SimulationResult> = params.iter().map(|p| model.simulate(p)).collect();

    log_failures(&results);
    results
}

/// Distinct (model, parameters) pairs, e.g. perturbed coefficient tables
pub fn simulate_ensemble(runs: &[(DegradationModel, SimulationParams)]) -> Vec<SimulationResult> {
    info!("Ensemble of {} simulations", runs.len());

    #[cfg(feature = "parallel")]
    let results: Vec<SimulationResult> = runs.par_iter().map(|(m, p)| m.simulate(p)).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<SimulationResult> = runs.iter().map(|(m, p)| m.simulate(p)).collect();

    log_failures(&results);
    results
}

fn log_failures(results: &[SimulationResult]) {
    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        warn!("{failed}/{} simulations failed", results.len());
    }
}
