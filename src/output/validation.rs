//! Comparison of simulated OIT against aging-platform measurements

use log::debug;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::postprocess::interpolate;

/// Initial OIT measured on the reference film before aging (min)
pub const SUEZ_INITIAL_OIT: f64 = 291.07;

/// Measured OIT series, times in months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSeries {
    pub label: String,
    pub times_months: Vec<f64>,
    pub oit: Vec<f64>,
}

impl ExperimentalSeries {
    pub fn new(label: impl Into<String>, times_months: Vec<f64>, oit: Vec<f64>) -> Self {
        Self { label: label.into(), times_months, oit }
    }

    /// 400 µm PE100 film in water at 40 °C
    pub fn suez_water() -> Self {
        Self::new(
            "H2O",
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 9.0],
            vec![271.07, 267.95, 258.70, 253.00, 248.03, 229.30],
        )
    }

    /// Same film in 0.05 ppm hypochlorous acid at 40 °C
    pub fn suez_hypochlorous() -> Self {
        Self::new(
            "HOCl",
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 6.0, 9.0],
            vec![271.07, 126.81, 61.44, 32.29, 23.82, 19.06, 9.07],
        )
    }

    pub fn len(&self) -> usize {
        self.times_months.len().min(self.oit.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Goodness-of-fit between observed and predicted values
///
/// Pairs containing NaN are skipped. `mape` is in percent and ignores
/// observations with `|obs| ≤ 1e-12`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

impl ValidationMetrics {
    pub fn compute(observed: &[f64], predicted: &[f64]) -> Self {
        let pairs: Vec<(f64, f64)> = observed
            .iter()
            .zip(predicted)
            .filter(|(o, p)| !o.is_nan() && !p.is_nan())
            .map(|(o, p)| (*o, *p))
            .collect();

        Self {
            r2: r_squared(&pairs),
            rmse: mean(pairs.iter().map(|(o, p)| (o - p).powi(2))).sqrt(),
            mae: mean(pairs.iter().map(|(o, p)| (o - p).abs())),
            mape: 100.0 * mean(pairs.iter().filter(|(o, _)| o.abs() > 1e-12).map(|(o, p)| ((o - p) / o).abs())),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

fn r_squared(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let obs_mean = mean(pairs.iter().map(|(o, _)| *o));
    let ss_res: f64 = pairs.iter().map(|(o, p)| (o - p).powi(2)).sum();
    let ss_tot: f64 = pairs.iter().map(|(o, _)| (o - obs_mean).powi(2)).sum();
    if ss_tot < 1e-12 { 0.0 } else { 1.0 - ss_res / ss_tot }
}

/// Simulated series sampled at the measurement times
#[derive(Debug, Clone)]
pub struct Comparison {
    pub label: String,
    pub predicted: Array1<f64>,
    /// `observed − predicted`
    pub residuals: Array1<f64>,
    pub metrics: ValidationMetrics,
}

/// Interpolates `sim_oit(sim_months)` at the measurement times and scores it
pub fn compare_with_reference(
    series: &ExperimentalSeries,
    sim_months: ArrayView1<'_, f64>,
    sim_oit: ArrayView1<'_, f64>,
) -> Comparison {
    let n = series.len();
    let predicted: Array1<f64> = series.times_months[..n]
        .iter()
        .map(|&t| interpolate(sim_months, sim_oit, t))
        .collect();
    let observed = Array1::from(series.oit[..n].to_vec());
    let residuals = &observed - &predicted;
    let metrics = ValidationMetrics::compute(&series.oit[..n], predicted.as_slice().unwrap_or(&[]));
    debug!(
        "{}: R2 = {:.4}, RMSE = {:.2} min, MAPE = {:.1}%",
        series.label, metrics.r2, metrics.rmse, metrics.mape
    );

    Comparison { label: series.label.clone(), predicted, residuals, metrics }
}
