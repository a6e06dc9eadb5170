//! Pieces shared by the stiff integrators

use nalgebra::DVector;

use crate::error::SolverError;
use crate::physics::PhysicalModel;

/// Right-hand side with an evaluation counter
pub struct OdeFunction<'a> {
    model: &'a dyn PhysicalModel,
    evaluations: usize,
}

impl<'a> OdeFunction<'a> {
    pub fn new(model: &'a dyn PhysicalModel) -> Self {
        Self { model, evaluations: 0 }
    }

    pub fn eval_into(&mut self, t: f64, y: &DVector<f64>, out: &mut DVector<f64>) {
        self.evaluations += 1;
        self.model.compute_physics(t, y, out);
    }

    pub fn eval(&mut self, t: f64, y: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(y.len());
        self.eval_into(t, y, &mut out);
        out
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Jacobian half-bandwidth, dense when the model does not declare one
    pub fn half_bandwidth(&self, n: usize) -> usize {
        self.model.half_bandwidth().unwrap_or(n.saturating_sub(1))
    }
}

/// Root-mean-square norm of `x / scale`
pub fn rms_norm(x: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let sum: f64 = x.iter().zip(scale.iter()).map(|(v, s)| (v / s) * (v / s)).sum();
    (sum / x.len() as f64).sqrt()
}

/// `atol + rtol·|y|`
pub fn error_scale(y: &DVector<f64>, rtol: f64, atol: f64) -> DVector<f64> {
    y.map(|v| atol + rtol * v.abs())
}

/// Roughly ten ulps of `t`: steps below this cannot advance time
pub fn min_step_size(t: f64) -> f64 {
    10.0 * (t.abs() * f64::EPSILON).max(f64::MIN_POSITIVE)
}

/// Empirical initial step (Hairer, Nørsett & Wanner, II.4)
pub fn select_initial_step(
    fun: &mut OdeFunction<'_>,
    t0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    interval: f64,
    order: i32,
    rtol: f64,
    atol: f64,
) -> f64 {
    if y0.is_empty() {
        return interval;
    }
    let scale = error_scale(y0, rtol, atol);
    let d0 = rms_norm(y0, &scale);
    let d1 = rms_norm(f0, &scale);

    let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
    let h0 = h0.min(interval);

    let y1 = y0 + f0 * h0;
    let f1 = fun.eval(t0 + h0, &y1);
    let d2 = rms_norm(&(f1 - f0), &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order as f64 + 1.0))
    };

    (100.0 * h0).min(h1).min(interval)
}

/// Collects the solution at the requested output times as steps go by
pub struct OutputSampler {
    times: Vec<f64>,
    states: Vec<DVector<f64>>,
}

impl OutputSampler {
    pub fn new(times: Vec<f64>) -> Self {
        let states = Vec::with_capacity(times.len());
        Self { times, states }
    }

    /// Records every pending output time `≤ t` using `dense`
    pub fn advance(&mut self, t: f64, mut dense: impl FnMut(f64) -> DVector<f64>) {
        while let Some(&next) = self.times.get(self.states.len()) {
            if next > t {
                break;
            }
            self.states.push(dense(next));
        }
    }

    pub fn is_complete(&self) -> bool {
        self.states.len() == self.times.len()
    }

    /// Sampled times and states, once every output time is covered
    pub fn finish(self) -> Result<(Vec<f64>, Vec<DVector<f64>>), SolverError> {
        if !self.is_complete() {
            return Err(SolverError::IncompleteOutput { produced: self.states.len(), expected: self.times.len() });
        }
        Ok((self.times, self.states))
    }
}
