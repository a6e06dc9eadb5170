//! Radau IIA solver (order 5)
//!
//! # Mathematical Background
//!
//! A three-stage fully implicit Runge–Kutta collocation method. The stage
//! increments `Zᵢ = Yᵢ − yₙ` satisfy
//!
//! ```text
//! Zᵢ = h · Σⱼ aᵢⱼ · f(tₙ + cⱼh, yₙ + Zⱼ)        i = 1, 2, 3
//! y_{n+1} = yₙ + Z₃                                (c₃ = 1)
//! ```
//!
//! The coupled `3n` system is solved by simplified Newton iterations with the
//! matrix `I − h·(A ⊗ J)`. Stages are interleaved per unknown
//! (`3·k + stage`), which keeps the matrix banded with half-bandwidth
//! `3·b + 2` when `J` has half-bandwidth `b`.
//!
//! The embedded error estimate (Hairer & Wanner, IV.8) costs one extra banded
//! solve with `γ/h·I − J`, `γ` being the real eigenvalue of `A⁻¹`. Dense
//! output is the cubic collocation polynomial.
//!
//! # Characteristics
//!
//! - **Order**: 5 (stiffly accurate, L-stable)
//! - **Cost**: one `3n` LU per step-size change; Jacobian refreshed when
//!   Newton contracts slowly

use log::debug;
use nalgebra::DVector;

use crate::error::SolverError;
use crate::solver::methods::banded::{BandedLu, BandedMatrix, numerical_jacobian};
use crate::solver::methods::common::{
    OdeFunction, OutputSampler, error_scale, min_step_size, rms_norm, select_initial_step,
};
use crate::solver::{Scenario, Solver, SolverConfiguration, SolverStatistics, Trajectory, validate_state};

const STAGES: usize = 3;
const NEWTON_MAXITER: usize = 6;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

const S6: f64 = 2.449_489_742_783_178;

/// Collocation nodes
const C: [f64; STAGES] = [(4.0 - S6) / 10.0, (4.0 + S6) / 10.0, 1.0];

/// Butcher matrix
const A: [[f64; STAGES]; STAGES] = [
    [(88.0 - 7.0 * S6) / 360.0, (296.0 - 169.0 * S6) / 1800.0, (-2.0 + 3.0 * S6) / 225.0],
    [(296.0 + 169.0 * S6) / 1800.0, (88.0 + 7.0 * S6) / 360.0, (-2.0 - 3.0 * S6) / 225.0],
    [(16.0 - S6) / 36.0, (16.0 + S6) / 36.0, 1.0 / 9.0],
];

/// Error estimator weights
const E: [f64; STAGES] = [(-13.0 - 7.0 * S6) / 3.0, (-13.0 + 7.0 * S6) / 3.0, -1.0 / 3.0];

/// Dense-output polynomial coefficients
const P: [[f64; STAGES]; STAGES] = [
    [13.0 / 3.0 + 7.0 * S6 / 3.0, -23.0 / 3.0 - 22.0 * S6 / 3.0, 10.0 / 3.0 + 5.0 * S6],
    [13.0 / 3.0 - 7.0 * S6 / 3.0, -23.0 / 3.0 + 22.0 * S6 / 3.0, 10.0 / 3.0 - 5.0 * S6],
    [1.0 / 3.0, -8.0 / 3.0, 10.0 / 3.0],
];

/// Real eigenvalue of `A⁻¹`: `3 + 3^(2/3) − 3^(1/3)`
fn mu_real() -> f64 {
    3.0 + 3f64.powf(2.0 / 3.0) - 3f64.powf(1.0 / 3.0)
}

// =================================================================================================
// Radau Solver
// =================================================================================================

/// Implicit Runge–Kutta solver for stiff systems
#[derive(Debug, Clone, Copy, Default)]
pub struct RadauSolver;

impl RadauSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for RadauSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<Trajectory, SolverError> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        // ====== Step 2: Setup ======

        let fun = OdeFunction::new(scenario.model.as_ref());
        let mut integrator = RadauIntegrator::new(fun, &scenario.initial_state, config);

        let mut sampler = OutputSampler::new(config.output_times());
        sampler.advance(0.0, |_| scenario.initial_state.clone());

        // ====== Step 3: Time Integration ======

        let mut attempts = 0;
        while integrator.t < config.total_time {
            integrator.step(config, &mut attempts)?;
            validate_state(&integrator.y, integrator.t)?;
            sampler.advance(integrator.t, |t| integrator.dense_output(t));
        }

        // ====== Step 4: Build Result ======

        let statistics = integrator.statistics();
        let (time_points, states) = sampler.finish()?;

        debug!(
            "Radau finished: {} steps ({} rejected), {} RHS evaluations, {} Jacobians, {} LU",
            statistics.accepted_steps,
            statistics.rejected_steps,
            statistics.rhs_evaluations,
            statistics.jacobian_evaluations,
            statistics.lu_decompositions
        );

        let mut result = Trajectory::new(time_points, states, statistics);
        result.add_metadata("solver", self.name());
        result.add_metadata("total time", &config.total_time.to_string());
        Ok(result)
    }

    fn name(&self) -> &str {
        "Radau"
    }
}

// =================================================================================================
// Integrator state
// =================================================================================================

/// Newton matrix factors, rebuilt together
struct Factorisations {
    /// `I − h·(A ⊗ J)` over interleaved stages
    newton: BandedLu,
    /// `γ/h·I − J` for the error estimate
    error: BandedLu,
}

/// Collocation polynomial of the last accepted step
struct DenseSegment {
    t_old: f64,
    h: f64,
    y_old: DVector<f64>,
    q: [DVector<f64>; STAGES],
}

impl DenseSegment {
    fn evaluate(&self, t: f64) -> DVector<f64> {
        let x = (t - self.t_old) / self.h;
        let mut y = self.y_old.clone();
        let mut p = 1.0;
        for q in &self.q {
            p *= x;
            y.axpy(p, q, 1.0);
        }
        y
    }
}

struct RadauIntegrator<'a> {
    fun: OdeFunction<'a>,
    t: f64,
    y: DVector<f64>,
    f: DVector<f64>,
    h_abs: f64,
    h_abs_old: Option<f64>,
    error_norm_old: Option<f64>,
    jac: BandedMatrix,
    current_jac: bool,
    lu: Option<Factorisations>,
    half_bandwidth: usize,
    newton_tol: f64,
    rtol: f64,
    atol: f64,
    segment: Option<DenseSegment>,
    stats: SolverStatistics,
}

impl<'a> RadauIntegrator<'a> {
    fn new(mut fun: OdeFunction<'a>, y0: &DVector<f64>, config: &SolverConfiguration) -> Self {
        let n = y0.len();
        let rtol = config.rtol.max(100.0 * f64::EPSILON);
        let atol = config.atol;

        let f = fun.eval(0.0, y0);
        let h_abs = config.first_step.unwrap_or_else(|| {
            select_initial_step(&mut fun, 0.0, y0, &f, config.total_time, 3, rtol, atol)
        });
        let half_bandwidth = fun.half_bandwidth(n);
        let jac = numerical_jacobian(&mut fun, 0.0, y0, &f, half_bandwidth, atol);

        Self {
            fun,
            t: 0.0,
            y: y0.clone(),
            f,
            h_abs,
            h_abs_old: None,
            error_norm_old: None,
            jac,
            current_jac: true,
            lu: None,
            half_bandwidth,
            newton_tol: (10.0 * f64::EPSILON / rtol).max(0.03f64.min(rtol.sqrt())),
            rtol,
            atol,
            segment: None,
            stats: SolverStatistics { jacobian_evaluations: 1, ..Default::default() },
        }
    }

    fn statistics(&self) -> SolverStatistics {
        SolverStatistics { rhs_evaluations: self.fun.evaluations(), ..self.stats }
    }

    fn dense_output(&self, t: f64) -> DVector<f64> {
        match &self.segment {
            Some(segment) => segment.evaluate(t),
            None => self.y.clone(),
        }
    }

    fn refresh_jacobian(&mut self, t: f64, y: &DVector<f64>, f: &DVector<f64>) {
        self.jac = numerical_jacobian(&mut self.fun, t, y, f, self.half_bandwidth, self.atol);
        self.stats.jacobian_evaluations += 1;
    }

    fn factor(&mut self, h: f64) -> Result<(), SolverError> {
        let newton = BandedLu::factor(&stage_matrix(&self.jac, h))?;
        let error = BandedLu::factor(&self.jac.shift_minus(mu_real() / h))?;
        self.lu = Some(Factorisations { newton, error });
        self.stats.lu_decompositions += 2;
        Ok(())
    }

    /// Advances by one accepted step
    fn step(&mut self, config: &SolverConfiguration, attempts: &mut usize) -> Result<(), SolverError> {
        let t = self.t;
        let n = self.y.len();
        let min_step = min_step_size(t);

        let (mut h_abs, mut h_abs_old, mut error_norm_old) = if self.h_abs > config.max_step {
            (config.max_step, None, None)
        } else if self.h_abs < min_step {
            (min_step, None, None)
        } else {
            (self.h_abs, self.h_abs_old, self.error_norm_old)
        };

        let mut rejected = false;

        let (t_new, y_new, z, n_iter, rate, error_norm, safety) = loop {
            *attempts += 1;
            if *attempts > config.max_steps {
                return Err(SolverError::MaxStepsExceeded { steps: config.max_steps, time: t });
            }
            if h_abs < min_step {
                return Err(SolverError::StepSizeTooSmall { time: t });
            }

            let t_new = (t + h_abs).min(config.total_time);
            let h = t_new - t;
            h_abs = h;

            let z0 = self.initial_guess(t, h);
            let scale = error_scale(&self.y, self.rtol, self.atol);

            // ====== Newton iterations ======

            let outcome = loop {
                if self.lu.is_none() {
                    self.factor(h)?;
                }
                let outcome = self.solve_collocation(t, h, &z0, &scale);
                if outcome.is_some() || self.current_jac {
                    break outcome;
                }
                let (y, f) = (self.y.clone(), self.f.clone());
                self.refresh_jacobian(t, &y, &f);
                self.current_jac = true;
                self.lu = None;
            };

            let Some((n_iter, z, rate)) = outcome else {
                h_abs *= 0.5;
                self.lu = None;
                self.stats.rejected_steps += 1;
                continue;
            };

            // ====== Error estimate ======

            let y_new = &self.y + stage(&z, STAGES - 1);
            let mut ze = DVector::zeros(n);
            for (s, weight) in E.iter().enumerate() {
                ze.axpy(weight / h, &stage(&z, s), 1.0);
            }

            let Some(lu) = self.lu.as_ref() else {
                continue;
            };
            let mut error = &self.f + &ze;
            lu.error.solve_in_place(&mut error);

            let scale = DVector::from_fn(n, |i, _| self.atol + self.y[i].abs().max(y_new[i].abs()) * self.rtol);
            let mut error_norm = rms_norm(&error, &scale);
            let safety = 0.9 * (2 * NEWTON_MAXITER + 1) as f64 / (2 * NEWTON_MAXITER + n_iter) as f64;

            if rejected && error_norm > 1.0 {
                let y_err = &self.y + &error;
                let mut refined = self.fun.eval(t, &y_err) + &ze;
                lu.error.solve_in_place(&mut refined);
                error_norm = rms_norm(&refined, &scale);
            }

            if error_norm > 1.0 {
                let factor = predict_factor(h_abs, h_abs_old, error_norm, error_norm_old);
                h_abs *= MIN_FACTOR.max(safety * factor);
                self.lu = None;
                rejected = true;
                self.stats.rejected_steps += 1;
                continue;
            }

            break (t_new, y_new, z, n_iter, rate, error_norm, safety);
        };

        // ====== Accept ======

        let recompute_jac = n_iter > 2 && rate.is_some_and(|r| r > 1e-3);

        let mut factor = predict_factor(h_abs, h_abs_old, error_norm, error_norm_old);
        factor = MAX_FACTOR.min(safety * factor);
        if !recompute_jac && factor < 1.2 {
            factor = 1.0;
        } else {
            self.lu = None;
        }

        let f_new = self.fun.eval(t_new, &y_new);
        if recompute_jac {
            self.refresh_jacobian(t_new, &y_new, &f_new);
            self.current_jac = true;
        } else {
            self.current_jac = false;
        }

        h_abs_old = Some(self.h_abs);
        error_norm_old = Some(error_norm);

        let q = std::array::from_fn(|k| {
            let mut qk = DVector::zeros(n);
            for (s, row) in P.iter().enumerate() {
                qk.axpy(row[k], &stage(&z, s), 1.0);
            }
            qk
        });
        let y_old = std::mem::replace(&mut self.y, y_new);
        self.segment = Some(DenseSegment { t_old: t, h: t_new - t, y_old, q });

        self.h_abs_old = h_abs_old;
        self.error_norm_old = error_norm_old;
        self.h_abs = h_abs * factor;
        self.t = t_new;
        self.f = f_new;
        self.stats.accepted_steps += 1;
        Ok(())
    }

    /// Stage increments extrapolated from the previous collocation polynomial
    fn initial_guess(&self, t: f64, h: f64) -> DVector<f64> {
        let n = self.y.len();
        let mut z = DVector::zeros(STAGES * n);
        if let Some(segment) = &self.segment {
            for (s, c) in C.iter().enumerate() {
                let ys = segment.evaluate(t + c * h);
                for i in 0..n {
                    z[STAGES * i + s] = ys[i] - self.y[i];
                }
            }
        }
        z
    }

    /// Simplified Newton on the collocation system
    ///
    /// Returns iteration count, interleaved stage increments and the last
    /// contraction rate, or `None` without convergence.
    fn solve_collocation(
        &mut self,
        t: f64,
        h: f64,
        z0: &DVector<f64>,
        scale: &DVector<f64>,
    ) -> Option<(usize, DVector<f64>, Option<f64>)> {
        let lu = self.lu.as_ref()?;
        let n = self.y.len();
        let stage_scale = DVector::from_fn(STAGES * n, |i, _| scale[i / STAGES]);

        let mut z = z0.clone();
        let mut dz_norm_old: Option<f64> = None;
        let mut f = [DVector::zeros(n), DVector::zeros(n), DVector::zeros(n)];

        for k in 0..NEWTON_MAXITER {
            for (s, fs) in f.iter_mut().enumerate() {
                let ys = &self.y + stage(&z, s);
                self.fun.eval_into(t + C[s] * h, &ys, fs);
            }
            if !f.iter().all(|fs| fs.iter().all(|v| v.is_finite())) {
                return None;
            }

            let mut dz = DVector::from_fn(STAGES * n, |idx, _| {
                let (i, s) = (idx / STAGES, idx % STAGES);
                let combined: f64 = (0..STAGES).map(|r| A[s][r] * f[r][i]).sum();
                h * combined - z[idx]
            });
            lu.newton.solve_in_place(&mut dz);
            let dz_norm = rms_norm(&dz, &stage_scale);

            let rate = dz_norm_old.map(|old| dz_norm / old);
            if let Some(r) = rate {
                if r >= 1.0 || r.powi((NEWTON_MAXITER - k) as i32) / (1.0 - r) * dz_norm > self.newton_tol {
                    return None;
                }
            }

            z += &dz;

            if dz_norm == 0.0 || rate.is_some_and(|r| r / (1.0 - r) * dz_norm < self.newton_tol) {
                return Some((k + 1, z, rate));
            }
            dz_norm_old = Some(dz_norm);
        }
        None
    }
}

/// Extracts stage `s` from an interleaved vector
fn stage(z: &DVector<f64>, s: usize) -> DVector<f64> {
    DVector::from_fn(z.len() / STAGES, |i, _| z[STAGES * i + s])
}

/// `I − h·(A ⊗ J)` with stages interleaved per unknown
fn stage_matrix(jac: &BandedMatrix, h: f64) -> BandedMatrix {
    let n = jac.size();
    let bw = STAGES * jac.lower().max(jac.upper()) + STAGES - 1;
    let mut m = BandedMatrix::identity(STAGES * n, bw, bw);
    for v in 0..n {
        let (first, last) = jac.row_span(v);
        for w in first..=last {
            let j_vw = jac.get(v, w);
            if j_vw == 0.0 {
                continue;
            }
            for s in 0..STAGES {
                for r in 0..STAGES {
                    let (row, col) = (STAGES * v + s, STAGES * w + r);
                    m.set(row, col, m.get(row, col) - h * A[s][r] * j_vw);
                }
            }
        }
    }
    m
}

/// Step-size factor from the current and previous error norms
fn predict_factor(h_abs: f64, h_abs_old: Option<f64>, error_norm: f64, error_norm_old: Option<f64>) -> f64 {
    let multiplier = match (h_abs_old, error_norm_old) {
        (Some(h_old), Some(e_old)) if error_norm != 0.0 => h_abs / h_old * (e_old / error_norm).powf(0.25),
        _ => 1.0,
    };
    multiplier.min(1.0) * error_norm.powf(-0.25)
}
