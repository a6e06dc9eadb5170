//! Mock physical models for testing
//!
//! These models have known analytical solutions or invariants, making them
//! ideal for validating stiff solver accuracy.

#![allow(dead_code)]

use degrad_rs::physics::PhysicalModel;
use nalgebra::DVector;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay model: dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub points: usize,
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self { points, decay_rate }
    }

    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
}

impl PhysicalModel for ExponentialDecay {
    fn points(&self) -> usize {
        self.points
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>, derivative: &mut DVector<f64>) {
        derivative.zip_apply(state, |dy, y| *dy = -self.decay_rate * y);
    }

    fn half_bandwidth(&self) -> Option<usize> {
        Some(0)
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::from_element(self.points, 1.0)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Robertson: classic stiff chemical kinetics
// =================================================================================================

/// Robertson's three-species reaction system
///
/// ```text
/// y₁' = -0.04·y₁ + 1e4·y₂·y₃
/// y₂' =  0.04·y₁ - 1e4·y₂·y₃ - 3e7·y₂²
/// y₃' =  3e7·y₂²
/// ```
///
/// Total mass `y₁ + y₂ + y₃` is conserved.
pub struct Robertson;

impl PhysicalModel for Robertson {
    fn points(&self) -> usize {
        3
    }

    fn compute_physics(&self, _t: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
        let r1 = 0.04 * y[0];
        let r2 = 1e4 * y[1] * y[2];
        let r3 = 3e7 * y[1] * y[1];
        dy[0] = -r1 + r2;
        dy[1] = r1 - r2 - r3;
        dy[2] = r3;
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::from_vec(vec![1.0, 0.0, 0.0])
    }

    fn name(&self) -> &str {
        "Robertson"
    }
}

// =================================================================================================
// Heat equation with fixed ends
// =================================================================================================

/// `u_t = u_xx` on [0, 1] with `u = 0` at both ends, `u(x, 0) = sin(πx)`
///
/// Semi-discrete solution: `u(x, t) = sin(πx)·exp(-λt)` with
/// `λ = 4/dx²·sin²(π·dx/2)`.
pub struct HeatEquation {
    pub points: usize,
}

impl HeatEquation {
    pub fn new(points: usize) -> Self {
        Self { points }
    }

    pub fn spacing(&self) -> f64 {
        1.0 / (self.points - 1) as f64
    }

    /// Decay rate of the discrete fundamental mode
    pub fn eigenvalue(&self) -> f64 {
        let dx = self.spacing();
        4.0 / (dx * dx) * (std::f64::consts::PI * dx / 2.0).sin().powi(2)
    }
}

impl PhysicalModel for HeatEquation {
    fn points(&self) -> usize {
        self.points
    }

    fn compute_physics(&self, _t: f64, u: &DVector<f64>, du: &mut DVector<f64>) {
        let n = self.points;
        let inv_dx2 = 1.0 / self.spacing().powi(2);
        du[0] = 0.0;
        du[n - 1] = 0.0;
        for i in 1..n - 1 {
            du[i] = (u[i + 1] - 2.0 * u[i] + u[i - 1]) * inv_dx2;
        }
    }

    fn half_bandwidth(&self) -> Option<usize> {
        Some(1)
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        let dx = self.spacing();
        DVector::from_fn(self.points, |i, _| (std::f64::consts::PI * i as f64 * dx).sin())
    }

    fn name(&self) -> &str {
        "Heat Equation"
    }
}
