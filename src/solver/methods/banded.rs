//! Banded linear algebra for the implicit integrators
//!
//! The Newton matrices of a node-major reaction–diffusion system only couple
//! unknowns closer than the species count, so they are stored and factorised
//! in band form. [`BandedLu`] is Gaussian elimination with partial pivoting
//! restricted to the band (the scheme of LAPACK `gbtrf`): pivoting can widen
//! the upper band by `lower`, which the factor storage accounts for.

use nalgebra::{DMatrix, DVector};

use crate::error::SolverError;
use crate::solver::methods::common::OdeFunction;

// =================================================================================================
// Band storage
// =================================================================================================

/// Square matrix with `lower` sub-diagonals and `upper` super-diagonals
///
/// Entry `(i, j)` lives in row `i`, column `j + lower - i` of the backing
/// matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedMatrix {
    n: usize,
    lower: usize,
    upper: usize,
    data: DMatrix<f64>,
}

impl BandedMatrix {
    pub fn zeros(n: usize, lower: usize, upper: usize) -> Self {
        Self { n, lower, upper, data: DMatrix::zeros(n, lower + upper + 1) }
    }

    pub fn identity(n: usize, lower: usize, upper: usize) -> Self {
        let mut m = Self::zeros(n, lower, upper);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn lower(&self) -> usize {
        self.lower
    }

    pub fn upper(&self) -> usize {
        self.upper
    }

    #[inline]
    pub fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && j + self.lower >= i && j <= i + self.upper
    }

    /// Zero outside the band
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if self.in_band(i, j) { self.data[(i, j + self.lower - i)] } else { 0.0 }
    }

    /// Silently ignores writes outside the band
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        if self.in_band(i, j) {
            self.data[(i, j + self.lower - i)] = value;
        }
    }

    /// Column range `[first, last]` of the band in row `i`
    #[inline]
    pub fn row_span(&self, i: usize) -> (usize, usize) {
        (i.saturating_sub(self.lower), (i + self.upper).min(self.n.saturating_sub(1)))
    }

    /// `I − c·self`
    pub fn identity_minus(&self, c: f64) -> BandedMatrix {
        let mut out = self.clone();
        out.data *= -c;
        for i in 0..self.n {
            out.data[(i, self.lower)] += 1.0;
        }
        out
    }

    /// `shift·I − self`
    pub fn shift_minus(&self, shift: f64) -> BandedMatrix {
        let mut out = self.clone();
        out.data *= -1.0;
        for i in 0..self.n {
            out.data[(i, self.lower)] += shift;
        }
        out
    }

    pub fn mul_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(self.n, |i, _| {
            let (first, last) = self.row_span(i);
            (first..=last).map(|j| self.get(i, j) * x[j]).sum()
        })
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.n, self.n, |i, j| self.get(i, j))
    }
}

// =================================================================================================
// LU factorisation
// =================================================================================================

/// LU factors of a [`BandedMatrix`] with row interchanges
#[derive(Debug, Clone)]
pub struct BandedLu {
    n: usize,
    lower: usize,
    upper: usize,
    /// U factor, `2·lower + upper + 1` wide: entry `(i, j)` at column `j + lower - i`
    factors: DMatrix<f64>,
    /// Elimination multipliers: `multipliers[(k, r)]` belongs to row `k + 1 + r`
    multipliers: DMatrix<f64>,
    pivots: Vec<usize>,
}

impl BandedLu {
    pub fn factor(matrix: &BandedMatrix) -> Result<Self, SolverError> {
        let n = matrix.n;
        let kl = matrix.lower;
        let ku = matrix.upper;
        let width = 2 * kl + ku + 1;

        let mut a = DMatrix::zeros(n, width);
        for i in 0..n {
            let (first, last) = matrix.row_span(i);
            for j in first..=last {
                a[(i, j + kl - i)] = matrix.get(i, j);
            }
        }
        let mut multipliers = DMatrix::zeros(n, kl.max(1));
        let mut pivots = vec![0; n];

        // valid for i - kl <= j <= i + kl + ku
        let at = |i: usize, j: usize| j + kl - i;

        for k in 0..n {
            let last_row = (k + kl).min(n - 1);
            let last_col = (k + kl + ku).min(n - 1);

            let mut p = k;
            let mut best = a[(k, at(k, k))].abs();
            for r in k + 1..=last_row {
                let v = a[(r, at(r, k))].abs();
                if v > best {
                    best = v;
                    p = r;
                }
            }
            if best == 0.0 || !best.is_finite() {
                return Err(SolverError::SingularMatrix { column: k });
            }
            pivots[k] = p;

            if p != k {
                for j in k..=last_col {
                    let tmp = a[(k, at(k, j))];
                    a[(k, at(k, j))] = a[(p, at(p, j))];
                    a[(p, at(p, j))] = tmp;
                }
            }

            let pivot = a[(k, at(k, k))];
            for r in k + 1..=last_row {
                let m = a[(r, at(r, k))] / pivot;
                multipliers[(k, r - k - 1)] = m;
                a[(r, at(r, k))] = 0.0;
                if m != 0.0 {
                    for j in k + 1..=last_col {
                        a[(r, at(r, j))] -= m * a[(k, at(k, j))];
                    }
                }
            }
        }

        Ok(Self { n, lower: kl, upper: ku, factors: a, multipliers, pivots })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Overwrites `b` with the solution of `A·x = b`
    pub fn solve_in_place(&self, b: &mut DVector<f64>) {
        let n = self.n;
        let kl = self.lower;
        let reach = kl + self.upper;

        for k in 0..n {
            let p = self.pivots[k];
            if p != k {
                b.swap_rows(k, p);
            }
            let bk = b[k];
            if bk != 0.0 {
                for r in k + 1..=(k + kl).min(n - 1) {
                    b[r] -= self.multipliers[(k, r - k - 1)] * bk;
                }
            }
        }

        for k in (0..n).rev() {
            let mut sum = b[k];
            for j in k + 1..=(k + reach).min(n - 1) {
                sum -= self.factors[(k, j + kl - k)] * b[j];
            }
            b[k] = sum / self.factors[(k, kl)];
        }
    }

    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();
        self.solve_in_place(&mut x);
        x
    }
}

// =================================================================================================
// Finite-difference Jacobian
// =================================================================================================

/// Banded forward-difference Jacobian of `fun` at `(t, y)`
///
/// Columns further apart than `2·half_bandwidth` never touch the same row,
/// so they are perturbed together: the cost is `2·half_bandwidth + 1`
/// evaluations regardless of the system size. Perturbations are
/// `√ε · max(|yⱼ|, threshold)`.
pub fn numerical_jacobian(
    fun: &mut OdeFunction<'_>,
    t: f64,
    y: &DVector<f64>,
    f0: &DVector<f64>,
    half_bandwidth: usize,
    threshold: f64,
) -> BandedMatrix {
    let n = y.len();
    let bw = half_bandwidth.min(n.saturating_sub(1));
    let groups = (2 * bw + 1).min(n).max(1);
    let sqrt_eps = f64::EPSILON.sqrt();

    let steps: Vec<f64> = y
        .iter()
        .map(|&yj| {
            let h = sqrt_eps * yj.abs().max(threshold);
            let h = if yj < 0.0 { -h } else { h };
            (yj + h) - yj
        })
        .collect();

    let mut jac = BandedMatrix::zeros(n, bw, bw);
    let mut perturbed = y.clone();
    let mut f = DVector::zeros(n);

    for group in 0..groups {
        perturbed.copy_from(y);
        for j in (group..n).step_by(groups) {
            perturbed[j] += steps[j];
        }
        fun.eval_into(t, &perturbed, &mut f);
        for j in (group..n).step_by(groups) {
            let first = j.saturating_sub(bw);
            let last = (j + bw).min(n - 1);
            for i in first..=last {
                jac.set(i, j, (f[i] - f0[i]) / steps[j]);
            }
        }
    }
    jac
}
