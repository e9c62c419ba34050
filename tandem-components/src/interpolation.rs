//! Natural cubic spline interpolation.
//!
//! The spline passes exactly through every sample and has continuous first
//! and second derivatives; the "natural" boundary condition sets the
//! second derivative to zero at both ends, so linear data is reproduced
//! without overshoot.

use ndarray::Array1;
use thiserror::Error;

/// Errors raised when constructing a [`CubicSpline`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplineError {
    #[error("at least 3 samples are required, got {len}")]
    TooFewSamples { len: usize },

    #[error("sample lengths differ: {x_len} x values, {y_len} y values")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("sample at index {index} is not finite")]
    NonFiniteSample { index: usize },

    #[error("x values must be strictly increasing (violated at index {index})")]
    NotStrictlyIncreasing { index: usize },
}

/// A natural cubic spline through strictly increasing samples.
///
/// Second derivatives at the knots are precomputed at construction with a
/// Thomas tridiagonal sweep, so evaluation is a segment lookup plus a
/// cubic polynomial.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Array1<f64>,
    y: Array1<f64>,
    second_derivatives: Array1<f64>,
}

impl CubicSpline {
    /// Builds a spline through the given samples.
    ///
    /// # Errors
    ///
    /// Returns a [`SplineError`] if fewer than 3 samples are given, the
    /// arrays differ in length, any sample is non-finite, or the x values
    /// are not strictly increasing.
    pub fn new(
        x: impl Into<Array1<f64>>,
        y: impl Into<Array1<f64>>,
    ) -> Result<Self, SplineError> {
        let x = x.into();
        let y = y.into();

        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.len() < 3 {
            return Err(SplineError::TooFewSamples { len: x.len() });
        }
        for i in 0..x.len() {
            if !x[i].is_finite() || !y[i].is_finite() {
                return Err(SplineError::NonFiniteSample { index: i });
            }
        }
        for i in 1..x.len() {
            if x[i] <= x[i - 1] {
                return Err(SplineError::NotStrictlyIncreasing { index: i });
            }
        }

        let second_derivatives = natural_second_derivatives(&x, &y);

        Ok(Self {
            x,
            y,
            second_derivatives,
        })
    }

    /// First sample position.
    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    /// Last sample position.
    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Evaluates the spline, clamping `at` to the sampled domain.
    #[must_use]
    pub fn evaluate(&self, at: f64) -> f64 {
        let n = self.x.len();
        let at = at.clamp(self.x[0], self.x[n - 1]);

        // Curves here hold a handful of samples, so a linear segment scan
        // beats maintaining a search structure.
        let mut seg = n - 2;
        for i in 0..n - 1 {
            if at <= self.x[i + 1] {
                seg = i;
                break;
            }
        }

        let (x0, x1) = (self.x[seg], self.x[seg + 1]);
        let (y0, y1) = (self.y[seg], self.y[seg + 1]);
        let (m0, m1) = (
            self.second_derivatives[seg],
            self.second_derivatives[seg + 1],
        );
        let h = x1 - x0;
        let a = x1 - at;
        let b = at - x0;

        (m0 * a * a * a + m1 * b * b * b) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

/// Solves the tridiagonal system for the natural-spline second derivatives
/// with a Thomas forward sweep and back substitution.
fn natural_second_derivatives(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let n = x.len();
    let mut m = Array1::zeros(n);
    let unknowns = n - 2;

    // Interior equations, indexed by k for the unknown m[k + 1]:
    //   h[k]·m[k] + 2(h[k] + h[k+1])·m[k+1] + h[k+1]·m[k+2] = rhs[k]
    // with m[0] = m[n-1] = 0 dropping the boundary terms.
    let mut sweep_upper = vec![0.0; unknowns];
    let mut sweep_rhs = vec![0.0; unknowns];

    for k in 0..unknowns {
        let h_lo = x[k + 1] - x[k];
        let h_hi = x[k + 2] - x[k + 1];
        let diag = 2.0 * (h_lo + h_hi);
        let rhs = 6.0 * ((y[k + 2] - y[k + 1]) / h_hi - (y[k + 1] - y[k]) / h_lo);

        if k == 0 {
            sweep_upper[k] = h_hi / diag;
            sweep_rhs[k] = rhs / diag;
        } else {
            let denom = diag - h_lo * sweep_upper[k - 1];
            sweep_upper[k] = h_hi / denom;
            sweep_rhs[k] = (rhs - h_lo * sweep_rhs[k - 1]) / denom;
        }
    }

    for k in (0..unknowns).rev() {
        m[k + 1] = sweep_rhs[k]
            - if k + 1 < unknowns {
                sweep_upper[k] * m[k + 2]
            } else {
                0.0
            };
    }

    m
}
