//! Single variable polynomials used for shape functions, load severity
//! functions and curvature fitting

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};

/// Polynomial `c0 + c1 x + c2 x² + ...` with coefficients in ascending order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polynomial1D {
    coefficients: Vec<f64>,
}

impl Polynomial1D {
    /// Create from ascending coefficients
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// The zero polynomial
    pub fn zero() -> Self {
        Self::default()
    }

    /// Constant polynomial
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Linear polynomial `a + b x`
    pub fn linear(a: f64, b: f64) -> Self {
        Self::new(vec![a, b])
    }

    /// Ascending coefficients
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Degree, ignoring trailing zero coefficients (the zero polynomial has degree 0)
    pub fn degree(&self) -> usize {
        self.coefficients
            .iter()
            .rposition(|c| *c != 0.0)
            .unwrap_or(0)
    }

    /// Evaluate with Horner's scheme
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Derivative polynomial
    pub fn derivative(&self) -> Self {
        Self::new(
            self.coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, &c)| c * i as f64)
                .collect(),
        )
    }

    /// Evaluate the n-th derivative at `x` (n = 0 is the value)
    pub fn evaluate_derivative(&self, x: f64, n: usize) -> f64 {
        let mut p = self.clone();
        for _ in 0..n {
            p = p.derivative();
        }
        p.evaluate(x)
    }

    /// Indefinite integral with zero integration constant
    pub fn integral(&self) -> Self {
        let mut coefficients = Vec::with_capacity(self.coefficients.len() + 1);
        coefficients.push(0.0);
        coefficients.extend(
            self.coefficients
                .iter()
                .enumerate()
                .map(|(i, &c)| c / (i + 1) as f64),
        );
        Self::new(coefficients)
    }

    /// Evaluate the n-th indefinite integral at `x`, all integration constants zero
    pub fn evaluate_nth_integral(&self, n: usize, x: f64) -> f64 {
        let mut p = self.clone();
        for _ in 0..n {
            p = p.integral();
        }
        p.evaluate(x)
    }

    /// Least degree polynomial through the points `(xs[i], ys[i])`
    pub fn from_points(xs: &[f64], ys: &[f64]) -> FEAResult<Self> {
        if xs.len() != ys.len() {
            return Err(FEAError::InvalidArgument(format!(
                "interpolation needs as many ordinates as abscissae ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Ok(Self::zero());
        }

        let n = xs.len();
        let vandermonde = DMatrix::from_fn(n, n, |i, j| xs[i].powi(j as i32));
        let rhs = DVector::from_column_slice(ys);

        let coefficients = vandermonde.lu().solve(&rhs).ok_or_else(|| {
            FEAError::NumericalFailure("interpolation points are not distinct".to_string())
        })?;

        Ok(Self::new(coefficients.iter().copied().collect()))
    }
}
