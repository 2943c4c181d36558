//! Gauss-Legendre quadrature over an arbitrary interval
//!
//! Nodes and weights come from the Golub-Welsch eigenvalue problem of the
//! Legendre Jacobi matrix, so any point count is available. A `p` point rule
//! integrates polynomials up to degree `2p - 1` exactly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use nalgebra::DMatrix;
use once_cell::sync::Lazy;

use crate::error::{FEAError, FEAResult};

// Rules by point count, built on first use
static RULES: Lazy<Mutex<HashMap<usize, Arc<GaussRule>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Nodes and weights of a Gauss-Legendre rule on [-1, 1]
#[derive(Debug, Clone)]
pub struct GaussRule {
    pub points: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GaussRule {
    /// Build the rule with `n` points
    pub fn legendre(n: usize) -> FEAResult<Self> {
        match n {
            0 => Err(FEAError::InvalidArgument(
                "Gauss rule needs at least one point".to_string(),
            )),
            1 => Ok(Self {
                points: vec![0.0],
                weights: vec![2.0],
            }),
            _ => {
                let mut jacobi = DMatrix::<f64>::zeros(n, n);
                for k in 1..n {
                    let kf = k as f64;
                    let beta = kf / (4.0 * kf * kf - 1.0).sqrt();
                    jacobi[(k - 1, k)] = beta;
                    jacobi[(k, k - 1)] = beta;
                }

                let eigen = jacobi.symmetric_eigen();
                let mut pairs: Vec<(f64, f64)> = (0..n)
                    .map(|i| {
                        let v0 = eigen.eigenvectors[(0, i)];
                        (eigen.eigenvalues[i], 2.0 * v0 * v0)
                    })
                    .collect();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

                let (points, weights) = pairs.into_iter().unzip();
                Ok(Self { points, weights })
            }
        }
    }

    /// Shared rule with `n` points, computed once per point count
    pub fn cached(n: usize) -> FEAResult<Arc<Self>> {
        let mut rules = RULES.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rule) = rules.get(&n) {
            return Ok(Arc::clone(rule));
        }
        let rule = Arc::new(Self::legendre(n)?);
        rules.insert(n, Arc::clone(&rule));
        Ok(rule)
    }
}

/// Fixed order 1D integrator over `[a, b]`
///
/// The integrand fills a caller-shaped scratch matrix at each point, so the
/// integration loop does not allocate per evaluation.
#[derive(Debug, Clone)]
pub struct GaussianIntegrator {
    pub a: f64,
    pub b: f64,
    pub points: usize,
}

impl GaussianIntegrator {
    pub fn new(a: f64, b: f64, points: usize) -> Self {
        Self { a, b, points }
    }

    fn mapped_rule(&self) -> FEAResult<Vec<(f64, f64)>> {
        let rule = GaussRule::cached(self.points)?;
        let half = (self.b - self.a) / 2.0;
        let mid = (self.b + self.a) / 2.0;
        Ok(rule
            .points
            .iter()
            .zip(rule.weights.iter())
            .map(|(&p, &w)| (mid + half * p, w * half))
            .collect())
    }

    /// Integrate a scalar valued function
    pub fn integrate_scalar<F>(&self, mut f: F) -> FEAResult<f64>
    where
        F: FnMut(f64) -> FEAResult<f64>,
    {
        if self.points == 0 {
            return Err(FEAError::InvalidArgument(
                "Gauss rule needs at least one point".to_string(),
            ));
        }
        if self.a == self.b {
            return Ok(0.0);
        }

        let mut sum = 0.0;
        for (x, w) in self.mapped_rule()? {
            sum += w * f(x)?;
        }
        Ok(sum)
    }

    /// Integrate a matrix (or `n x 1` vector) valued function
    ///
    /// `f(x, out)` writes the integrand at `x` into `out`, which arrives zeroed.
    pub fn integrate_matrix<F>(&self, rows: usize, cols: usize, mut f: F) -> FEAResult<DMatrix<f64>>
    where
        F: FnMut(f64, &mut DMatrix<f64>) -> FEAResult<()>,
    {
        if self.points == 0 {
            return Err(FEAError::InvalidArgument(
                "Gauss rule needs at least one point".to_string(),
            ));
        }

        let mut sum = DMatrix::zeros(rows, cols);
        if self.a == self.b {
            return Ok(sum);
        }

        let mut scratch = DMatrix::zeros(rows, cols);
        for (x, w) in self.mapped_rule()? {
            scratch.fill(0.0);
            f(x, &mut scratch)?;
            sum += &scratch * w;
        }
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rule_weights_sum_to_two() {
        for n in 1..=8 {
            let rule = GaussRule::legendre(n).unwrap();
            let total: f64 = rule.weights.iter().sum();
            assert_relative_eq!(total, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_two_point_rule_nodes() {
        let rule = GaussRule::legendre(2).unwrap();
        let p = 1.0 / 3.0_f64.sqrt();
        assert_relative_eq!(rule.points[0], -p, epsilon = 1e-12);
        assert_relative_eq!(rule.points[1], p, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_for_degree_2p_minus_1() {
        // x^5 over [0, 2] with three points
        let integrator = GaussianIntegrator::new(0.0, 2.0, 3);
        let value = integrator.integrate_scalar(|x| Ok(x.powi(5))).unwrap();
        assert_relative_eq!(value, 64.0 / 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_matrix_integrand() {
        let integrator = GaussianIntegrator::new(-1.0, 3.0, 2);
        let value = integrator
            .integrate_matrix(2, 1, |x, out| {
                out[(0, 0)] = 1.0;
                out[(1, 0)] = x;
                Ok(())
            })
            .unwrap();
        assert_relative_eq!(value[(0, 0)], 4.0, epsilon = 1e-12);
        assert_relative_eq!(value[(1, 0)], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_square_matrix_integrand() {
        // [[1, x], [x, x^2]] over [0, 3]
        let integrator = GaussianIntegrator::new(0.0, 3.0, 2);
        let value = integrator
            .integrate_matrix(2, 2, |x, out| {
                out[(0, 0)] = 1.0;
                out[(0, 1)] = x;
                out[(1, 0)] = x;
                out[(1, 1)] = x * x;
                Ok(())
            })
            .unwrap();
        assert_relative_eq!(value[(0, 0)], 3.0, epsilon = 1e-12);
        assert_relative_eq!(value[(0, 1)], 4.5, epsilon = 1e-12);
        assert_relative_eq!(value[(1, 0)], 4.5, epsilon = 1e-12);
        assert_relative_eq!(value[(1, 1)], 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cached_rule_is_shared() {
        let first = GaussRule::cached(5).unwrap();
        let second = GaussRule::cached(5).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.points, GaussRule::legendre(5).unwrap().points);
        assert!(GaussRule::cached(0).is_err());
    }

    #[test]
    fn test_degenerate_interval_skips_integrand() {
        let integrator = GaussianIntegrator::new(1.5, 1.5, 4);
        let mut calls = 0;
        let value = integrator
            .integrate_matrix(3, 2, |_, _| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(value.shape(), (3, 2));
        assert!(value.iter().all(|v| *v == 0.0));

        let scalar = integrator
            .integrate_scalar(|_| panic!("integrand must not run"))
            .unwrap();
        assert_eq!(scalar, 0.0);
    }

    #[test]
    fn test_zero_points_rejected() {
        let integrator = GaussianIntegrator::new(0.0, 1.0, 0);
        assert!(integrator.integrate_scalar(|x| Ok(x)).is_err());
    }
}
