//! Mathematical utilities for FEA calculations

pub mod integration;
pub mod polynomial;
pub mod sparse;
pub mod transform;

use nalgebra::{DMatrix, DVector, SMatrix};

pub use integration::{GaussRule, GaussianIntegrator};
pub use polynomial::Polynomial1D;
pub use sparse::{csc_mul_vec, csc_transpose_mul_vec, CholeskySolver, SparseMatrixBuilder};
pub use transform::TransformationManager;

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// 12x12 matrix for two-node bar stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;

/// Copy of row `row` of `m`
pub fn extract_row(m: &Mat, row: usize) -> Vec {
    m.row(row).transpose()
}

/// Multiply row `row` of `m` by `factor` in place
pub fn scale_row(m: &mut Mat, row: usize, factor: f64) {
    m.row_mut(row).scale_mut(factor);
}

/// Determinant of a small square matrix, `None` when it is not square
pub fn determinant(m: &Mat) -> Option<f64> {
    m.is_square().then(|| m.determinant())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_row_helpers() {
        let mut m = Mat::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        scale_row(&mut m, 1, 0.5);
        assert_relative_eq!(extract_row(&m, 1), Vec::from_vec(vec![1.5, 2.0]));
        assert_relative_eq!(determinant(&m).unwrap(), 1.0 * 2.0 - 2.0 * 1.5);
        assert!(determinant(&Mat::zeros(2, 3)).is_none());
    }
}
