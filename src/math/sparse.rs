//! Sparse matrix utilities for the partitioned stiffness system
//!
//! Stiffness blocks are assembled as COO triplets, compressed to CSC and the
//! free-free block is factored once with a sparse Cholesky decomposition that
//! is then reused for every load case.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::error::{FEAError, FEAResult};

/// Sparse matrix builder using COO format
///
/// Duplicate entries are summed when the matrix is compressed.
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    nrows: usize,
    ncols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a builder for an `nrows x ncols` matrix
    pub fn new(nrows: usize, ncols: usize) -> Self {
        // Bar elements couple at most 12 DOFs, so ~24 entries per row is plenty
        Self {
            nrows,
            ncols,
            entries: Vec::with_capacity(nrows.max(ncols) * 24),
        }
    }

    /// Square builder
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Add a value (accumulates with earlier values at the same position)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored triplets (before duplicates are merged)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Compress to CSC
    pub fn to_csc(&self) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(self.nrows, self.ncols);
        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }
        CscMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.nrows, self.ncols);
        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }
        mat
    }
}

/// `y = A x`
pub fn csc_mul_vec(a: &CscMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    debug_assert_eq!(a.ncols(), x.len());
    let mut y = DVector::zeros(a.nrows());

    let col_offsets = a.col_offsets();
    let row_indices = a.row_indices();
    let values = a.values();

    for col in 0..a.ncols() {
        let xc = x[col];
        if xc == 0.0 {
            continue;
        }
        for idx in col_offsets[col]..col_offsets[col + 1] {
            y[row_indices[idx]] += values[idx] * xc;
        }
    }
    y
}

/// `y = Aᵀ x`
pub fn csc_transpose_mul_vec(a: &CscMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    debug_assert_eq!(a.nrows(), x.len());
    let mut y = DVector::zeros(a.ncols());

    let col_offsets = a.col_offsets();
    let row_indices = a.row_indices();
    let values = a.values();

    for col in 0..a.ncols() {
        let mut sum = 0.0;
        for idx in col_offsets[col]..col_offsets[col + 1] {
            sum += values[idx] * x[row_indices[idx]];
        }
        y[col] = sum;
    }
    y
}

/// Diagonal of a square CSC matrix (missing entries read as zero)
pub fn csc_diagonal(a: &CscMatrix<f64>) -> DVector<f64> {
    let mut diag = DVector::zeros(a.nrows().min(a.ncols()));
    let col_offsets = a.col_offsets();
    let row_indices = a.row_indices();
    let values = a.values();

    for col in 0..diag.len() {
        for idx in col_offsets[col]..col_offsets[col + 1] {
            if row_indices[idx] == col {
                diag[col] += values[idx];
            }
        }
    }
    diag
}

/// Factored symmetric positive definite matrix, reusable for many right-hand sides
pub struct CholeskySolver {
    size: usize,
    factor: CscCholesky<f64>,
    min_pivot_ratio: f64,
}

impl std::fmt::Debug for CholeskySolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CholeskySolver")
            .field("size", &self.size)
            .field("nnz_l", &self.factor.l().nnz())
            .field("min_pivot_ratio", &self.min_pivot_ratio)
            .finish()
    }
}

impl CholeskySolver {
    /// Symbolic + numeric factorization of `a`
    ///
    /// A non-positive diagonal, a failed factorization or a pivot ratio
    /// `L_jj² / A_jj` below `pivot_tolerance` are reported as
    /// [`FEAError::NumericalFailure`]; they mean the structure is a mechanism
    /// or is not connected to its supports.
    pub fn factor(a: &CscMatrix<f64>, pivot_tolerance: f64) -> FEAResult<Self> {
        if a.nrows() != a.ncols() {
            return Err(FEAError::InvalidArgument(format!(
                "Cholesky needs a square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        let size = a.nrows();
        if size == 0 {
            return Err(FEAError::InvalidArgument(
                "Cholesky of an empty matrix".to_string(),
            ));
        }

        let diag = csc_diagonal(a);
        if let Some(j) = diag.iter().position(|d| !(*d > 0.0)) {
            return Err(FEAError::NumericalFailure(format!(
                "free DOF {} has no positive stiffness (diagonal = {})",
                j, diag[j]
            )));
        }

        let factor = CscCholesky::factor(a).map_err(|e| {
            FEAError::NumericalFailure(format!(
                "stiffness matrix is not positive definite ({:?})",
                e
            ))
        })?;

        let l = factor.l();
        let mut min_pivot_ratio = f64::INFINITY;
        let mut worst = 0;
        for j in 0..size {
            let col = l.col(j);
            let l_jj = match col.row_indices().first() {
                Some(&r) if r == j => col.values()[0],
                _ => 0.0,
            };
            let ratio = l_jj * l_jj / diag[j];
            if ratio < min_pivot_ratio {
                min_pivot_ratio = ratio;
                worst = j;
            }
        }

        if !(min_pivot_ratio >= pivot_tolerance) {
            return Err(FEAError::NumericalFailure(format!(
                "pivot ratio {:.3e} at free DOF {} is below tolerance {:.3e}",
                min_pivot_ratio, worst, pivot_tolerance
            )));
        }
        if min_pivot_ratio < pivot_tolerance * 1e3 {
            log::warn!(
                "Ill-conditioned stiffness: pivot ratio {:.3e} at free DOF {}",
                min_pivot_ratio,
                worst
            );
        }

        Ok(Self {
            size,
            factor,
            min_pivot_ratio,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Smallest `L_jj² / A_jj` seen during factorization
    pub fn min_pivot_ratio(&self) -> f64 {
        self.min_pivot_ratio
    }

    /// Non-zeros of the lower factor
    pub fn factor_nnz(&self) -> usize {
        self.factor.l().nnz()
    }

    /// Solve `A x = b` with the stored factor
    pub fn solve(&self, b: &DVector<f64>) -> FEAResult<DVector<f64>> {
        if b.len() != self.size {
            return Err(FEAError::InvalidArgument(format!(
                "right-hand side has {} entries, factor has {}",
                b.len(),
                self.size
            )));
        }
        let rhs = DMatrix::from_column_slice(self.size, 1, b.as_slice());
        let x = self.factor.solve(&rhs);
        Ok(DVector::from_column_slice(x.as_slice()))
    }
}
