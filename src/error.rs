//! Error types for the static FEA engine

use thiserror::Error;

/// Main error type for FEA operations
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("Iso coordinate {0} is outside [-1, 1]")]
    OutOfRange(f64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    #[error("Node {0} not found in model")]
    NodeNotFound(usize),

    #[error("Element {0} not found in model")]
    ElementNotFound(usize),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Model not analyzed - run solve() first")]
    NotAnalyzed,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FEAError {
    /// True for errors raised by a caller passing a value outside an operation's contract
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange(_) | Self::InvalidArgument(_) | Self::NotSupported(_)
        )
    }
}

/// Result type for FEA operations
pub type FEAResult<T> = Result<T, FEAError>;

/// Reject iso coordinates outside the reference interval
pub(crate) fn check_iso(xi: f64) -> FEAResult<()> {
    if !(-1.0..=1.0).contains(&xi) {
        return Err(FEAError::OutOfRange(xi));
    }
    Ok(())
}
