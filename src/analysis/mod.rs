//! Analysis options, DOF partitioning, assembly and the linear static solver

mod assembly;
mod dof_map;
mod linear;

pub use assembly::{assemble, PartitionedStiffness};
pub use dof_map::{DofMap, DofSlot};
pub use linear::StaticLinearAnalysisResult;

use serde::{Deserialize, Serialize};

use crate::error::FEAResult;
use crate::loads::LoadCase;

/// Options for linear static analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Smallest accepted `L_jj² / Kff_jj` after factorization
    pub pivot_tolerance: f64,
    /// Solve several load cases on the rayon pool
    pub parallel: bool,
    /// Load cases solved right after factorization (None = none)
    pub load_cases: Option<Vec<LoadCase>>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            pivot_tolerance: 1e-12,
            parallel: true,
            load_cases: None,
        }
    }
}

impl AnalysisOptions {
    /// Set the pivot tolerance
    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Solve cases one after another
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Cases to solve eagerly
    pub fn with_load_cases(mut self, cases: Vec<LoadCase>) -> Self {
        self.load_cases = Some(cases);
        self
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> FEAResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let opts = AnalysisOptions::from_json(
            r#"{"parallel": false, "load_cases": [{"name": "D", "load_type": "Dead"}]}"#,
        )
        .unwrap();
        assert!(!opts.parallel);
        assert_eq!(opts.pivot_tolerance, 1e-12);
        assert_eq!(opts.load_cases, Some(vec![LoadCase::dead("D")]));

        assert!(AnalysisOptions::from_json("{\"parallel\": 3}").is_err());
    }
}
