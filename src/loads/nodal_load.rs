//! Node loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

use super::{Force, LoadCase};

/// A load applied directly to a node, in global axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodalLoad {
    pub force: Force,
    pub case: LoadCase,
}

impl NodalLoad {
    pub fn new(force: Force, case: LoadCase) -> Self {
        Self { force, case }
    }

    /// Create a force-only node load
    pub fn force(fx: f64, fy: f64, fz: f64, case: LoadCase) -> Self {
        Self::new(Force::new(fx, fy, fz, 0.0, 0.0, 0.0), case)
    }

    /// Create a moment-only node load
    pub fn moment(mx: f64, my: f64, mz: f64, case: LoadCase) -> Self {
        Self::new(Force::new(0.0, 0.0, 0.0, mx, my, mz), case)
    }

    /// Scale the load by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.force * factor, self.case.clone())
    }
}
