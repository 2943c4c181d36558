//! Result types for FEA analysis

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::elements::Dof;
use crate::loads::Force;

/// Translations and rotations of a node (or of a point along a bar)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl Displacement {
    pub fn new(dx: f64, dy: f64, dz: f64, rx: f64, ry: f64, rz: f64) -> Self {
        Self { dx, dy, dz, rx, ry, rz }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3], arr[4], arr[5])
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    pub fn from_vectors(translations: &Vector3<f64>, rotations: &Vector3<f64>) -> Self {
        Self::new(
            translations.x,
            translations.y,
            translations.z,
            rotations.x,
            rotations.y,
            rotations.z,
        )
    }

    pub fn translations(&self) -> Vector3<f64> {
        Vector3::new(self.dx, self.dy, self.dz)
    }

    pub fn rotations(&self) -> Vector3<f64> {
        Vector3::new(self.rx, self.ry, self.rz)
    }

    pub fn component(&self, dof: Dof) -> f64 {
        self.as_array()[dof.index()]
    }

    pub fn set_component(&mut self, dof: Dof, value: f64) {
        match dof {
            Dof::Dx => self.dx = value,
            Dof::Dy => self.dy = value,
            Dof::Dz => self.dz = value,
            Dof::Rx => self.rx = value,
            Dof::Ry => self.ry = value,
            Dof::Rz => self.rz = value,
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        self.translations().norm()
    }
}

impl Add for Displacement {
    type Output = Displacement;

    fn add(self, rhs: Displacement) -> Displacement {
        let (a, b) = (self.as_array(), rhs.as_array());
        Displacement::from_array(std::array::from_fn(|i| a[i] + b[i]))
    }
}

impl AddAssign for Displacement {
    fn add_assign(&mut self, rhs: Displacement) {
        *self = *self + rhs;
    }
}

impl Sub for Displacement {
    type Output = Displacement;

    fn sub(self, rhs: Displacement) -> Displacement {
        self + (-rhs)
    }
}

impl Neg for Displacement {
    type Output = Displacement;

    fn neg(self) -> Displacement {
        self * -1.0
    }
}

impl Mul<f64> for Displacement {
    type Output = Displacement;

    fn mul(self, factor: f64) -> Displacement {
        Displacement::from_array(self.as_array().map(|v| v * factor))
    }
}

/// Solution of one load case
///
/// All vectors have `6 * node_count` entries indexed by `6 * node + component`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Nodal displacements, settlements included at fixed DOFs
    pub displacements: Vec<f64>,
    /// Nodal forces: applied loads at free DOFs, support forces at fixed DOFs
    pub forces: Vec<f64>,
    /// Support reactions (fixed DOFs only, zero elsewhere), net of loads applied at the support
    pub reactions: Vec<f64>,
}

impl CaseResult {
    pub fn node_count(&self) -> usize {
        self.displacements.len() / 6
    }

    fn slice6(values: &[f64], node: usize) -> Option<[f64; 6]> {
        values
            .get(6 * node..6 * node + 6)
            .and_then(|s| s.try_into().ok())
    }

    pub fn node_displacement(&self, node: usize) -> Option<Displacement> {
        Self::slice6(&self.displacements, node).map(Displacement::from_array)
    }

    pub fn node_force(&self, node: usize) -> Option<Force> {
        Self::slice6(&self.forces, node).map(Force::from_array)
    }

    pub fn support_reaction(&self, node: usize) -> Option<Force> {
        Self::slice6(&self.reactions, node).map(Force::from_array)
    }
}

/// Summary of analysis results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Largest translation magnitude
    pub max_displacement: f64,
    /// Node with maximum displacement
    pub max_disp_node: usize,
    /// Largest reaction force magnitude
    pub max_reaction: f64,
    /// Node with maximum reaction
    pub max_reaction_node: usize,
    /// Sum of reaction forces (global X, Y, Z)
    pub total_reaction: [f64; 3],
    pub num_nodes: usize,
    pub num_elements: usize,
    /// Total DOFs
    pub total_dofs: usize,
    /// Free DOFs (unknown)
    pub free_dofs: usize,
}

impl AnalysisSummary {
    /// Summarise one case result
    pub fn from_result(result: &CaseResult, num_elements: usize, free_dofs: usize) -> Self {
        let mut summary = Self {
            max_displacement: 0.0,
            max_disp_node: 0,
            max_reaction: 0.0,
            max_reaction_node: 0,
            total_reaction: [0.0; 3],
            num_nodes: result.node_count(),
            num_elements,
            total_dofs: result.displacements.len(),
            free_dofs,
        };

        for node in 0..result.node_count() {
            if let Some(d) = result.node_displacement(node) {
                let m = d.translation_magnitude();
                if m > summary.max_displacement {
                    summary.max_displacement = m;
                    summary.max_disp_node = node;
                }
            }
            if let Some(r) = result.support_reaction(node) {
                let m = r.forces().norm();
                if m > summary.max_reaction {
                    summary.max_reaction = m;
                    summary.max_reaction_node = node;
                }
                summary.total_reaction[0] += r.fx;
                summary.total_reaction[1] += r.fy;
                summary.total_reaction[2] += r.fz;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_arithmetic() {
        let a = Displacement::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let b = a * 2.0 - a;
        assert_eq!(a, b);
        assert_eq!(a.component(Dof::Ry), 0.2);
        assert!((Displacement::new(3.0, 4.0, 0.0, 0.0, 0.0, 0.0).translation_magnitude() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_case_result_slicing() {
        let result = CaseResult {
            displacements: (0..12).map(|v| v as f64).collect(),
            forces: vec![0.0; 12],
            reactions: vec![1.0; 12],
        };
        assert_eq!(result.node_count(), 2);
        assert_eq!(result.node_displacement(1).unwrap().dx, 6.0);
        assert_eq!(result.support_reaction(0).unwrap().mz, 1.0);
        assert!(result.node_displacement(2).is_none());

        let summary = AnalysisSummary::from_result(&result, 1, 6);
        assert_eq!(summary.max_disp_node, 1);
        assert_eq!(summary.total_reaction, [2.0, 2.0, 2.0]);
    }
}
