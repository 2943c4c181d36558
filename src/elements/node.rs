//! Node element - represents a point in 3D space

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::Constraints;
use crate::loads::{Force, LoadCase, NodalLoad};
use crate::results::Displacement;

/// A 3D node in the finite element model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub location: Vector3<f64>,
    /// Support conditions; `Fixed` DOFs go to the fixed partition
    pub constraints: Constraints,
    /// Loads applied directly to the node, in global axes
    pub loads: Vec<NodalLoad>,
    /// Prescribed displacement of the fixed DOFs, applied in the settlement case
    pub settlements: Displacement,
    /// Optional label for reports
    pub label: Option<String>,
}

impl Node {
    /// Create a new, unrestrained node at the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            location: Vector3::new(x, y, z),
            constraints: Constraints::released(),
            loads: Vec::new(),
            settlements: Displacement::zero(),
            label: None,
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.location - self.location).norm()
    }

    /// Sum of this node's loads belonging to `case`
    pub fn total_load(&self, case: &LoadCase) -> Force {
        self.loads
            .iter()
            .filter(|l| &l.case == case)
            .fold(Force::zero(), |acc, l| acc + l.force)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_distance() {
        let n1 = Node::new(0.0, 0.0, 0.0);
        let n2 = Node::new(3.0, 4.0, 0.0);
        assert!((n1.distance_to(&n2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_total_load_filters_case() {
        let dead = LoadCase::dead("D");
        let live = LoadCase::live("L");
        let mut node = Node::new(0.0, 0.0, 0.0);
        node.loads.push(NodalLoad::force(1.0, 0.0, 0.0, dead.clone()));
        node.loads.push(NodalLoad::force(2.0, 0.0, 0.0, dead.clone()));
        node.loads.push(NodalLoad::force(0.0, 5.0, 0.0, live));

        let total = node.total_load(&dead);
        assert_eq!(total.fx, 3.0);
        assert_eq!(total.fy, 0.0);
    }
}
