//! Free/fixed partition of the global DOF numbering

use serde::{Deserialize, Serialize};

use crate::elements::{Dof, Node};

/// Where a global DOF lives after partitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DofSlot {
    Free(usize),
    Fixed(usize),
}

/// Bijection between global DOFs `6 * node + component` and the free and
/// fixed partitions, each numbered contiguously from zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofMap {
    slots: Vec<DofSlot>,
    free_to_global: Vec<usize>,
    fixed_to_global: Vec<usize>,
}

impl DofMap {
    /// Number DOFs in node order: `Released` go to the free partition
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let total = 6 * nodes.len();
        let mut slots = Vec::with_capacity(total);
        let mut free_to_global = Vec::new();
        let mut fixed_to_global = Vec::new();

        for (n, node) in nodes.iter().enumerate() {
            for dof in Dof::ALL {
                let global = 6 * n + dof.index();
                if node.constraints.is_fixed(dof) {
                    slots.push(DofSlot::Fixed(fixed_to_global.len()));
                    fixed_to_global.push(global);
                } else {
                    slots.push(DofSlot::Free(free_to_global.len()));
                    free_to_global.push(global);
                }
            }
        }

        Self {
            slots,
            free_to_global,
            fixed_to_global,
        }
    }

    pub fn total_dofs(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free_to_global.len()
    }

    pub fn fixed_count(&self) -> usize {
        self.fixed_to_global.len()
    }

    pub fn slot(&self, global: usize) -> Option<DofSlot> {
        self.slots.get(global).copied()
    }

    pub fn slot_of(&self, node: usize, dof: Dof) -> Option<DofSlot> {
        self.slot(6 * node + dof.index())
    }

    /// Global DOF of free index `i`
    pub fn free_to_global(&self) -> &[usize] {
        &self.free_to_global
    }

    /// Global DOF of fixed index `i`
    pub fn fixed_to_global(&self) -> &[usize] {
        &self.fixed_to_global
    }

    /// Scatter partition vectors back into a full-length vector
    pub fn scatter(&self, free: &[f64], fixed: &[f64]) -> Vec<f64> {
        let mut full = vec![0.0; self.total_dofs()];
        for (i, &g) in self.free_to_global.iter().enumerate() {
            full[g] = free[i];
        }
        for (i, &g) in self.fixed_to_global.iter().enumerate() {
            full[g] = fixed[i];
        }
        full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Constraints;

    #[test]
    fn test_partition_is_a_bijection() {
        let nodes = vec![
            Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()),
            Node::new(1.0, 0.0, 0.0),
            Node::new(2.0, 0.0, 0.0).with_constraints(Constraints::pinned()),
        ];
        let map = DofMap::from_nodes(&nodes);

        assert_eq!(map.total_dofs(), 18);
        assert_eq!(map.fixed_count(), 9);
        assert_eq!(map.free_count(), 9);

        let mut seen = vec![0usize; 18];
        for &g in map.free_to_global().iter().chain(map.fixed_to_global()) {
            seen[g] += 1;
        }
        assert!(seen.iter().all(|&c| c == 1));

        for (i, &g) in map.free_to_global().iter().enumerate() {
            assert_eq!(map.slot(g), Some(DofSlot::Free(i)));
        }
        assert_eq!(map.slot_of(2, Dof::Dy), Some(DofSlot::Fixed(7)));
        assert_eq!(map.slot_of(2, Dof::Rx), Some(DofSlot::Free(6)));
    }
}
