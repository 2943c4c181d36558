//! Global stiffness assembly into free/fixed partitions

use log::debug;
use nalgebra_sparse::CscMatrix;
use rayon::prelude::*;

use super::{DofMap, DofSlot};
use crate::elements::{BarElement, Node};
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat12, SparseMatrixBuilder};

/// `K` split by the DOF partition; the fixed-free block is `Kfsᵀ`
#[derive(Debug, Clone)]
pub struct PartitionedStiffness {
    pub kff: CscMatrix<f64>,
    pub kfs: CscMatrix<f64>,
    pub kss: CscMatrix<f64>,
}

/// Global DOFs of a bar's 12 local entries
fn element_dofs(element: &BarElement, node_count: usize) -> FEAResult<[usize; 12]> {
    let mut dofs = [0usize; 12];
    for (end, &node) in element.nodes.iter().take(2).enumerate() {
        if node >= node_count {
            return Err(FEAError::NodeNotFound(node));
        }
        for c in 0..6 {
            dofs[6 * end + c] = 6 * node + c;
        }
    }
    Ok(dofs)
}

/// Assemble the partitioned global stiffness of `elements`
///
/// Element matrices are computed in parallel and scattered afterwards.
pub fn assemble(
    nodes: &[Node],
    elements: &[BarElement],
    dof_map: &DofMap,
) -> FEAResult<PartitionedStiffness> {
    let element_matrices: Vec<([usize; 12], Mat12)> = elements
        .par_iter()
        .map(|element| {
            let dofs = element_dofs(element, nodes.len())?;
            Ok((dofs, element.global_stiffness_matrix()?))
        })
        .collect::<FEAResult<_>>()?;

    let n_free = dof_map.free_count();
    let n_fixed = dof_map.fixed_count();
    let mut kff = SparseMatrixBuilder::square(n_free);
    let mut kfs = SparseMatrixBuilder::new(n_free, n_fixed);
    let mut kss = SparseMatrixBuilder::square(n_fixed);

    for (dofs, k) in &element_matrices {
        for (r, &gr) in dofs.iter().enumerate() {
            for (c, &gc) in dofs.iter().enumerate() {
                let value = k[(r, c)];
                if value == 0.0 {
                    continue;
                }
                match (dof_map.slot(gr), dof_map.slot(gc)) {
                    (Some(DofSlot::Free(i)), Some(DofSlot::Free(j))) => kff.add(i, j, value),
                    (Some(DofSlot::Free(i)), Some(DofSlot::Fixed(j))) => kfs.add(i, j, value),
                    (Some(DofSlot::Fixed(i)), Some(DofSlot::Fixed(j))) => kss.add(i, j, value),
                    // Fixed-free is the transpose of Kfs
                    (Some(DofSlot::Fixed(_)), Some(DofSlot::Free(_))) => {}
                    _ => {
                        return Err(FEAError::InvalidArgument(format!(
                            "DOF pair ({}, {}) outside the DOF map",
                            gr, gc
                        )))
                    }
                }
            }
        }
    }

    debug!(
        "Assembled {} elements: Kff {} nnz, Kfs {} nnz, Kss {} nnz",
        elements.len(),
        kff.nnz(),
        kfs.nnz(),
        kss.nnz()
    );

    Ok(PartitionedStiffness {
        kff: kff.to_csc(),
        kfs: kfs.to_csc(),
        kss: kss.to_csc(),
    })
}
