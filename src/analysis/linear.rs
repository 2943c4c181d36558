//! Linear static solve with a factor-once stiffness and a per-case result store

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{debug, info, trace};
use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;
use rayon::prelude::*;

use super::{assemble, AnalysisOptions, DofMap};
use crate::error::{FEAError, FEAResult};
use crate::loads::{Force, LoadCase};
use crate::math::{csc_mul_vec, csc_transpose_mul_vec, CholeskySolver};
use crate::model::Model;
use crate::results::CaseResult;

type CaseSlot = Arc<Mutex<Option<Arc<CaseResult>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Factored partition of a model plus the results solved so far
///
/// `Kff`, `Kfs`, `Kss` and the DOF map never change after construction; any
/// change of constraints or elements needs a new instance. Cases can be
/// solved concurrently, each case at most once unless recomputed explicitly.
#[derive(Debug)]
pub struct StaticLinearAnalysisResult {
    dof_map: DofMap,
    /// None when the model has no free DOF
    kff: Option<CholeskySolver>,
    kfs: CscMatrix<f64>,
    kss: CscMatrix<f64>,
    parallel: bool,
    results: Mutex<HashMap<LoadCase, CaseSlot>>,
    computation_count: AtomicUsize,
}

impl StaticLinearAnalysisResult {
    /// Partition, assemble and factor `model`
    pub fn new(model: &Model, options: &AnalysisOptions) -> FEAResult<Self> {
        let start = Instant::now();
        let dof_map = DofMap::from_nodes(&model.nodes);
        let parts = assemble(&model.nodes, &model.elements, &dof_map)?;
        let assembled = start.elapsed();

        let kff = if dof_map.free_count() > 0 {
            Some(CholeskySolver::factor(&parts.kff, options.pivot_tolerance)?)
        } else {
            None
        };

        info!(
            "Factored stiffness: {} free / {} fixed DOFs, L nnz {}, assembly {:?}, total {:?}",
            dof_map.free_count(),
            dof_map.fixed_count(),
            kff.as_ref().map_or(0, |k| k.factor_nnz()),
            assembled,
            start.elapsed()
        );

        Ok(Self {
            dof_map,
            kff,
            kfs: parts.kfs,
            kss: parts.kss,
            parallel: options.parallel,
            results: Mutex::new(HashMap::new()),
            computation_count: AtomicUsize::new(0),
        })
    }

    pub fn dof_map(&self) -> &DofMap {
        &self.dof_map
    }

    pub fn kff(&self) -> Option<&CholeskySolver> {
        self.kff.as_ref()
    }

    pub fn kfs(&self) -> &CscMatrix<f64> {
        &self.kfs
    }

    pub fn kss(&self) -> &CscMatrix<f64> {
        &self.kss
    }

    /// Number of case computations performed so far
    pub fn computation_count(&self) -> usize {
        self.computation_count.load(Ordering::SeqCst)
    }

    fn slot(&self, case: &LoadCase) -> CaseSlot {
        lock(&self.results).entry(case.clone()).or_default().clone()
    }

    /// Solve `case` and overwrite any stored result
    pub fn add_analysis_result(&self, model: &Model, case: &LoadCase) -> FEAResult<Arc<CaseResult>> {
        let slot = self.slot(case);
        let mut guard = lock(&slot);
        let result = Arc::new(self.compute(model, case)?);
        *guard = Some(result.clone());
        Ok(result)
    }

    /// Solve `case` unless a result is already stored
    ///
    /// Concurrent calls for the same case compute it once.
    pub fn add_analysis_result_if_not_exists(
        &self,
        model: &Model,
        case: &LoadCase,
    ) -> FEAResult<Arc<CaseResult>> {
        let slot = self.slot(case);
        let mut guard = lock(&slot);
        if let Some(existing) = guard.as_ref() {
            trace!("Result for case '{}' already stored", case);
            return Ok(existing.clone());
        }
        let result = Arc::new(self.compute(model, case)?);
        *guard = Some(result.clone());
        Ok(result)
    }

    /// Ensure results for every case, in parallel unless disabled in the options
    pub fn add_analysis_results(&self, model: &Model, cases: &[LoadCase]) -> FEAResult<()> {
        if self.parallel {
            cases
                .par_iter()
                .try_for_each(|case| self.add_analysis_result_if_not_exists(model, case).map(|_| ()))
        } else {
            cases
                .iter()
                .try_for_each(|case| self.add_analysis_result_if_not_exists(model, case).map(|_| ()))
        }
    }

    /// Stored result of `case`
    pub fn result(&self, case: &LoadCase) -> Option<Arc<CaseResult>> {
        let slot = lock(&self.results).get(case).cloned()?;
        let guard = lock(&slot);
        guard.clone()
    }

    pub fn contains(&self, case: &LoadCase) -> bool {
        self.result(case).is_some()
    }

    /// Global displacement vector of `case`, solving it if needed
    pub fn displacements(&self, model: &Model, case: &LoadCase) -> FEAResult<Vec<f64>> {
        Ok(self
            .add_analysis_result_if_not_exists(model, case)?
            .displacements
            .clone())
    }

    /// Global nodal force vector of `case`, solving it if needed
    pub fn forces(&self, model: &Model, case: &LoadCase) -> FEAResult<Vec<f64>> {
        Ok(self
            .add_analysis_result_if_not_exists(model, case)?
            .forces
            .clone())
    }

    /// Drop stored results; the factorization is kept
    pub fn clear_results(&self) {
        lock(&self.results).clear();
    }

    /// Equivalent nodal loads of the member loads of `case`, per node
    fn member_loads(&self, model: &Model, case: &LoadCase) -> FEAResult<Vec<Force>> {
        let mut loads = vec![Force::zero(); model.nodes.len()];
        for element in &model.elements {
            for load in element.loads_of_case(case) {
                let ends = element.equivalent_nodal_loads(load)?;
                for (&node, force) in element.nodes.iter().zip(ends) {
                    let acc = loads.get_mut(node).ok_or(FEAError::NodeNotFound(node))?;
                    *acc += force;
                }
            }
        }
        Ok(loads)
    }

    fn compute(&self, model: &Model, case: &LoadCase) -> FEAResult<CaseResult> {
        if 6 * model.nodes.len() != self.dof_map.total_dofs() {
            return Err(FEAError::InvalidArgument(format!(
                "model has {} nodes, factorization was built for {}",
                model.nodes.len(),
                self.dof_map.total_dofs() / 6
            )));
        }

        let start = Instant::now();
        let member_loads = self.member_loads(model, case)?;
        let t_members = start.elapsed();

        let mut applied = vec![0.0; self.dof_map.total_dofs()];
        for (n, (node, member)) in model.nodes.iter().zip(&member_loads).enumerate() {
            let total = node.total_load(case) + *member;
            applied[6 * n..6 * n + 6].copy_from_slice(&total.as_array());
        }

        let settles = model.settlements_load_case.as_ref() == Some(case);
        let free = self.dof_map.free_to_global();
        let fixed = self.dof_map.fixed_to_global();
        let pf = DVector::from_iterator(free.len(), free.iter().map(|&g| applied[g]));
        let ps_applied = DVector::from_iterator(fixed.len(), fixed.iter().map(|&g| applied[g]));
        let us = DVector::from_iterator(
            fixed.len(),
            fixed.iter().map(|&g| {
                if settles {
                    model.nodes[g / 6].settlements.as_array()[g % 6]
                } else {
                    0.0
                }
            }),
        );
        let t_partition = start.elapsed();

        let has_settlement = us.iter().any(|v| *v != 0.0);
        let uf = match &self.kff {
            Some(kff) if has_settlement => kff.solve(&(&pf - csc_mul_vec(&self.kfs, &us)))?,
            Some(kff) => kff.solve(&pf)?,
            None => DVector::zeros(0),
        };
        let mut ps = csc_transpose_mul_vec(&self.kfs, &uf);
        if has_settlement {
            ps += csc_mul_vec(&self.kss, &us);
        }
        let t_solve = start.elapsed();

        let reactions_fixed = &ps - &ps_applied;
        let displacements = self.dof_map.scatter(uf.as_slice(), us.as_slice());
        let forces = self.dof_map.scatter(pf.as_slice(), ps.as_slice());
        let zeros = vec![0.0; free.len()];
        let reactions = self.dof_map.scatter(&zeros, reactions_fixed.as_slice());

        self.computation_count.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Case '{}': member loads {:?}, partition {:?}, solve {:?}, scatter {:?}",
            case,
            t_members,
            t_partition - t_members,
            t_solve - t_partition,
            start.elapsed() - t_solve
        );

        Ok(CaseResult {
            displacements,
            forces,
            reactions,
        })
    }
}
