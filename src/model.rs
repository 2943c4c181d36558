//! Model - container of nodes, bar elements and their loads

use std::sync::Arc;

use crate::analysis::{AnalysisOptions, StaticLinearAnalysisResult};
use crate::elements::{BarElement, Constraints, Node};
use crate::error::{FEAError, FEAResult};
use crate::loads::{ElementalLoad, Force, LoadCase, NodalLoad};
use crate::results::{AnalysisSummary, CaseResult, Displacement};

/// A 3D bar model and its linear static solution
///
/// Nodes and elements are addressed by index. Changing constraints or
/// elements discards the factorization; changing loads or settlements only
/// discards stored case results.
#[derive(Debug, Default)]
pub struct Model {
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<BarElement>,
    /// The case in which node settlements are applied
    pub(crate) settlements_load_case: Option<LoadCase>,

    analysis: Option<StaticLinearAnalysisResult>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node, returning its index
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.analysis = None;
        self.nodes.len() - 1
    }

    /// Add a bar element, returning its index
    pub fn add_element(&mut self, mut element: BarElement) -> FEAResult<usize> {
        let locations = element
            .nodes
            .iter()
            .map(|&n| {
                self.nodes
                    .get(n)
                    .map(|node| node.location)
                    .ok_or(FEAError::NodeNotFound(n))
            })
            .collect::<FEAResult<Vec<_>>>()?;
        for load in &element.loads {
            load.validate()?;
        }
        element.attach(locations)?;

        self.elements.push(element);
        self.analysis = None;
        Ok(self.elements.len() - 1)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[BarElement] {
        &self.elements
    }

    pub fn node(&self, index: usize) -> FEAResult<&Node> {
        self.nodes.get(index).ok_or(FEAError::NodeNotFound(index))
    }

    pub fn element(&self, index: usize) -> FEAResult<&BarElement> {
        self.elements
            .get(index)
            .ok_or(FEAError::ElementNotFound(index))
    }

    fn node_mut(&mut self, index: usize) -> FEAResult<&mut Node> {
        self.nodes.get_mut(index).ok_or(FEAError::NodeNotFound(index))
    }

    fn clear_results(&self) {
        if let Some(analysis) = &self.analysis {
            analysis.clear_results();
        }
    }

    /// Set support conditions of a node
    pub fn set_constraints(&mut self, node: usize, constraints: Constraints) -> FEAResult<()> {
        self.node_mut(node)?.constraints = constraints;
        self.analysis = None;
        Ok(())
    }

    /// Add a load to a node
    pub fn add_nodal_load(&mut self, node: usize, load: NodalLoad) -> FEAResult<()> {
        self.node_mut(node)?.loads.push(load);
        self.clear_results();
        Ok(())
    }

    /// Add a load to an element
    pub fn add_element_load(
        &mut self,
        element: usize,
        load: impl Into<ElementalLoad>,
    ) -> FEAResult<()> {
        let load = load.into();
        load.validate()?;
        self.elements
            .get_mut(element)
            .ok_or(FEAError::ElementNotFound(element))?
            .loads
            .push(load);
        self.clear_results();
        Ok(())
    }

    /// Prescribed displacement of a node's fixed DOFs
    pub fn set_settlement(&mut self, node: usize, settlement: Displacement) -> FEAResult<()> {
        self.node_mut(node)?.settlements = settlement;
        self.clear_results();
        Ok(())
    }

    /// Select the case in which settlements apply (None = no case)
    pub fn set_settlements_load_case(&mut self, case: Option<LoadCase>) {
        self.settlements_load_case = case;
        self.clear_results();
    }

    pub fn settlements_load_case(&self) -> Option<&LoadCase> {
        self.settlements_load_case.as_ref()
    }

    /// Every case referenced by a load or by the settlements
    pub fn load_cases(&self) -> Vec<LoadCase> {
        let mut cases: Vec<LoadCase> = Vec::new();
        let referenced = self
            .nodes
            .iter()
            .flat_map(|n| n.loads.iter().map(|l| &l.case))
            .chain(self.elements.iter().flat_map(|e| e.loads.iter().map(|l| l.case())))
            .chain(self.settlements_load_case.iter());
        for case in referenced {
            if !cases.contains(case) {
                cases.push(case.clone());
            }
        }
        cases
    }

    // ========================
    // Analysis
    // ========================

    /// Factor the model with default options
    pub fn solve(&mut self) -> FEAResult<()> {
        self.solve_with(AnalysisOptions::default())
    }

    /// Factor the model and solve the cases named in `options`
    ///
    /// On failure no previous factorization or result is kept.
    pub fn solve_with(&mut self, options: AnalysisOptions) -> FEAResult<()> {
        self.analysis = None;
        let analysis = StaticLinearAnalysisResult::new(self, &options)?;
        if let Some(cases) = &options.load_cases {
            analysis.add_analysis_results(self, cases)?;
        }
        self.analysis = Some(analysis);
        Ok(())
    }

    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn analysis(&self) -> FEAResult<&StaticLinearAnalysisResult> {
        self.analysis.as_ref().ok_or(FEAError::NotAnalyzed)
    }

    /// Result of `case`, solved on first access
    pub fn result(&self, case: &LoadCase) -> FEAResult<Arc<CaseResult>> {
        self.analysis()?.add_analysis_result_if_not_exists(self, case)
    }

    /// Solve every case the model references
    pub fn solve_load_cases(&self) -> FEAResult<()> {
        self.analysis()?.add_analysis_results(self, &self.load_cases())
    }

    // ========================
    // Result Access Methods
    // ========================

    /// Global displacement vector (`6 * node + component`)
    pub fn displacements(&self, case: &LoadCase) -> FEAResult<Vec<f64>> {
        self.analysis()?.displacements(self, case)
    }

    /// Global nodal force vector (`6 * node + component`)
    pub fn forces(&self, case: &LoadCase) -> FEAResult<Vec<f64>> {
        self.analysis()?.forces(self, case)
    }

    pub fn node_displacement(&self, node: usize, case: &LoadCase) -> FEAResult<Displacement> {
        self.result(case)?
            .node_displacement(node)
            .ok_or(FEAError::NodeNotFound(node))
    }

    /// Support reaction in global axes, net of loads applied at the support
    pub fn support_reaction(&self, node: usize, case: &LoadCase) -> FEAResult<Force> {
        self.result(case)?
            .support_reaction(node)
            .ok_or(FEAError::NodeNotFound(node))
    }

    fn element_end_displacements(
        &self,
        element: &BarElement,
        result: &CaseResult,
    ) -> FEAResult<[Displacement; 2]> {
        let mut ends = [Displacement::zero(); 2];
        for (end, &node) in ends.iter_mut().zip(&element.nodes) {
            *end = result
                .node_displacement(node)
                .ok_or(FEAError::NodeNotFound(node))?;
        }
        Ok(ends)
    }

    /// Internal force of an element at ξ, local axes
    pub fn element_internal_force(
        &self,
        element: usize,
        case: &LoadCase,
        xi: f64,
    ) -> FEAResult<Force> {
        let bar = self.element(element)?;
        let result = self.result(case)?;
        let ends = self.element_end_displacements(bar, &result)?;
        bar.internal_force_at(&ends, case, xi)
    }

    /// Internal displacement of an element at ξ, local axes
    pub fn element_internal_displacement(
        &self,
        element: usize,
        case: &LoadCase,
        xi: f64,
    ) -> FEAResult<Displacement> {
        let bar = self.element(element)?;
        let result = self.result(case)?;
        let ends = self.element_end_displacements(bar, &result)?;
        bar.internal_displacement_at(&ends, case, xi)
    }

    /// Get analysis summary
    pub fn summary(&self, case: &LoadCase) -> FEAResult<AnalysisSummary> {
        let analysis = self.analysis()?;
        let result = analysis.add_analysis_result_if_not_exists(self, case)?;
        Ok(AnalysisSummary::from_result(
            &result,
            self.elements.len(),
            analysis.dof_map().free_count(),
        ))
    }
}
