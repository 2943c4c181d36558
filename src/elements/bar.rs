//! Two-node bar element (frame, truss, beam or shaft)

use std::sync::Arc;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::helpers::{BeamDirection, ElementHelper};
use super::{BarMaterial, Constraints, CrossSection, Dof, DofConstraint};
use crate::error::{FEAError, FEAResult};
use crate::loads::{ElementalLoad, Force, LoadCase};
use crate::math::{Mat, Mat12, TransformationManager};
use crate::results::Displacement;

/// How each end of a bar is connected to its node
///
/// `Fixed` means the DOF is connected, `Released` means the bar end moves
/// independently of the node for that DOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarReleases {
    pub start: Constraints,
    pub end: Constraints,
}

impl BarReleases {
    /// Rigidly connected at both ends
    pub fn none() -> Self {
        Self {
            start: Constraints::fixed(),
            end: Constraints::fixed(),
        }
    }

    fn moment_pin() -> Constraints {
        Constraints::fixed()
            .with(Dof::Ry, DofConstraint::Released)
            .with(Dof::Rz, DofConstraint::Released)
    }

    /// Bending moments released at the start
    pub fn pin_start() -> Self {
        Self {
            start: Self::moment_pin(),
            end: Constraints::fixed(),
        }
    }

    /// Bending moments released at the end
    pub fn pin_end() -> Self {
        Self {
            start: Constraints::fixed(),
            end: Self::moment_pin(),
        }
    }

    /// Bending moments released at both ends
    pub fn pin_both() -> Self {
        Self {
            start: Self::moment_pin(),
            end: Self::moment_pin(),
        }
    }
}

impl Default for BarReleases {
    fn default() -> Self {
        Self::none()
    }
}

/// Which behaviours a bar contributes to the stiffness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarBehaviour {
    /// Bending in the local x-z plane (w, Ry)
    pub beam_y: bool,
    /// Bending in the local x-y plane (v, Rz)
    pub beam_z: bool,
    /// Axial (u)
    pub truss: bool,
    /// Torsion (Rx)
    pub shaft: bool,
}

impl BarBehaviour {
    pub const FRAME: Self = Self {
        beam_y: true,
        beam_z: true,
        truss: true,
        shaft: true,
    };
    pub const TRUSS: Self = Self {
        beam_y: false,
        beam_z: false,
        truss: true,
        shaft: false,
    };
    pub const BEAM: Self = Self {
        beam_y: true,
        beam_z: true,
        truss: false,
        shaft: false,
    };
    pub const BEAM_Z: Self = Self {
        beam_y: false,
        beam_z: true,
        truss: false,
        shaft: false,
    };
    pub const SHAFT: Self = Self {
        beam_y: false,
        beam_z: false,
        truss: false,
        shaft: true,
    };
}

impl Default for BarBehaviour {
    fn default() -> Self {
        Self::FRAME
    }
}

/// Straight bar between two nodes
#[derive(Debug, Clone)]
pub struct BarElement {
    /// Model node indices, start first
    pub nodes: Vec<usize>,
    pub section: Arc<dyn CrossSection>,
    pub material: Arc<dyn BarMaterial>,
    pub releases: BarReleases,
    /// Rotation of the section about local x (radians)
    pub web_rotation: f64,
    pub behaviour: BarBehaviour,
    pub loads: Vec<ElementalLoad>,
    pub label: Option<String>,

    locations: Vec<Vector3<f64>>,
    length: f64,
    transformation: TransformationManager,
}

impl BarElement {
    /// Create a frame bar between two model nodes; geometry is attached by the model
    pub fn new(
        start_node: usize,
        end_node: usize,
        section: Arc<dyn CrossSection>,
        material: Arc<dyn BarMaterial>,
    ) -> Self {
        Self {
            nodes: vec![start_node, end_node],
            section,
            material,
            releases: BarReleases::none(),
            web_rotation: 0.0,
            behaviour: BarBehaviour::FRAME,
            loads: Vec::new(),
            label: None,
            locations: Vec::new(),
            length: 0.0,
            transformation: TransformationManager::identity(),
        }
    }

    /// Free-standing bar with explicit end locations (node indices 0 and 1)
    pub fn between(
        start: Vector3<f64>,
        end: Vector3<f64>,
        section: Arc<dyn CrossSection>,
        material: Arc<dyn BarMaterial>,
    ) -> FEAResult<Self> {
        let mut bar = Self::new(0, 1, section, material);
        bar.attach(vec![start, end])?;
        Ok(bar)
    }

    pub fn with_behaviour(mut self, behaviour: BarBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    pub fn with_releases(mut self, releases: BarReleases) -> Self {
        self.releases = releases;
        self
    }

    /// Set the web rotation (radians)
    pub fn with_web_rotation(mut self, radians: f64) -> Self {
        self.web_rotation = radians;
        if let (Some(first), Some(last)) = (self.locations.first(), self.locations.last()) {
            // Geometry was validated on attach
            if let Ok(tm) = TransformationManager::for_bar(first, last, radians) {
                self.transformation = tm;
            }
        }
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_load(mut self, load: impl Into<ElementalLoad>) -> Self {
        self.loads.push(load.into());
        self
    }

    /// Bind node locations and compute length and local frame
    pub(crate) fn attach(&mut self, locations: Vec<Vector3<f64>>) -> FEAResult<()> {
        if locations.len() != self.nodes.len() {
            return Err(FEAError::InvalidArgument(format!(
                "{} locations given for {} nodes",
                locations.len(),
                self.nodes.len()
            )));
        }
        let (first, last) = match (locations.first(), locations.last()) {
            (Some(f), Some(l)) if locations.len() >= 2 => (*f, *l),
            _ => {
                return Err(FEAError::UnsupportedConfiguration(
                    "bar element needs at least two nodes".to_string(),
                ))
            }
        };

        self.transformation = TransformationManager::for_bar(&first, &last, self.web_rotation)?;
        self.length = (last - first).norm();
        self.locations = locations;
        Ok(())
    }

    pub fn locations(&self) -> &[Vector3<f64>] {
        &self.locations
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// dx/dξ for a straight two-node bar
    pub fn jacobian(&self) -> f64 {
        self.length / 2.0
    }

    pub fn transformation(&self) -> &TransformationManager {
        &self.transformation
    }

    /// Local x of an iso coordinate
    pub fn x_at(&self, xi: f64) -> f64 {
        (xi + 1.0) * self.length / 2.0
    }

    /// Iso coordinate of a local x
    pub fn xi_at(&self, x: f64) -> f64 {
        2.0 * x / self.length - 1.0
    }

    /// Iso coordinate of node `index` (0 = start)
    pub fn node_xi(&self, index: usize) -> f64 {
        if index == 0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Whether the bar end at node `index` is connected for `dof`
    pub fn is_connected(&self, index: usize, dof: Dof) -> bool {
        let end = if index == 0 {
            &self.releases.start
        } else {
            &self.releases.end
        };
        end.is_fixed(dof)
    }

    /// Helpers only work on two-node bars
    pub(crate) fn check_two_nodes(&self) -> FEAResult<()> {
        if self.nodes.len() != 2 {
            return Err(FEAError::UnsupportedConfiguration(format!(
                "bar helpers need exactly 2 nodes, element has {}",
                self.nodes.len()
            )));
        }
        if self.length <= 0.0 {
            return Err(FEAError::InvalidGeometry(
                "bar geometry is not attached".to_string(),
            ));
        }
        Ok(())
    }

    /// One helper per active behaviour
    pub fn helpers(&self) -> Vec<ElementHelper> {
        let mut helpers = Vec::with_capacity(4);
        if self.behaviour.beam_y {
            helpers.push(ElementHelper::beam(BeamDirection::Y));
        }
        if self.behaviour.beam_z {
            helpers.push(ElementHelper::beam(BeamDirection::Z));
        }
        if self.behaviour.truss {
            helpers.push(ElementHelper::truss());
        }
        if self.behaviour.shaft {
            helpers.push(ElementHelper::shaft());
        }
        helpers
    }

    /// Scatter a helper matrix into 12x12 local DOF numbering
    fn scatter(helper: &ElementHelper, small: &Mat, full: &mut Mat12) {
        let dofs = helper.local_dofs();
        let dpn = dofs.len();
        let index = |c: usize| (c / dpn) * 6 + dofs[c % dpn].index();
        for r in 0..small.nrows() {
            for c in 0..small.ncols() {
                full[(index(r), index(c))] += small[(r, c)];
            }
        }
    }

    /// Local stiffness, `[u0 v0 w0 θx0 θy0 θz0 u1 ... θz1]` ordering
    pub fn local_stiffness_matrix(&self) -> FEAResult<Mat12> {
        self.check_two_nodes()?;
        let mut k = Mat12::zeros();
        for helper in self.helpers() {
            let kh = helper.stiffness_matrix(self)?;
            Self::scatter(&helper, &kh, &mut k);
        }
        Ok(k)
    }

    /// Global stiffness `Tᵀ k T`
    pub fn global_stiffness_matrix(&self) -> FEAResult<Mat12> {
        let t = self.transformation.transformation_matrix();
        Ok(t.transpose() * self.local_stiffness_matrix()? * t)
    }

    /// Consistent local mass matrix
    pub fn local_mass_matrix(&self) -> FEAResult<Mat12> {
        self.check_two_nodes()?;
        let mut m = Mat12::zeros();
        for helper in self.helpers() {
            let mh = helper.mass_matrix(self)?;
            Self::scatter(&helper, &mh, &mut m);
        }
        Ok(m)
    }

    /// Equivalent nodal loads of `load` in global axes, one per node
    pub fn equivalent_nodal_loads(&self, load: &ElementalLoad) -> FEAResult<[Force; 2]> {
        self.check_two_nodes()?;
        let mut local = [Force::zero(); 2];
        for helper in self.helpers() {
            let ends = helper.equivalent_nodal_loads(self, load)?;
            for (acc, f) in local.iter_mut().zip(ends) {
                *acc += f;
            }
        }
        Ok([
            self.transformation.local_to_global_force(&local[0]),
            self.transformation.local_to_global_force(&local[1]),
        ])
    }

    /// Loads of this bar that belong to `case`
    pub fn loads_of_case<'a>(&'a self, case: &'a LoadCase) -> impl Iterator<Item = &'a ElementalLoad> {
        self.loads.iter().filter(move |l| l.case() == case)
    }

    fn to_local(&self, global: &[Displacement; 2]) -> [Displacement; 2] {
        [
            self.transformation.global_to_local_displacement(&global[0]),
            self.transformation.global_to_local_displacement(&global[1]),
        ]
    }

    /// Total internal force at ξ (local axes) for solved global nodal displacements
    ///
    /// Sums the field driven by the nodal values and the load-only field of
    /// every load of `case`.
    pub fn internal_force_at(
        &self,
        global_displacements: &[Displacement; 2],
        case: &LoadCase,
        xi: f64,
    ) -> FEAResult<Force> {
        self.check_two_nodes()?;
        let local = self.to_local(global_displacements);
        let mut total = Force::zero();
        for helper in self.helpers() {
            total += helper.internal_force_from_nodal_values(self, &local, xi)?;
            for load in self.loads_of_case(case) {
                total += helper.internal_force_at(self, load, xi)?;
            }
        }
        Ok(total)
    }

    /// Total internal displacement at ξ (local axes), see [`BarElement::internal_force_at`]
    pub fn internal_displacement_at(
        &self,
        global_displacements: &[Displacement; 2],
        case: &LoadCase,
        xi: f64,
    ) -> FEAResult<Displacement> {
        self.check_two_nodes()?;
        let local = self.to_local(global_displacements);
        let mut total = Displacement::zero();
        for helper in self.helpers() {
            total += helper.internal_displacement_from_nodal_values(self, &local, xi)?;
            for load in self.loads_of_case(case) {
                total += helper.internal_displacement_at(self, load, xi)?;
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{SectionProperties, UniformIsotropicMaterial, UniformSection};
    use approx::assert_relative_eq;

    fn steel_bar(end: Vector3<f64>) -> BarElement {
        BarElement::between(
            Vector3::zeros(),
            end,
            Arc::new(UniformSection::new(SectionProperties::new(0.01, 2e-5, 3e-5, 4e-5))),
            Arc::new(UniformIsotropicMaterial::steel()),
        )
        .unwrap()
    }

    #[test]
    fn test_frame_stiffness_terms() {
        let bar = steel_bar(Vector3::new(4.0, 0.0, 0.0));
        let k = bar.local_stiffness_matrix().unwrap();
        let (e, g, l) = (200e9, 77e9, 4.0);

        assert_relative_eq!(k[(0, 0)], e * 0.01 / l, max_relative = 1e-10);
        assert_relative_eq!(k[(0, 6)], -e * 0.01 / l, max_relative = 1e-10);
        assert_relative_eq!(k[(3, 3)], g * 4e-5 / l, max_relative = 1e-10);
        assert_relative_eq!(k[(1, 1)], 12.0 * e * 3e-5 / l.powi(3), max_relative = 1e-10);
        assert_relative_eq!(k[(1, 5)], 6.0 * e * 3e-5 / l.powi(2), max_relative = 1e-10);
        assert_relative_eq!(k[(2, 2)], 12.0 * e * 2e-5 / l.powi(3), max_relative = 1e-10);
        assert_relative_eq!(k[(2, 4)], -6.0 * e * 2e-5 / l.powi(2), max_relative = 1e-10);
        assert_relative_eq!(k[(5, 5)], 4.0 * e * 3e-5 / l, max_relative = 1e-10);
        assert_relative_eq!(k[(5, 11)], 2.0 * e * 3e-5 / l, max_relative = 1e-10);
        assert_relative_eq!(k, k.transpose(), epsilon = 1e-3);
    }

    #[test]
    fn test_global_stiffness_is_rotation_invariant() {
        let horizontal = steel_bar(Vector3::new(3.0, 0.0, 0.0));
        let inclined = steel_bar(Vector3::new(1.0, 2.0, 2.0));

        let kh = horizontal.global_stiffness_matrix().unwrap();
        let ki = inclined.global_stiffness_matrix().unwrap();
        // Same length, so the spectra match
        let mut eh: Vec<f64> = kh.symmetric_eigenvalues().iter().copied().collect();
        let mut ei: Vec<f64> = ki.symmetric_eigenvalues().iter().copied().collect();
        eh.sort_by(f64::total_cmp);
        ei.sort_by(f64::total_cmp);
        for (a, b) in eh.iter().zip(ei.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-3, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_consistent_mass_terms() {
        let bar = steel_bar(Vector3::new(4.0, 0.0, 0.0));
        let m = bar.local_mass_matrix().unwrap();
        let total = 7850.0 * 0.01 * 4.0;

        assert_relative_eq!(m[(0, 0)], total / 3.0, max_relative = 1e-10);
        assert_relative_eq!(m[(0, 6)], total / 6.0, max_relative = 1e-10);
        assert_relative_eq!(m[(1, 1)], 156.0 * total / 420.0, max_relative = 1e-10);
        assert_relative_eq!(m[(1, 7)], 54.0 * total / 420.0, max_relative = 1e-10);
        // Translations along y carry the whole bar mass
        let ty = m[(1, 1)] + m[(1, 7)] + m[(7, 1)] + m[(7, 7)];
        assert_relative_eq!(ty, total, max_relative = 1e-10);
        assert_relative_eq!(m, m.transpose(), epsilon = 1e-9);
    }

    #[test]
    fn test_pinned_ends_drop_bending_stiffness() {
        let bar = steel_bar(Vector3::new(2.0, 0.0, 0.0)).with_releases(BarReleases::pin_both());
        let k = bar.local_stiffness_matrix().unwrap();
        assert_eq!(k[(5, 5)], 0.0);
        assert_eq!(k[(4, 4)], 0.0);
        assert!(k[(1, 1)].abs() < 1e-6 * k[(0, 0)]);
        assert!(k[(0, 0)] > 0.0);
    }

    #[test]
    fn test_three_node_bar_is_rejected() {
        let mut bar = steel_bar(Vector3::new(2.0, 0.0, 0.0));
        bar.nodes.push(2);
        assert!(matches!(
            bar.local_stiffness_matrix(),
            Err(FEAError::UnsupportedConfiguration(_))
        ));
    }
}
