//! Element helpers: one per bar behaviour (bending about each transverse
//! axis, axial, torsion)
//!
//! A helper owns no data of its own; it reads geometry, section, material and
//! end releases from the [`BarElement`] it is asked about. The field specific
//! pieces (shape functions, rigidity, sign conventions) are required methods of
//! [`BarHelper`]; stiffness, equivalent nodal loads and the load-only internal
//! fields are provided on top of them and shared by all helpers.

mod beam;
mod shaft;
mod truss;

pub use beam::{BeamDirection, EulerBernoulliBeamHelper};
pub use shaft::ShaftHelper;
pub use truss::TrussHelper;

use std::ops::Deref;

use nalgebra::{DVector, Vector3};

use super::{BarElement, Dof};
use crate::error::{check_iso, FEAError, FEAResult};
use crate::loads::{ElementalLoad, Force};
use crate::math::{GaussianIntegrator, Mat, Polynomial1D};
use crate::results::Displacement;

/// Fitting pieces per smooth segment of a bar with varying rigidity
const NON_UNIFORM_SUBDIVISIONS: usize = 16;

/// Capability shared by the bar helpers
///
/// DOF vectors use per-node interleaving: `[n0 dof0, n0 dof1, n1 dof0, n1 dof1]`
/// for the beam and `[n0, n1]` for truss and shaft.
pub trait BarHelper {
    /// Local DOFs this helper acts on at each node
    fn local_dofs(&self) -> &'static [Dof];

    fn dofs_per_node(&self) -> usize {
        self.local_dofs().len()
    }

    /// Polynomial order of the shape functions
    fn n_max_order(&self) -> usize;

    /// Polynomial order of the strain-displacement row
    fn b_max_order(&self) -> usize;

    /// Rows are the field value and its ξ derivatives, columns the DOFs
    fn shape_matrix_at(&self, bar: &BarElement, xi: f64) -> FEAResult<Mat>;

    /// Strain row in physical coordinates (1 x DOFs)
    fn strain_displacement_matrix_at(&self, bar: &BarElement, xi: f64) -> FEAResult<Mat>;

    /// EI, EA or GJ at ξ
    fn rigidity_at(&self, bar: &BarElement, xi: f64) -> FEAResult<f64>;

    /// Inertia per unit length at ξ
    fn mass_per_length_at(&self, bar: &BarElement, xi: f64) -> FEAResult<f64>;

    /// Line load component (local axes) this field reacts to
    fn distributed_component(&self, q: &Vector3<f64>) -> f64;

    /// Work equivalent DOF vector of a local point load at ξ
    fn point_load_at(&self, bar: &BarElement, xi: f64, force: &Force) -> FEAResult<DVector<f64>>;

    /// Keep only the force components this field carries
    fn carried_components(&self, force: &Force) -> Force;

    /// Curvature, axial strain or twist rate produced by an internal force
    fn strain_from_internal_force(&self, force: &Force, rigidity: f64) -> f64;

    /// Integrations taking the strain back to the field value (2 for bending)
    fn strain_integrations(&self) -> usize;

    /// Local displacement from the field value and its x derivative
    fn field_to_displacement(&self, value: f64, slope: f64) -> Displacement;

    /// Field at ξ driven by the local nodal displacements
    fn internal_displacement_from_nodal_values(
        &self,
        bar: &BarElement,
        local_displacements: &[Displacement; 2],
        xi: f64,
    ) -> FEAResult<Displacement>;

    /// Internal force at ξ driven by the local nodal displacements
    fn internal_force_from_nodal_values(
        &self,
        bar: &BarElement,
        local_displacements: &[Displacement; 2],
        xi: f64,
    ) -> FEAResult<Force>;

    /// Gather this helper's DOFs from local nodal displacements
    fn nodal_vector(&self, local_displacements: &[Displacement; 2]) -> DVector<f64> {
        let dofs = self.local_dofs();
        DVector::from_iterator(
            2 * dofs.len(),
            local_displacements
                .iter()
                .flat_map(|d| dofs.iter().map(move |dof| d.component(*dof))),
        )
    }

    /// Scatter a DOF vector onto per-node local forces
    fn dof_vector_to_forces(&self, vector: &DVector<f64>) -> [Force; 2] {
        let dofs = self.local_dofs();
        let mut forces = [Force::zero(); 2];
        for (c, value) in vector.iter().enumerate() {
            let node = c / dofs.len();
            let dof = dofs[c % dofs.len()];
            let current = forces[node].component(dof);
            forces[node].set_component(dof, current + value);
        }
        forces
    }

    /// `∫ Bᵀ D B J dξ`
    fn stiffness_matrix(&self, bar: &BarElement) -> FEAResult<Mat> {
        bar.check_two_nodes()?;
        let n = 2 * self.dofs_per_node();
        let order = 2 * self.b_max_order() + bar.section.max_order() + bar.material.max_order();
        let j = bar.jacobian();

        GaussianIntegrator::new(-1.0, 1.0, order / 2 + 1).integrate_matrix(n, n, |xi, out| {
            let b = self.strain_displacement_matrix_at(bar, xi)?;
            let d = self.rigidity_at(bar, xi)?;
            *out = b.tr_mul(&b) * (d * j);
            Ok(())
        })
    }

    /// `∫ Nᵀ m N J dξ` with the value row of N
    fn mass_matrix(&self, bar: &BarElement) -> FEAResult<Mat> {
        bar.check_two_nodes()?;
        let n = 2 * self.dofs_per_node();
        let order = 2 * self.n_max_order() + bar.section.max_order() + bar.material.max_order();
        let j = bar.jacobian();

        GaussianIntegrator::new(-1.0, 1.0, order / 2 + 1).integrate_matrix(n, n, |xi, out| {
            let nm = self.shape_matrix_at(bar, xi)?;
            let row = nm.rows(0, 1);
            let m = self.mass_per_length_at(bar, xi)?;
            *out = row.tr_mul(&row) * (m * j);
            Ok(())
        })
    }

    /// Nodal loads (local axes) work-equivalent to `load`
    fn equivalent_nodal_loads(&self, bar: &BarElement, load: &ElementalLoad) -> FEAResult<[Force; 2]> {
        bar.check_two_nodes()?;
        let tm = bar.transformation();
        let n = 2 * self.dofs_per_node();

        let vector = match load.local_point_force(tm) {
            Some((xi, force)) => {
                check_iso(xi)?;
                self.point_load_at(bar, xi, &force)?
            }
            None => {
                let (a, b) = load.iso_span();
                if b <= a {
                    return Ok([Force::zero(); 2]);
                }
                let j = bar.jacobian();
                let points = (self.n_max_order() + load.degree()) / 2 + 1;
                let integrated =
                    GaussianIntegrator::new(a, b, points).integrate_matrix(n, 1, |xi, out| {
                        let q = self.distributed_component(&load.local_intensity_at(tm, xi));
                        if q == 0.0 {
                            return Ok(());
                        }
                        let nm = self.shape_matrix_at(bar, xi)?;
                        for c in 0..n {
                            out[(c, 0)] = nm[(0, c)] * q * j;
                        }
                        Ok(())
                    })?;
                integrated.column(0).into_owned()
            }
        };

        Ok(self.dof_vector_to_forces(&vector))
    }

    /// Internal force at ξ caused by `load` alone on a bar held at its nodes
    ///
    /// Free body of the part `[0, x]`: the node reactions (reversed equivalent
    /// nodal loads) of nodes before ξ and the part of the load before ξ, all
    /// transported to x. The internal force is the negated sum.
    fn internal_force_at(&self, bar: &BarElement, load: &ElementalLoad, xi: f64) -> FEAResult<Force> {
        check_iso(xi)?;
        let ends = self.equivalent_nodal_loads(bar, load)?;
        load_only_force(self, bar, load, &ends, xi)
    }

    /// Displacement at ξ caused by `load` alone on a bar held at its nodes
    ///
    /// The load-only strain is sampled on each smooth piece of the bar, fitted
    /// with a polynomial and integrated from x = 0 with zero value and slope,
    /// keeping value and slope continuous between pieces.
    ///
    /// The node reactions are the equivalent nodal loads of the shape
    /// functions, which are exact only for constant rigidity. On a tapered or
    /// graded bar the field therefore does not return to zero at ξ = 1.
    fn internal_displacement_at(
        &self,
        bar: &BarElement,
        load: &ElementalLoad,
        xi: f64,
    ) -> FEAResult<Displacement> {
        check_iso(xi)?;
        bar.check_two_nodes()?;
        for i in 0..2 {
            for dof in self.local_dofs() {
                if !bar.is_connected(i, *dof) {
                    return Err(FEAError::NotSupported(format!(
                        "load-only displacement of a bar with {:?} released at node {}",
                        dof, i
                    )));
                }
            }
        }

        let length = bar.length();
        let x_query = bar.x_at(xi);

        let mut breaks = vec![0.0, length];
        match load.local_point_force(bar.transformation()) {
            Some((load_xi, _)) => breaks.push(bar.x_at(load_xi)),
            None => {
                let (a, b) = load.iso_span();
                breaks.push(bar.x_at(a));
                breaks.push(bar.x_at(b));
            }
        }
        breaks.retain(|x| (0.0..=length).contains(x));
        breaks.sort_by(f64::total_cmp);
        breaks.dedup_by(|a, b| (*a - *b).abs() <= 1e-12 * length);

        // Internal force is `strain_integrations` degrees above the load
        let samples = load.degree()
            + self.strain_integrations()
            + 1
            + 2 * (bar.section.max_order() + bar.material.max_order());

        // Strain is rational when the rigidity varies, so fit it on shorter pieces
        let subdivisions = if bar.section.max_order() + bar.material.max_order() > 0 {
            NON_UNIFORM_SUBDIVISIONS
        } else {
            1
        };
        let pieces = breaks.windows(2).flat_map(|piece| {
            let (start, end) = (piece[0], piece[1]);
            let h = (end - start) / subdivisions as f64;
            (0..subdivisions).map(move |k| {
                let b = if k + 1 == subdivisions { end } else { start + (k + 1) as f64 * h };
                (start + k as f64 * h, b)
            })
        });

        let ends = self.equivalent_nodal_loads(bar, load)?;
        let (mut value, mut slope) = (0.0, 0.0);
        for (a, b) in pieces {
            if a >= x_query {
                break;
            }

            let mut ts = Vec::with_capacity(samples);
            let mut strains = Vec::with_capacity(samples);
            for k in 0..samples {
                let t = (b - a) * (k as f64 + 0.5) / samples as f64;
                let sample_xi = bar.xi_at(a + t);
                let force = load_only_force(self, bar, load, &ends, sample_xi)?;
                let rigidity = self.rigidity_at(bar, sample_xi)?;
                ts.push(t);
                strains.push(self.strain_from_internal_force(&force, rigidity));
            }

            let strain = Polynomial1D::from_points(&ts, &strains)?;
            let first = strain.integral();
            let h = b.min(x_query) - a;

            if self.strain_integrations() == 2 {
                value += slope * h + first.evaluate_nth_integral(1, h);
                slope += first.evaluate(h);
            } else {
                value += first.evaluate(h);
                slope = strain.evaluate(h);
            }
        }

        Ok(self.field_to_displacement(value, slope))
    }
}

/// Closed set of helpers a bar can carry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementHelper {
    Beam(EulerBernoulliBeamHelper),
    Truss(TrussHelper),
    Shaft(ShaftHelper),
}

impl ElementHelper {
    pub fn beam(direction: BeamDirection) -> Self {
        Self::Beam(EulerBernoulliBeamHelper::new(direction))
    }

    pub fn truss() -> Self {
        Self::Truss(TrussHelper)
    }

    pub fn shaft() -> Self {
        Self::Shaft(ShaftHelper)
    }
}

impl Deref for ElementHelper {
    type Target = dyn BarHelper;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Beam(h) => h,
            Self::Truss(h) => h,
            Self::Shaft(h) => h,
        }
    }
}

/// Free body sum of [`BarHelper::internal_force_at`] with the end loads known
fn load_only_force<H: BarHelper + ?Sized>(
    helper: &H,
    bar: &BarElement,
    load: &ElementalLoad,
    ends: &[Force; 2],
    xi: f64,
) -> FEAResult<Force> {
    check_iso(xi)?;
    bar.check_two_nodes()?;
    let tm = bar.transformation();
    let cut = Vector3::new(bar.x_at(xi), 0.0, 0.0);

    let mut sum = Force::zero();
    for (i, end) in ends.iter().enumerate() {
        let node_xi = bar.node_xi(i);
        if node_xi < xi {
            let at = Vector3::new(bar.x_at(node_xi), 0.0, 0.0);
            sum += (-*end).move_to(&at, &cut);
        }
    }

    match load.local_point_force(tm) {
        Some((load_xi, force)) => {
            if load_xi < xi {
                let at = Vector3::new(bar.x_at(load_xi), 0.0, 0.0);
                sum += force.move_to(&at, &cut);
            }
        }
        None => {
            let (a, b) = load.iso_span();
            let upper = b.min(xi);
            if upper > a {
                let j = bar.jacobian();
                let points = load.degree() / 2 + 2;
                let resultant =
                    GaussianIntegrator::new(a, upper, points).integrate_matrix(6, 1, |eta, out| {
                        let q = load.local_intensity_at(tm, eta) * j;
                        let m = Vector3::new(bar.x_at(eta), 0.0, 0.0).cross(&q);
                        for k in 0..3 {
                            out[(k, 0)] = q[k];
                            out[(k + 3, 0)] = m[k];
                        }
                        Ok(())
                    })?;
                let at_origin = Force::new(
                    resultant[(0, 0)],
                    resultant[(1, 0)],
                    resultant[(2, 0)],
                    resultant[(3, 0)],
                    resultant[(4, 0)],
                    resultant[(5, 0)],
                );
                sum += at_origin.move_to(&Vector3::zeros(), &cut);
            }
        }
    }

    Ok(helper.carried_components(&(-sum)))
}

/// Monomial coefficients of shape functions from nodal conditions
///
/// Row `r` of `conditions` is the condition attached to DOF `r`; column `c`
/// of the result is the polynomial that meets condition `c` with 1 and every
/// other condition with 0. Columns of released DOFs are zeroed.
pub(crate) fn shape_coefficients(conditions: Mat, released: &[bool]) -> FEAResult<Mat> {
    let mut coefficients = conditions.try_inverse().ok_or_else(|| {
        FEAError::UnsupportedConfiguration(
            "end releases leave the element without a stable shape".to_string(),
        )
    })?;
    for (c, is_released) in released.iter().enumerate() {
        if *is_released {
            coefficients.column_mut(c).fill(0.0);
        }
    }
    Ok(coefficients)
}

/// `N[k, c]` = k-th ξ derivative of shape function `c`, for `k < rows`
pub(crate) fn evaluate_shape_functions(coefficients: &Mat, xi: f64, rows: usize) -> Mat {
    let mut n = Mat::zeros(rows, coefficients.ncols());
    for c in 0..coefficients.ncols() {
        let p = Polynomial1D::new(coefficients.column(c).iter().copied().collect());
        for k in 0..rows {
            n[(k, c)] = p.evaluate_derivative(xi, k);
        }
    }
    n
}

/// Shape matrix of a linear field (truss, shaft) on `dof`
///
/// A released end has zero strain instead of a prescribed value.
pub(crate) fn linear_shape_matrix(bar: &BarElement, dof: Dof, xi: f64) -> FEAResult<Mat> {
    check_iso(xi)?;
    bar.check_two_nodes()?;

    let mut conditions = Mat::zeros(2, 2);
    let mut released = [false; 2];
    for i in 0..2 {
        let node_xi = bar.node_xi(i);
        if bar.is_connected(i, dof) {
            conditions[(i, 0)] = 1.0;
            conditions[(i, 1)] = node_xi;
        } else {
            conditions[(i, 1)] = 1.0;
            released[i] = true;
        }
    }

    let coefficients = shape_coefficients(conditions, &released)?;
    Ok(evaluate_shape_functions(&coefficients, xi, 2))
}

/// `row · u`
pub(crate) fn row_dot(m: &Mat, row: usize, u: &DVector<f64>) -> f64 {
    m.row(row).iter().zip(u.iter()).map(|(a, b)| a * b).sum()
}
