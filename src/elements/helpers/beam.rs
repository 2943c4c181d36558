//! Euler-Bernoulli bending about one local transverse axis

use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

use super::{evaluate_shape_functions, row_dot, shape_coefficients, BarHelper};
use crate::elements::{BarElement, Dof};
use crate::error::{check_iso, FEAResult};
use crate::loads::Force;
use crate::math::Mat;
use crate::results::Displacement;

/// Bending plane selector
///
/// `Z` bends in the local x-y plane (deflection v, rotation Rz = v').
/// `Y` bends in the local x-z plane (deflection w, rotation Ry = -w').
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamDirection {
    Y,
    Z,
}

const Z_DOFS: [Dof; 2] = [Dof::Dy, Dof::Rz];
const Y_DOFS: [Dof; 2] = [Dof::Dz, Dof::Ry];

/// Cubic Hermite beam with end releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulerBernoulliBeamHelper {
    pub direction: BeamDirection,
}

impl EulerBernoulliBeamHelper {
    pub fn new(direction: BeamDirection) -> Self {
        Self { direction }
    }

    /// Coefficients of the four cubic shape functions, columns `[D0, R0, D1, R1]`
    ///
    /// Connected translation: value 1 at its node. Connected rotation: slope
    /// 1 at its node. A released rotation asks for zero curvature there and a
    /// released translation for zero third derivative.
    fn coefficients(&self, bar: &BarElement) -> FEAResult<Mat> {
        let [translation, rotation] = *self.dofs();
        let j = bar.jacobian();

        let mut conditions = Mat::zeros(4, 4);
        let mut released = [false; 4];
        for i in 0..2 {
            let s = bar.node_xi(i);
            let (t_row, r_row) = (2 * i, 2 * i + 1);

            if bar.is_connected(i, translation) {
                conditions.row_mut(t_row).copy_from_slice(&[1.0, s, s * s, s * s * s]);
            } else {
                conditions.row_mut(t_row).copy_from_slice(&[0.0, 0.0, 0.0, 6.0]);
                released[t_row] = true;
            }

            if bar.is_connected(i, rotation) {
                conditions
                    .row_mut(r_row)
                    .copy_from_slice(&[0.0, 1.0 / j, 2.0 * s / j, 3.0 * s * s / j]);
            } else {
                conditions.row_mut(r_row).copy_from_slice(&[0.0, 0.0, 2.0, 6.0 * s]);
                released[r_row] = true;
            }
        }

        let mut coefficients = shape_coefficients(conditions, &released)?;
        if self.direction == BeamDirection::Y {
            // Ry = -dw/dx
            for c in [1, 3] {
                coefficients.column_mut(c).neg_mut();
            }
        }
        Ok(coefficients)
    }

    fn dofs(&self) -> &'static [Dof; 2] {
        match self.direction {
            BeamDirection::Z => &Z_DOFS,
            BeamDirection::Y => &Y_DOFS,
        }
    }
}

impl BarHelper for EulerBernoulliBeamHelper {
    fn local_dofs(&self) -> &'static [Dof] {
        self.dofs()
    }

    fn n_max_order(&self) -> usize {
        3
    }

    fn b_max_order(&self) -> usize {
        1
    }

    fn shape_matrix_at(&self, bar: &BarElement, xi: f64) -> FEAResult<Mat> {
        check_iso(xi)?;
        bar.check_two_nodes()?;
        Ok(evaluate_shape_functions(&self.coefficients(bar)?, xi, 4))
    }

    fn strain_displacement_matrix_at(&self, bar: &BarElement, xi: f64) -> FEAResult<Mat> {
        let n = self.shape_matrix_at(bar, xi)?;
        let j = bar.jacobian();
        Ok(n.rows(2, 1) / (j * j))
    }

    fn rigidity_at(&self, bar: &BarElement, xi: f64) -> FEAResult<f64> {
        let section = bar.section.properties_at(xi)?;
        let material = bar.material.properties_at(xi)?;
        let i = match self.direction {
            BeamDirection::Z => section.iz,
            BeamDirection::Y => section.iy,
        };
        Ok(material.e * i)
    }

    fn mass_per_length_at(&self, bar: &BarElement, xi: f64) -> FEAResult<f64> {
        Ok(bar.material.properties_at(xi)?.rho * bar.section.properties_at(xi)?.a)
    }

    fn distributed_component(&self, q: &Vector3<f64>) -> f64 {
        match self.direction {
            BeamDirection::Z => q.y,
            BeamDirection::Y => q.z,
        }
    }

    fn point_load_at(&self, bar: &BarElement, xi: f64, force: &Force) -> FEAResult<DVector<f64>> {
        let n = self.shape_matrix_at(bar, xi)?;
        let j = bar.jacobian();
        Ok(DVector::from_fn(4, |c, _| match self.direction {
            BeamDirection::Z => n[(0, c)] * force.fy + n[(1, c)] / j * force.mz,
            BeamDirection::Y => n[(0, c)] * force.fz - n[(1, c)] / j * force.my,
        }))
    }

    fn carried_components(&self, force: &Force) -> Force {
        let mut kept = Force::zero();
        match self.direction {
            BeamDirection::Z => {
                kept.fy = force.fy;
                kept.mz = force.mz;
            }
            BeamDirection::Y => {
                kept.fz = force.fz;
                kept.my = force.my;
            }
        }
        kept
    }

    fn strain_from_internal_force(&self, force: &Force, rigidity: f64) -> f64 {
        match self.direction {
            BeamDirection::Z => force.mz / rigidity,
            BeamDirection::Y => -force.my / rigidity,
        }
    }

    fn strain_integrations(&self) -> usize {
        2
    }

    fn field_to_displacement(&self, value: f64, slope: f64) -> Displacement {
        let mut d = Displacement::zero();
        match self.direction {
            BeamDirection::Z => {
                d.dy = value;
                d.rz = slope;
            }
            BeamDirection::Y => {
                // Rotation sign differs between the two bending planes
                d.dz = value;
                d.ry = -slope;
            }
        }
        d
    }

    fn internal_displacement_from_nodal_values(
        &self,
        bar: &BarElement,
        local_displacements: &[Displacement; 2],
        xi: f64,
    ) -> FEAResult<Displacement> {
        check_iso(xi)?;
        let u = self.nodal_vector(local_displacements);
        if u.iter().all(|v| *v == 0.0) {
            return Ok(Displacement::zero());
        }

        let n = self.shape_matrix_at(bar, xi)?;
        let value = row_dot(&n, 0, &u);
        let slope = row_dot(&n, 1, &u) / bar.jacobian();
        Ok(self.field_to_displacement(value, slope))
    }

    fn internal_force_from_nodal_values(
        &self,
        bar: &BarElement,
        local_displacements: &[Displacement; 2],
        xi: f64,
    ) -> FEAResult<Force> {
        check_iso(xi)?;
        let u = self.nodal_vector(local_displacements);
        if u.iter().all(|v| *v == 0.0) {
            return Ok(Force::zero());
        }

        let n = self.shape_matrix_at(bar, xi)?;
        let j = bar.jacobian();
        let ei = self.rigidity_at(bar, xi)?;
        let curvature = row_dot(&n, 2, &u) / (j * j);
        let third = row_dot(&n, 3, &u) / (j * j * j);

        let mut f = Force::zero();
        match self.direction {
            BeamDirection::Z => {
                f.mz = ei * curvature;
                f.fy = -ei * third;
            }
            BeamDirection::Y => {
                f.my = -ei * curvature;
                f.fz = -ei * third;
            }
        }
        Ok(f)
    }
}
