//! Saint-Venant torsion

use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

use super::{linear_shape_matrix, row_dot, BarHelper};
use crate::elements::{BarElement, Dof};
use crate::error::{check_iso, FEAResult};
use crate::loads::Force;
use crate::math::Mat;
use crate::results::Displacement;

/// Linear twist field about local x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShaftHelper;

impl BarHelper for ShaftHelper {
    fn local_dofs(&self) -> &'static [Dof] {
        &[Dof::Rx]
    }

    fn n_max_order(&self) -> usize {
        1
    }

    fn b_max_order(&self) -> usize {
        0
    }

    fn shape_matrix_at(&self, bar: &BarElement, xi: f64) -> FEAResult<Mat> {
        linear_shape_matrix(bar, Dof::Rx, xi)
    }

    fn strain_displacement_matrix_at(&self, bar: &BarElement, xi: f64) -> FEAResult<Mat> {
        Ok(self.shape_matrix_at(bar, xi)?.rows(1, 1) / bar.jacobian())
    }

    fn rigidity_at(&self, bar: &BarElement, xi: f64) -> FEAResult<f64> {
        Ok(bar.material.properties_at(xi)?.g * bar.section.properties_at(xi)?.j)
    }

    fn mass_per_length_at(&self, bar: &BarElement, xi: f64) -> FEAResult<f64> {
        let section = bar.section.properties_at(xi)?;
        Ok(bar.material.properties_at(xi)?.rho * (section.iy + section.iz))
    }

    /// Line forces act through the axis and carry no torque
    fn distributed_component(&self, _q: &Vector3<f64>) -> f64 {
        0.0
    }

    fn point_load_at(&self, bar: &BarElement, xi: f64, force: &Force) -> FEAResult<DVector<f64>> {
        let n = self.shape_matrix_at(bar, xi)?;
        Ok(DVector::from_fn(2, |c, _| n[(0, c)] * force.mx))
    }

    fn carried_components(&self, force: &Force) -> Force {
        Force::new(0.0, 0.0, 0.0, force.mx, 0.0, 0.0)
    }

    fn strain_from_internal_force(&self, force: &Force, rigidity: f64) -> f64 {
        force.mx / rigidity
    }

    fn strain_integrations(&self) -> usize {
        1
    }

    fn field_to_displacement(&self, value: f64, _slope: f64) -> Displacement {
        Displacement::new(0.0, 0.0, 0.0, value, 0.0, 0.0)
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
        Ok(self.field_to_displacement(row_dot(&n, 0, &u), 0.0))
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
        let twist = row_dot(&n, 1, &u) / bar.jacobian();
        Ok(Force::new(0.0, 0.0, 0.0, self.rigidity_at(bar, xi)? * twist, 0.0, 0.0))
    }
}
