//! Local/global frame bookkeeping for straight bar elements

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};
use crate::loads::Force;
use crate::math::Mat12;
use crate::results::Displacement;

/// Rotation between the global frame and an element's local frame
///
/// Rows of `lambda` are the local x, y, z axes expressed in global
/// coordinates, so `local = lambda * global`.
///
/// Axis convention:
/// - local x runs from the start node to the end node
/// - vertical members: local y is -X when pointing up (+X when down), z = Z
/// - horizontal members: local y is global Y, z = x × y
/// - inclined members: z is horizontal and perpendicular to x, y = z × x
///
/// The web rotation then turns y and z about local x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformationManager {
    lambda: Matrix3<f64>,
}

impl TransformationManager {
    /// Frame of the segment `start -> end` with a web rotation in radians
    pub fn for_bar(start: &Vector3<f64>, end: &Vector3<f64>, web_rotation: f64) -> FEAResult<Self> {
        let d = end - start;
        let length = d.norm();
        if length < 1e-10 {
            return Err(FEAError::InvalidGeometry(
                "bar element has zero length".to_string(),
            ));
        }
        let x = d / length;

        let (y, z) = if x.x.abs() < 1e-10 && x.z.abs() < 1e-10 {
            // Vertical
            if x.y > 0.0 {
                (Vector3::new(-1.0, 0.0, 0.0), Vector3::z())
            } else {
                (Vector3::new(1.0, 0.0, 0.0), Vector3::z())
            }
        } else if d.y.abs() < 1e-10 {
            // Horizontal
            let y = Vector3::y();
            (y, x.cross(&y).normalize())
        } else {
            // Inclined: keep z in the horizontal plane
            let proj = Vector3::new(d.x, 0.0, d.z);
            let z = if x.y > 0.0 {
                proj.cross(&x)
            } else {
                x.cross(&proj)
            }
            .normalize();
            (z.cross(&x).normalize(), z)
        };

        let (y, z) = if web_rotation.abs() > 1e-10 {
            let (s, c) = web_rotation.sin_cos();
            (y * c + z * s, z * c - y * s)
        } else {
            (y, z)
        };

        Ok(Self {
            lambda: Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]),
        })
    }

    /// Identity frame (local axes coincide with global axes)
    pub fn identity() -> Self {
        Self {
            lambda: Matrix3::identity(),
        }
    }

    /// Direction cosine matrix
    pub fn lambda(&self) -> &Matrix3<f64> {
        &self.lambda
    }

    pub fn global_to_local_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.lambda * v
    }

    pub fn local_to_global_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.lambda.transpose() * v
    }

    pub fn global_to_local_force(&self, f: &Force) -> Force {
        Force::from_vectors(
            &self.global_to_local_vector(&f.forces()),
            &self.global_to_local_vector(&f.moments()),
        )
    }

    pub fn local_to_global_force(&self, f: &Force) -> Force {
        Force::from_vectors(
            &self.local_to_global_vector(&f.forces()),
            &self.local_to_global_vector(&f.moments()),
        )
    }

    pub fn global_to_local_displacement(&self, d: &Displacement) -> Displacement {
        Displacement::from_vectors(
            &self.global_to_local_vector(&d.translations()),
            &self.global_to_local_vector(&d.rotations()),
        )
    }

    pub fn local_to_global_displacement(&self, d: &Displacement) -> Displacement {
        Displacement::from_vectors(
            &self.local_to_global_vector(&d.translations()),
            &self.local_to_global_vector(&d.rotations()),
        )
    }

    /// Block diagonal 12x12 transform for a two-node element (`local = T * global`)
    pub fn transformation_matrix(&self) -> Mat12 {
        let mut t = Mat12::zeros();
        for block in 0..4 {
            let offset = block * 3;
            t.fixed_view_mut::<3, 3>(offset, offset).copy_from(&self.lambda);
        }
        t
    }
}
