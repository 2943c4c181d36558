//! Six component force/moment value

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::elements::Dof;

/// Forces along and moments about the three axes of some frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Force {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl Force {
    pub fn new(fx: f64, fy: f64, fz: f64, mx: f64, my: f64, mz: f64) -> Self {
        Self { fx, fy, fz, mx, my, mz }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_vectors(forces: &Vector3<f64>, moments: &Vector3<f64>) -> Self {
        Self::new(forces.x, forces.y, forces.z, moments.x, moments.y, moments.z)
    }

    /// `[FX, FY, FZ, MX, MY, MZ]`
    pub fn from_array(values: [f64; 6]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4], values[5])
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    pub fn forces(&self) -> Vector3<f64> {
        Vector3::new(self.fx, self.fy, self.fz)
    }

    pub fn moments(&self) -> Vector3<f64> {
        Vector3::new(self.mx, self.my, self.mz)
    }

    pub fn component(&self, dof: Dof) -> f64 {
        self.as_array()[dof.index()]
    }

    pub fn set_component(&mut self, dof: Dof, value: f64) {
        match dof {
            Dof::Dx => self.fx = value,
            Dof::Dy => self.fy = value,
            Dof::Dz => self.fz = value,
            Dof::Rx => self.mx = value,
            Dof::Ry => self.my = value,
            Dof::Rz => self.mz = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_array().iter().all(|v| *v == 0.0)
    }

    /// Statically equivalent force at `to` for this force acting at `from`
    ///
    /// The force is unchanged and the moment picks up `(from - to) × F`.
    pub fn move_to(&self, from: &Vector3<f64>, to: &Vector3<f64>) -> Self {
        let f = self.forces();
        let m = self.moments() + (from - to).cross(&f);
        Self::from_vectors(&f, &m)
    }
}

impl Add for Force {
    type Output = Force;

    fn add(self, rhs: Force) -> Force {
        Force::new(
            self.fx + rhs.fx,
            self.fy + rhs.fy,
            self.fz + rhs.fz,
            self.mx + rhs.mx,
            self.my + rhs.my,
            self.mz + rhs.mz,
        )
    }
}

impl AddAssign for Force {
    fn add_assign(&mut self, rhs: Force) {
        *self = *self + rhs;
    }
}

impl Sub for Force {
    type Output = Force;

    fn sub(self, rhs: Force) -> Force {
        self + (-rhs)
    }
}

impl Neg for Force {
    type Output = Force;

    fn neg(self) -> Force {
        self * -1.0
    }
}

impl Mul<f64> for Force {
    type Output = Force;

    fn mul(self, factor: f64) -> Force {
        Force::new(
            self.fx * factor,
            self.fy * factor,
            self.fz * factor,
            self.mx * factor,
            self.my * factor,
            self.mz * factor,
        )
    }
}
