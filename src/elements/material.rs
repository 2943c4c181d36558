//! Material providers for bar elements

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{check_iso, FEAError, FEAResult};

/// Material properties at one position along a bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Mass density
    pub rho: f64,
}

/// Material of a bar, evaluated at an iso coordinate
pub trait BarMaterial: Debug + Send + Sync {
    /// Properties at ξ ∈ [-1, 1]
    fn properties_at(&self, xi: f64) -> FEAResult<MaterialProperties>;

    /// Polynomial order of the properties along the bar (0 = constant)
    fn max_order(&self) -> usize;
}

/// Homogeneous isotropic material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformIsotropicMaterial {
    pub properties: MaterialProperties,
}

impl UniformIsotropicMaterial {
    /// From E and ν, with G = E / (2 (1 + ν))
    pub fn from_young_poisson(e: f64, nu: f64) -> FEAResult<Self> {
        if !(e > 0.0) || !(-1.0 < nu && nu < 0.5) {
            return Err(FEAError::InvalidArgument(format!(
                "E = {} and nu = {} do not describe an isotropic material",
                e, nu
            )));
        }
        Ok(Self {
            properties: MaterialProperties {
                e,
                g: e / (2.0 * (1.0 + nu)),
                nu,
                rho: 0.0,
            },
        })
    }

    /// From G and ν, with E = 2 G (1 + ν)
    pub fn from_shear_poisson(g: f64, nu: f64) -> FEAResult<Self> {
        Self::from_young_poisson(2.0 * g * (1.0 + nu), nu)
    }

    pub fn with_density(mut self, rho: f64) -> Self {
        self.properties.rho = rho;
        self
    }

    /// Structural steel
    pub fn steel() -> Self {
        Self {
            properties: MaterialProperties {
                e: 200e9,
                g: 77e9,
                nu: 0.3,
                rho: 7850.0,
            },
        }
    }
}

impl BarMaterial for UniformIsotropicMaterial {
    fn properties_at(&self, xi: f64) -> FEAResult<MaterialProperties> {
        check_iso(xi)?;
        Ok(self.properties)
    }

    fn max_order(&self) -> usize {
        0
    }
}

impl Default for UniformIsotropicMaterial {
    fn default() -> Self {
        Self::steel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_isotropic_material() {
        let mat = UniformIsotropicMaterial::from_young_poisson(200e9, 0.3).unwrap();
        assert_relative_eq!(mat.properties.g, 200e9 / 2.6);

        let back = UniformIsotropicMaterial::from_shear_poisson(mat.properties.g, 0.3).unwrap();
        assert_relative_eq!(back.properties.e, 200e9, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_bad_constants() {
        assert!(UniformIsotropicMaterial::from_young_poisson(-1.0, 0.3).is_err());
        assert!(UniformIsotropicMaterial::from_young_poisson(1.0, 0.5).is_err());
        assert!(UniformIsotropicMaterial::steel().properties_at(2.0).is_err());
    }
}
