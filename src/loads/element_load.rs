//! Loads applied along bar elements

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{Force, LoadCase};
use crate::error::{check_iso, FEAError, FEAResult};
use crate::math::{Polynomial1D, TransformationManager};

/// Frame in which a load's direction or components are given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinationSystem {
    /// Element local axes
    Local,
    /// Global axes
    #[default]
    Global,
}

/// Constant line load over the whole element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformLoad {
    /// Direction of the load, normalised when applied
    pub direction: Vector3<f64>,
    /// Force per unit length along `direction`
    pub magnitude: f64,
    pub coordination: CoordinationSystem,
    pub case: LoadCase,
}

impl UniformLoad {
    pub fn new(
        direction: Vector3<f64>,
        magnitude: f64,
        coordination: CoordinationSystem,
        case: LoadCase,
    ) -> Self {
        Self {
            direction,
            magnitude,
            coordination,
            case,
        }
    }
}

/// Line load over part of the element whose severity varies with ξ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialNonUniformLoad {
    pub direction: Vector3<f64>,
    /// Force per unit length as a function of the iso coordinate ξ
    pub severity: Polynomial1D,
    pub start_xi: f64,
    pub end_xi: f64,
    pub coordination: CoordinationSystem,
    pub case: LoadCase,
}

impl PartialNonUniformLoad {
    pub fn new(
        direction: Vector3<f64>,
        severity: Polynomial1D,
        start_xi: f64,
        end_xi: f64,
        coordination: CoordinationSystem,
        case: LoadCase,
    ) -> Self {
        Self {
            direction,
            severity,
            start_xi,
            end_xi,
            coordination,
            case,
        }
    }

    /// Linearly varying load from `start_value` at `start_xi` to `end_value` at `end_xi`
    pub fn linear(
        direction: Vector3<f64>,
        start_xi: f64,
        start_value: f64,
        end_xi: f64,
        end_value: f64,
        coordination: CoordinationSystem,
        case: LoadCase,
    ) -> FEAResult<Self> {
        if end_xi <= start_xi {
            return Err(FEAError::InvalidArgument(format!(
                "load span [{}, {}] is empty",
                start_xi, end_xi
            )));
        }
        let slope = (end_value - start_value) / (end_xi - start_xi);
        let severity = Polynomial1D::linear(start_value - slope * start_xi, slope);
        Ok(Self::new(direction, severity, start_xi, end_xi, coordination, case))
    }
}

/// Point force and moment at an iso location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentratedLoad {
    pub force: Force,
    pub xi: f64,
    pub coordination: CoordinationSystem,
    pub case: LoadCase,
}

impl ConcentratedLoad {
    pub fn new(force: Force, xi: f64, coordination: CoordinationSystem, case: LoadCase) -> Self {
        Self {
            force,
            xi,
            coordination,
            case,
        }
    }
}

/// Any load carried by a bar element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementalLoad {
    Uniform(UniformLoad),
    PartialNonUniform(PartialNonUniformLoad),
    Concentrated(ConcentratedLoad),
}

impl ElementalLoad {
    pub fn case(&self) -> &LoadCase {
        match self {
            Self::Uniform(l) => &l.case,
            Self::PartialNonUniform(l) => &l.case,
            Self::Concentrated(l) => &l.case,
        }
    }

    /// Polynomial degree of the severity in ξ (zero for point loads)
    pub fn degree(&self) -> usize {
        match self {
            Self::PartialNonUniform(l) => l.severity.degree(),
            _ => 0,
        }
    }

    /// Iso span `[ξ0, ξ1]` covered by a distributed load, clipped to the element
    ///
    /// Point loads report the degenerate span at their location.
    pub fn iso_span(&self) -> (f64, f64) {
        match self {
            Self::Uniform(_) => (-1.0, 1.0),
            Self::PartialNonUniform(l) => (l.start_xi.max(-1.0), l.end_xi.min(1.0)),
            Self::Concentrated(l) => (l.xi, l.xi),
        }
    }

    /// Distributed intensity at ξ in element local axes (force per unit length)
    ///
    /// Zero outside the load span and for point loads.
    pub fn local_intensity_at(&self, tm: &TransformationManager, xi: f64) -> Vector3<f64> {
        let (direction, value, coordination) = match self {
            Self::Uniform(l) => (l.direction, l.magnitude, l.coordination),
            Self::PartialNonUniform(l) => {
                if xi < l.start_xi || xi > l.end_xi {
                    return Vector3::zeros();
                }
                (l.direction, l.severity.evaluate(xi), l.coordination)
            }
            Self::Concentrated(_) => return Vector3::zeros(),
        };

        let q = direction.normalize() * value;
        match coordination {
            CoordinationSystem::Local => q,
            CoordinationSystem::Global => tm.global_to_local_vector(&q),
        }
    }

    /// Point force in element local axes, `None` for distributed loads
    pub fn local_point_force(&self, tm: &TransformationManager) -> Option<(f64, Force)> {
        match self {
            Self::Concentrated(l) => {
                let force = match l.coordination {
                    CoordinationSystem::Local => l.force,
                    CoordinationSystem::Global => tm.global_to_local_force(&l.force),
                };
                Some((l.xi, force))
            }
            _ => None,
        }
    }

    /// Reject loads that cannot be applied to any element
    pub fn validate(&self) -> FEAResult<()> {
        match self {
            Self::Uniform(l) => check_direction(&l.direction),
            Self::PartialNonUniform(l) => {
                check_direction(&l.direction)?;
                check_iso(l.start_xi)?;
                check_iso(l.end_xi)?;
                if l.end_xi <= l.start_xi {
                    return Err(FEAError::InvalidArgument(format!(
                        "load span [{}, {}] is empty",
                        l.start_xi, l.end_xi
                    )));
                }
                Ok(())
            }
            Self::Concentrated(l) => check_iso(l.xi),
        }
    }
}

fn check_direction(direction: &Vector3<f64>) -> FEAResult<()> {
    let norm = direction.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(FEAError::InvalidArgument(format!(
            "load direction {:?} cannot be normalised",
            direction.as_slice()
        )));
    }
    Ok(())
}

impl From<UniformLoad> for ElementalLoad {
    fn from(load: UniformLoad) -> Self {
        Self::Uniform(load)
    }
}

impl From<PartialNonUniformLoad> for ElementalLoad {
    fn from(load: PartialNonUniformLoad) -> Self {
        Self::PartialNonUniform(load)
    }
}

impl From<ConcentratedLoad> for ElementalLoad {
    fn from(load: ConcentratedLoad) -> Self {
        Self::Concentrated(load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_partial_load() {
        let load = PartialNonUniformLoad::linear(
            Vector3::new(0.0, 0.0, -2.0),
            -0.5,
            10.0,
            0.5,
            20.0,
            CoordinationSystem::Local,
            LoadCase::default(),
        )
        .unwrap();
        let load = ElementalLoad::from(load);
        let tm = TransformationManager::identity();

        assert_relative_eq!(load.local_intensity_at(&tm, 0.0).z, -15.0);
        assert_eq!(load.local_intensity_at(&tm, 0.75), Vector3::zeros());
        assert_eq!(load.degree(), 1);
        assert_eq!(load.iso_span(), (-0.5, 0.5));
    }

    #[test]
    fn test_validation() {
        let zero_dir = ElementalLoad::from(UniformLoad::new(
            Vector3::zeros(),
            1.0,
            CoordinationSystem::Global,
            LoadCase::default(),
        ));
        assert!(zero_dir.validate().is_err());

        let outside = ElementalLoad::from(ConcentratedLoad::new(
            Force::zero(),
            1.5,
            CoordinationSystem::Local,
            LoadCase::default(),
        ));
        assert!(matches!(outside.validate(), Err(FEAError::OutOfRange(_))));
    }
}
