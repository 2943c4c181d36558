//! Cross-section providers for bar elements

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{check_iso, FEAResult};

/// Section properties at one position along a bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Cross-sectional area
    pub a: f64,
    /// Moment of inertia about local y-axis
    pub iy: f64,
    /// Moment of inertia about local z-axis
    pub iz: f64,
    /// Torsional constant
    pub j: f64,
}

impl SectionProperties {
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self { a, iy, iz, j }
    }

    /// Create a rectangular section (`depth` along local y)
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iy = depth * width.powi(3) / 12.0;
        let iz = width * depth.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self::new(a, iy, iz, j)
    }

    /// Solid circle
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let i = std::f64::consts::PI * r.powi(4) / 4.0;
        Self::new(std::f64::consts::PI * r.powi(2), i, i, 2.0 * i)
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::new(
            mix(self.a, other.a),
            mix(self.iy, other.iy),
            mix(self.iz, other.iz),
            mix(self.j, other.j),
        )
    }
}

/// Cross-section of a bar, evaluated at an iso coordinate
pub trait CrossSection: Debug + Send + Sync {
    /// Properties at ξ ∈ [-1, 1]
    fn properties_at(&self, xi: f64) -> FEAResult<SectionProperties>;

    /// Polynomial order of the properties along the bar (0 = constant)
    fn max_order(&self) -> usize;
}

/// Prismatic section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformSection {
    pub properties: SectionProperties,
}

impl UniformSection {
    pub fn new(properties: SectionProperties) -> Self {
        Self { properties }
    }
}

impl CrossSection for UniformSection {
    fn properties_at(&self, xi: f64) -> FEAResult<SectionProperties> {
        check_iso(xi)?;
        Ok(self.properties)
    }

    fn max_order(&self) -> usize {
        0
    }
}

impl Default for UniformSection {
    fn default() -> Self {
        // 200mm x 200mm rectangle
        Self::new(SectionProperties::rectangular(0.2, 0.2))
    }
}

/// Section whose properties vary linearly between the two ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaperedSection {
    pub start: SectionProperties,
    pub end: SectionProperties,
}

impl TaperedSection {
    pub fn new(start: SectionProperties, end: SectionProperties) -> Self {
        Self { start, end }
    }
}

impl CrossSection for TaperedSection {
    fn properties_at(&self, xi: f64) -> FEAResult<SectionProperties> {
        check_iso(xi)?;
        Ok(self.start.lerp(&self.end, (xi + 1.0) / 2.0))
    }

    fn max_order(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_section() {
        let section = SectionProperties::rectangular(0.3, 0.5);
        assert_relative_eq!(section.a, 0.15);
        assert_relative_eq!(section.iz, 0.3 * 0.5_f64.powi(3) / 12.0);
        assert_relative_eq!(section.iy, 0.5 * 0.3_f64.powi(3) / 12.0);
    }

    #[test]
    fn test_circular_section() {
        let section = SectionProperties::circular(0.5);
        assert_relative_eq!(section.a, std::f64::consts::PI * 0.0625);
        assert_relative_eq!(section.iy, section.iz);
        assert_relative_eq!(section.j, section.iy + section.iz);
    }

    #[test]
    fn test_tapered_midpoint() {
        let tapered = TaperedSection::new(
            SectionProperties::new(1.0, 2.0, 3.0, 4.0),
            SectionProperties::new(3.0, 4.0, 5.0, 6.0),
        );
        let mid = tapered.properties_at(0.0).unwrap();
        assert_relative_eq!(mid.a, 2.0);
        assert_relative_eq!(mid.j, 5.0);
        assert!(tapered.properties_at(-1.5).is_err());
    }
}
