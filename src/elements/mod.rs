//! Structural elements module

mod bar;
mod dof;
pub mod helpers;
mod material;
mod node;
mod section;

pub use bar::{BarBehaviour, BarElement, BarReleases};
pub use dof::{Constraints, Dof, DofConstraint};
pub use helpers::{
    BarHelper, BeamDirection, ElementHelper, EulerBernoulliBeamHelper, ShaftHelper, TrussHelper,
};
pub use material::{BarMaterial, MaterialProperties, UniformIsotropicMaterial};
pub use node::Node;
pub use section::{CrossSection, SectionProperties, TaperedSection, UniformSection};
