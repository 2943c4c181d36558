//! FEA Static - linear static finite element analysis of 3D bar structures
//!
//! The model is partitioned into free and fixed degrees of freedom, the free
//! block of the stiffness matrix is factored once with a sparse Cholesky
//! decomposition and every load case reuses that factor.
//!
//! Bars combine independent behaviours:
//! - Euler-Bernoulli bending about local y and local z
//! - Axial (truss) and torsional (shaft) behaviour
//! - End releases, tapered sections, uniform, partial polynomial and
//!   concentrated member loads
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fea_static::prelude::*;
//!
//! let mut model = Model::new();
//! let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
//! let n2 = model.add_node(Node::new(10.0, 0.0, 0.0));
//!
//! let section = Arc::new(UniformSection::new(SectionProperties::rectangular(0.3, 0.5)));
//! let material = Arc::new(UniformIsotropicMaterial::steel());
//! model.add_element(BarElement::new(n1, n2, section, material)).unwrap();
//!
//! let dead = LoadCase::dead("Dead");
//! model.add_nodal_load(n2, NodalLoad::force(0.0, -10000.0, 0.0, dead.clone())).unwrap();
//!
//! model.solve().unwrap();
//! let tip = model.node_displacement(n2, &dead).unwrap();
//! assert!(tip.dy < 0.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, StaticLinearAnalysisResult};
    pub use crate::elements::{
        BarBehaviour, BarElement, BarReleases, Constraints, CrossSection, Dof, DofConstraint,
        Node, SectionProperties, TaperedSection, UniformIsotropicMaterial, UniformSection,
    };
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::loads::{
        ConcentratedLoad, CoordinationSystem, ElementalLoad, Force, LoadCase, LoadType,
        NodalLoad, PartialNonUniformLoad, UniformLoad,
    };
    pub use crate::model::Model;
    pub use crate::results::{AnalysisSummary, CaseResult, Displacement};
}
