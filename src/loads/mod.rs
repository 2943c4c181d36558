//! Load cases, nodal loads and element loads

mod element_load;
mod force;
mod load_case;
mod nodal_load;

pub use element_load::{
    ConcentratedLoad, CoordinationSystem, ElementalLoad, PartialNonUniformLoad, UniformLoad,
};
pub use force::Force;
pub use load_case::{LoadCase, LoadType};
pub use nodal_load::NodalLoad;
