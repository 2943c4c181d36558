//! Load cases

use std::fmt;

use serde::{Deserialize, Serialize};

/// Nature of the loads grouped by a case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadType {
    #[default]
    Default,
    Dead,
    Live,
    Snow,
    Wind,
    Quake,
    Other,
}

/// A load case groups related loads under a common name
///
/// Cases compare by name and type; results are stored per case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadCase {
    pub name: String,
    pub load_type: LoadType,
}

impl LoadCase {
    pub fn new(name: &str, load_type: LoadType) -> Self {
        Self {
            name: name.to_string(),
            load_type,
        }
    }

    /// The unnamed case every load falls into when none is given
    pub fn default_case() -> Self {
        Self::new("", LoadType::Default)
    }

    pub fn dead(name: &str) -> Self {
        Self::new(name, LoadType::Dead)
    }

    pub fn live(name: &str) -> Self {
        Self::new(name, LoadType::Live)
    }

    pub fn wind(name: &str) -> Self {
        Self::new(name, LoadType::Wind)
    }

    pub fn snow(name: &str) -> Self {
        Self::new(name, LoadType::Snow)
    }

    pub fn quake(name: &str) -> Self {
        Self::new(name, LoadType::Quake)
    }
}

impl Default for LoadCase {
    fn default() -> Self {
        Self::default_case()
    }
}

impl fmt::Display for LoadCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<default {:?}>", self.load_type)
        } else {
            write!(f, "{} ({:?})", self.name, self.load_type)
        }
    }
}
