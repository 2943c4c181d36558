//! Degrees of freedom and constraint states

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FEAError;

/// One of the six nodal degrees of freedom, in global numbering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dof {
    Dx,
    Dy,
    Dz,
    Rx,
    Ry,
    Rz,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::Dx, Dof::Dy, Dof::Dz, Dof::Rx, Dof::Ry, Dof::Rz];

    /// Component index 0..5
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Dof::Rx | Dof::Ry | Dof::Rz)
    }
}

/// State of a single degree of freedom
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DofConstraint {
    #[default]
    Released,
    Fixed,
}

/// Constraint state of the six DOFs of a node (or of a bar end connection)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraints {
    pub dx: DofConstraint,
    pub dy: DofConstraint,
    pub dz: DofConstraint,
    pub rx: DofConstraint,
    pub ry: DofConstraint,
    pub rz: DofConstraint,
}

impl Constraints {
    pub fn new(
        dx: DofConstraint,
        dy: DofConstraint,
        dz: DofConstraint,
        rx: DofConstraint,
        ry: DofConstraint,
        rz: DofConstraint,
    ) -> Self {
        Self { dx, dy, dz, rx, ry, rz }
    }

    /// All six DOFs free
    pub fn released() -> Self {
        Self::default()
    }

    /// All six DOFs restrained
    pub fn fixed() -> Self {
        Self::from_flags([true; 6])
    }

    /// Translations restrained, rotations free
    pub fn pinned() -> Self {
        Self::from_flags([true, true, true, false, false, false])
    }

    /// Rotations restrained, translations free
    pub fn fixed_rotations() -> Self {
        Self::from_flags([false, false, false, true, true, true])
    }

    /// `true` entries are `Fixed`, in `Dx..Rz` order
    pub fn from_flags(flags: [bool; 6]) -> Self {
        let c = |f: bool| {
            if f {
                DofConstraint::Fixed
            } else {
                DofConstraint::Released
            }
        };
        Self::new(
            c(flags[0]),
            c(flags[1]),
            c(flags[2]),
            c(flags[3]),
            c(flags[4]),
            c(flags[5]),
        )
    }

    pub fn get(&self, dof: Dof) -> DofConstraint {
        match dof {
            Dof::Dx => self.dx,
            Dof::Dy => self.dy,
            Dof::Dz => self.dz,
            Dof::Rx => self.rx,
            Dof::Ry => self.ry,
            Dof::Rz => self.rz,
        }
    }

    pub fn set(&mut self, dof: Dof, value: DofConstraint) {
        match dof {
            Dof::Dx => self.dx = value,
            Dof::Dy => self.dy = value,
            Dof::Dz => self.dz = value,
            Dof::Rx => self.rx = value,
            Dof::Ry => self.ry = value,
            Dof::Rz => self.rz = value,
        }
    }

    /// Builder form of [`Constraints::set`]
    pub fn with(mut self, dof: Dof, value: DofConstraint) -> Self {
        self.set(dof, value);
        self
    }

    pub fn is_fixed(&self, dof: Dof) -> bool {
        self.get(dof) == DofConstraint::Fixed
    }

    pub fn fixed_count(&self) -> usize {
        Dof::ALL.iter().filter(|d| self.is_fixed(**d)).count()
    }

    pub fn released_count(&self) -> usize {
        6 - self.fixed_count()
    }
}

impl FromStr for Constraints {
    type Err = FEAError;

    /// Six characters `F`/`R` (case insensitive) in `Dx..Rz` order, e.g. `"FFFRRR"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 6 {
            return Err(FEAError::InvalidArgument(format!(
                "constraint string '{}' must have 6 characters",
                s
            )));
        }

        let mut flags = [false; 6];
        for (flag, ch) in flags.iter_mut().zip(chars) {
            *flag = match ch.to_ascii_uppercase() {
                'F' | '1' => true,
                'R' | '0' => false,
                other => {
                    return Err(FEAError::InvalidArgument(format!(
                        "unknown constraint flag '{}'",
                        other
                    )))
                }
            };
        }
        Ok(Self::from_flags(flags))
    }
}
