//! The bar's regulars.

use std::{fmt, str::FromStr};

use super::error::ValidationError;

/// One of the fixed set of characters the backend can speak as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Persona {
    Bart,
    Bernie,
    Jb,
    Blanca,
    Hermes,
}

impl Persona {
    /// All personas, in the order they sit at the bar.
    pub const ALL: [Persona; 5] = [
        Persona::Bart,
        Persona::Bernie,
        Persona::Jb,
        Persona::Blanca,
        Persona::Hermes,
    ];

    /// Wire name used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Bart => "bart",
            Persona::Bernie => "bernie",
            Persona::Jb => "jb",
            Persona::Blanca => "blanca",
            Persona::Hermes => "hermes",
        }
    }

    /// Name tag shown above a bubble.
    pub fn tag(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Persona::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownPersona(s.to_string()))
    }
}
