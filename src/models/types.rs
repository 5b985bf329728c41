//! Common domain type definitions
//!
//! Coded categorical fields of a notification record. Each enum knows the
//! source code it is read from and the stable key used in the output bundle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::codes::parse_numeric_code;

/// Sex recorded on the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Female
    Female,
    /// Male
    Male,
    /// Explicitly recorded as ignored/unknown
    Unknown,
}

impl Sex {
    /// Parse a source code; `None` when the value is empty or unrecognized
    #[must_use]
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "f" | "female" | "feminino" => Some(Self::Female),
            "m" | "male" | "masculino" => Some(Self::Male),
            "i" | "ignored" | "ignorado" | "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Stable key used in the bundle
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Unknown => "unknown",
        }
    }

    /// All values in output order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Female, Self::Male, Self::Unknown]
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Final classification of the case (`CLASSI_FIN`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    /// Code 10
    Confirmed,
    /// Code 8
    Discarded,
    /// Code 11
    Inconclusive,
    /// Code 12
    DeathByDisease,
    /// Any other code, kept as-is
    Other(u16),
}

impl Classification {
    /// Parse a source code; `None` when the value is empty or not numeric
    #[must_use]
    pub fn from_code(s: &str) -> Option<Self> {
        let code = parse_numeric_code(s)?;
        let code = u16::try_from(code).ok()?;
        Some(Self::from(code))
    }

    /// Numeric source code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Confirmed => 10,
            Self::Discarded => 8,
            Self::Inconclusive => 11,
            Self::DeathByDisease => 12,
            Self::Other(code) => code,
        }
    }

    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Discarded => "discarded",
            Self::Inconclusive => "inconclusive",
            Self::DeathByDisease => "death_by_disease",
            Self::Other(_) => "other",
        }
    }
}

impl From<u16> for Classification {
    fn from(value: u16) -> Self {
        match value {
            10 => Self::Confirmed,
            8 => Self::Discarded,
            11 => Self::Inconclusive,
            12 => Self::DeathByDisease,
            other => Self::Other(other),
        }
    }
}

/// Clinical outcome of the case (`EVOLUCAO`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Code 1
    Cure,
    /// Code 2
    DeathByDisease,
    /// Code 3
    DeathOtherCause,
    /// Code 4
    DeathUnderInvestigation,
    /// Code 9
    Unknown,
}

impl Outcome {
    /// Parse a source code; `None` when the value is empty or not a known code
    #[must_use]
    pub fn from_code(s: &str) -> Option<Self> {
        match parse_numeric_code(s)? {
            1 => Some(Self::Cure),
            2 => Some(Self::DeathByDisease),
            3 => Some(Self::DeathOtherCause),
            4 => Some(Self::DeathUnderInvestigation),
            9 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Numeric source code
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Cure => 1,
            Self::DeathByDisease => 2,
            Self::DeathOtherCause => 3,
            Self::DeathUnderInvestigation => 4,
            Self::Unknown => 9,
        }
    }

    /// Stable key used in the bundle
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cure => "cure",
            Self::DeathByDisease => "death_by_disease",
            Self::DeathOtherCause => "death_other_cause",
            Self::DeathUnderInvestigation => "death_under_investigation",
            Self::Unknown => "unknown",
        }
    }

    /// All values in code order
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Cure,
            Self::DeathByDisease,
            Self::DeathOtherCause,
            Self::DeathUnderInvestigation,
            Self::Unknown,
        ]
    }
}
