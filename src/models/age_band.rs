//! Fixed age bands used by every demographic breakdown

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed-open age band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    /// [0, 5)
    #[serde(rename = "0-4")]
    Under5,
    /// [5, 15)
    #[serde(rename = "5-14")]
    From5To14,
    /// [15, 30)
    #[serde(rename = "15-29")]
    From15To29,
    /// [30, 45)
    #[serde(rename = "30-44")]
    From30To44,
    /// [45, 60)
    #[serde(rename = "45-59")]
    From45To59,
    /// [60, ∞)
    #[serde(rename = "60+")]
    Over60,
}

impl AgeBand {
    /// All bands in ascending order
    pub const ALL: [Self; 6] = [
        Self::Under5,
        Self::From5To14,
        Self::From15To29,
        Self::From30To44,
        Self::From45To59,
        Self::Over60,
    ];

    /// Band containing `age` years
    #[must_use]
    pub const fn from_age(age: u8) -> Self {
        match age {
            0..=4 => Self::Under5,
            5..=14 => Self::From5To14,
            15..=29 => Self::From15To29,
            30..=44 => Self::From30To44,
            45..=59 => Self::From45To59,
            _ => Self::Over60,
        }
    }

    /// Output label, e.g. `"15-29"`
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Under5 => "0-4",
            Self::From5To14 => "5-14",
            Self::From15To29 => "15-29",
            Self::From30To44 => "30-44",
            Self::From45To59 => "45-59",
            Self::Over60 => "60+",
        }
    }

    /// Position in [`AgeBand::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
