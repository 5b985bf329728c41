//! Symptom flags reported on a notification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symptom recorded as a yes/no flag
///
/// Declaration order is the canonical order used for output and for breaking
/// ties between symptom pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    /// `FEBRE`
    Fever,
    /// `MIALGIA`
    Myalgia,
    /// `CEFALEIA`
    Headache,
    /// `EXANTEMA`
    Rash,
    /// `VOMITO`
    Vomiting,
    /// `NAUSEA`
    Nausea,
    /// `DOR_COSTAS`
    BackPain,
    /// `CONJUNTVIT`
    Conjunctivitis,
    /// `ARTRALGIA`
    Arthralgia,
    /// `DOR_RETRO`
    RetroOrbitalPain,
    /// `PETEQUIA_N`
    Petechiae,
}

impl Symptom {
    /// Every symptom in declaration order
    pub const ALL: [Self; 11] = [
        Self::Fever,
        Self::Myalgia,
        Self::Headache,
        Self::Rash,
        Self::Vomiting,
        Self::Nausea,
        Self::BackPain,
        Self::Conjunctivitis,
        Self::Arthralgia,
        Self::RetroOrbitalPain,
        Self::Petechiae,
    ];

    /// Default SINAN column name
    #[must_use]
    pub const fn default_column(self) -> &'static str {
        match self {
            Self::Fever => "FEBRE",
            Self::Myalgia => "MIALGIA",
            Self::Headache => "CEFALEIA",
            Self::Rash => "EXANTEMA",
            Self::Vomiting => "VOMITO",
            Self::Nausea => "NAUSEA",
            Self::BackPain => "DOR_COSTAS",
            Self::Conjunctivitis => "CONJUNTVIT",
            Self::Arthralgia => "ARTRALGIA",
            Self::RetroOrbitalPain => "DOR_RETRO",
            Self::Petechiae => "PETEQUIA_N",
        }
    }

    /// Stable key used in the bundle
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Fever => "fever",
            Self::Myalgia => "myalgia",
            Self::Headache => "headache",
            Self::Rash => "rash",
            Self::Vomiting => "vomiting",
            Self::Nausea => "nausea",
            Self::BackPain => "back_pain",
            Self::Conjunctivitis => "conjunctivitis",
            Self::Arthralgia => "arthralgia",
            Self::RetroOrbitalPain => "retro_orbital_pain",
            Self::Petechiae => "petechiae",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Set of symptoms present on one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymptomSet(u16);

impl SymptomSet {
    /// Empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Mark `symptom` as present
    pub fn insert(&mut self, symptom: Symptom) {
        self.0 |= symptom.bit();
    }

    /// Whether `symptom` is present
    #[must_use]
    pub const fn contains(self, symptom: Symptom) -> bool {
        self.0 & symptom.bit() != 0
    }

    /// Whether both symptoms are present
    #[must_use]
    pub const fn contains_both(self, a: Symptom, b: Symptom) -> bool {
        self.contains(a) && self.contains(b)
    }

    /// Number of symptoms present
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether no symptom is present
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Symptom> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = Symptom>>(iter: I) -> Self {
        let mut set = Self::new();
        for symptom in iter {
            set.insert(symptom);
        }
        set
    }
}
