//! Logical fields of a notification record and their source column names

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::symptom::Symptom;

/// Logical field read from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    NotificationDate,
    NotificationYear,
    Region,
    SubRegion,
    Sex,
    BirthYear,
    RawAge,
    Classification,
    Outcome,
    Symptom(Symptom),
}

impl Column {
    /// Every logical column, symptoms last in declaration order
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut columns = vec![
            Self::NotificationDate,
            Self::NotificationYear,
            Self::Region,
            Self::SubRegion,
            Self::Sex,
            Self::BirthYear,
            Self::RawAge,
            Self::Classification,
            Self::Outcome,
        ];
        columns.extend(Symptom::ALL.into_iter().map(Self::Symptom));
        columns
    }

    /// Default SINAN column name
    #[must_use]
    pub const fn default_source_name(self) -> &'static str {
        match self {
            Self::NotificationDate => "DT_NOTIFIC",
            Self::NotificationYear => "NU_ANO",
            Self::Region => "SG_UF_NOT",
            Self::SubRegion => "ID_MUNICIP",
            Self::Sex => "CS_SEXO",
            Self::BirthYear => "ANO_NASC",
            Self::RawAge => "NU_IDADE_N",
            Self::Classification => "CLASSI_FIN",
            Self::Outcome => "EVOLUCAO",
            Self::Symptom(symptom) => symptom.default_column(),
        }
    }

    /// Key used in configuration files and reports
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::NotificationDate => "notification_date".to_string(),
            Self::NotificationYear => "notification_year".to_string(),
            Self::Region => "region".to_string(),
            Self::SubRegion => "sub_region".to_string(),
            Self::Sex => "sex".to_string(),
            Self::BirthYear => "birth_year".to_string(),
            Self::RawAge => "raw_age".to_string(),
            Self::Classification => "classification".to_string(),
            Self::Outcome => "outcome".to_string(),
            Self::Symptom(symptom) => format!("symptom_{}", symptom.key()),
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Mapping from logical columns to source column names
///
/// Serialized as `{ "region": "SG_UF_NOT", ... }`; only overrides need to be
/// given, every other column keeps its SINAN default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    names: FxHashMap<Column, String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        let names = Column::all()
            .into_iter()
            .map(|c| (c, c.default_source_name().to_string()))
            .collect();
        Self { names }
    }
}

impl ColumnMapping {
    /// Create a mapping with SINAN defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source name for a logical column
    #[must_use]
    pub fn source_name(&self, column: Column) -> &str {
        self.names
            .get(&column)
            .map_or_else(|| column.default_source_name(), String::as_str)
    }

    /// Add or override a mapping
    pub fn set(&mut self, column: Column, source: &str) {
        self.names.insert(column, source.to_string());
    }

    /// Builder-style override
    #[must_use]
    pub fn with(mut self, column: Column, source: &str) -> Self {
        self.set(column, source);
        self
    }

    /// Resolve logical columns against a header row
    ///
    /// Matching is exact first, then case-insensitive.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ResolvedColumns {
        let mut indices = FxHashMap::default();
        let mut missing = Vec::new();

        for column in Column::all() {
            let wanted = self.source_name(column);
            let position = headers
                .iter()
                .position(|h| h.as_ref().trim() == wanted)
                .or_else(|| {
                    headers
                        .iter()
                        .position(|h| h.as_ref().trim().eq_ignore_ascii_case(wanted))
                });
            match position {
                Some(idx) => {
                    indices.insert(column, idx);
                }
                None => missing.push(column),
            }
        }

        ResolvedColumns { indices, missing }
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ordered: BTreeMap<String, &str> = Column::all()
            .into_iter()
            .map(|c| (c.key(), self.source_name(c)))
            .collect();
        ordered.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut mapping = Self::default();
        for (key, source) in overrides {
            let column = Column::from_key(&key)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown column key '{key}'")))?;
            mapping.set(column, &source);
        }
        Ok(mapping)
    }
}

/// Column positions found in one source
#[derive(Debug, Clone, Default)]
pub struct ResolvedColumns {
    indices: FxHashMap<Column, usize>,
    missing: Vec<Column>,
}

impl ResolvedColumns {
    /// Position of a logical column in the source row
    #[must_use]
    pub fn index(&self, column: Column) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    #[must_use]
    pub fn contains(&self, column: Column) -> bool {
        self.indices.contains_key(&column)
    }

    /// Logical columns absent from the source
    #[must_use]
    pub fn missing(&self) -> &[Column] {
        &self.missing
    }

    /// Logical columns found, with their positions
    pub fn iter(&self) -> impl Iterator<Item = (Column, usize)> + '_ {
        self.indices.iter().map(|(c, i)| (*c, *i))
    }
}
