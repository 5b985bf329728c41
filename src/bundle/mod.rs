//! The aggregate bundle: every computed block of one run, plus metadata and
//! data-quality figures, serialized as a single JSON document.
//!
//! Blocks that were not computed (not requested, or missing input columns)
//! are `None` and absent from the JSON; a computed block with no data is
//! present and empty.

pub mod writer;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::age::AgeNormalizationReport;
use crate::algorithm::aggregate::{CategoryCount, Overview};
use crate::algorithm::crosstab::{AgeBandStats, BandBreakdown, SexProfile, SymptomPair};
use crate::algorithm::regional::RegionalSummary;
use crate::config::Dimension;
use crate::error::Result;

pub use writer::write_bundle;

/// Where and when a bundle was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub crate_version: String,
    pub total_records: u64,
}

impl Metadata {
    #[must_use]
    pub fn new(source: impl Into<String>, total_records: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.into(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            total_records,
        }
    }
}

/// A requested block that could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDimension {
    pub dimension: Dimension,
    /// Logical columns whose absence prevented it
    pub missing_columns: Vec<String>,
}

/// Every non-fatal anomaly of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub rows_read: u64,
    pub rows_skipped: u64,
    /// Coercion failures per logical column
    pub coercion_failures: BTreeMap<String, u64>,
    pub columns_missing: Vec<String>,
    pub dimensions_skipped: Vec<SkippedDimension>,
    pub age: AgeNormalizationReport,
}

/// All statistics of one run, keyed by block name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateBundle {
    pub metadata: Metadata,
    pub overview: Overview,
    pub data_quality: DataQuality,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_region: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_year: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_month: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_sex: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_symptom: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_classification: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub by_outcome: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub age_bands: Option<Vec<AgeBandStats>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symptoms_by_age_band: Option<Vec<BandBreakdown>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sex_by_age_band: Option<Vec<BandBreakdown>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sex_profile: Option<Vec<SexProfile>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symptom_pairs: Option<Vec<SymptomPair>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub regional: Option<Vec<RegionalSummary>>,
}

impl AggregateBundle {
    /// A bundle with no blocks computed yet
    #[must_use]
    pub const fn new(metadata: Metadata, overview: Overview, data_quality: DataQuality) -> Self {
        Self {
            metadata,
            overview,
            data_quality,
            by_region: None,
            by_year: None,
            by_month: None,
            by_sex: None,
            by_symptom: None,
            by_classification: None,
            by_outcome: None,
            age_bands: None,
            symptoms_by_age_band: None,
            sex_by_age_band: None,
            sex_profile: None,
            symptom_pairs: None,
            regional: None,
        }
    }

    /// Whether a block was computed this run
    #[must_use]
    pub const fn has(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Region => self.by_region.is_some(),
            Dimension::Year => self.by_year.is_some(),
            Dimension::Month => self.by_month.is_some(),
            Dimension::Sex => self.by_sex.is_some(),
            Dimension::Symptom => self.by_symptom.is_some(),
            Dimension::Classification => self.by_classification.is_some(),
            Dimension::Outcome => self.by_outcome.is_some(),
            Dimension::AgeBand => self.age_bands.is_some(),
            Dimension::SymptomsByAgeBand => self.symptoms_by_age_band.is_some(),
            Dimension::SexByAgeBand => self.sex_by_age_band.is_some(),
            Dimension::SexProfile => self.sex_profile.is_some(),
            Dimension::SymptomPairs => self.symptom_pairs.is_some(),
            Dimension::Regional => self.regional.is_some(),
        }
    }

    /// Bundle keys of the computed blocks
    #[must_use]
    pub fn computed_keys(&self) -> Vec<&'static str> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.has(*d))
            .map(Dimension::bundle_key)
            .collect()
    }

    /// Serialize to JSON text
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
