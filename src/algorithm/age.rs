//! Age normalization
//!
//! Recovers an age in years for each record by trying the configured rules in
//! order, then reports how many ages were recovered by which rule. Ages outside
//! [0, 120] are discarded, never clamped.

use std::collections::BTreeMap;

use log::{info, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::percentage;
use crate::config::{AgeNormalizationConfig, AgeRule, RawAgeEncoding};
use crate::models::case::{AgeSource, CaseRecord, NormalizedCase};

/// Oldest plausible age in years
pub const MAX_AGE: f64 = 120.0;

/// How many ages were recovered, and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeNormalizationReport {
    pub total_records: u64,
    pub valid_ages: u64,
    pub missing_ages: u64,
    /// Share of records excluded from age-based blocks
    pub missing_percentage: f64,
    /// Records per rule that produced the age
    pub by_source: BTreeMap<String, u64>,
}

impl AgeNormalizationReport {
    #[must_use]
    pub fn from_cases(cases: &[NormalizedCase]) -> Self {
        let mut by_source: BTreeMap<String, u64> = AgeSource::ALL
            .iter()
            .map(|s| (s.key().to_string(), 0))
            .collect();
        for case in cases {
            *by_source.entry(case.age_source.key().to_string()).or_insert(0) += 1;
        }

        let total_records = cases.len() as u64;
        let valid_ages = cases.iter().filter(|c| c.age.is_some()).count() as u64;
        let missing_ages = total_records - valid_ages;

        Self {
            total_records,
            valid_ages,
            missing_ages,
            missing_percentage: percentage(missing_ages, total_records),
            by_source,
        }
    }
}

/// Derives a normalized age for each record
#[derive(Debug, Clone, Copy)]
pub struct AgeNormalizer<'a> {
    config: &'a AgeNormalizationConfig,
}

impl<'a> AgeNormalizer<'a> {
    #[must_use]
    pub const fn new(config: &'a AgeNormalizationConfig) -> Self {
        Self { config }
    }

    /// Age in years and the rule that produced it
    #[must_use]
    pub fn resolve(&self, record: &CaseRecord) -> (Option<u8>, AgeSource) {
        for rule in &self.config.rules {
            let resolved = match rule {
                AgeRule::BirthYear => from_birth_year(record).map(|age| (age, AgeSource::BirthYear)),
                AgeRule::RawAge => self.from_raw_age(record),
            };
            if let Some((age, source)) = resolved {
                return (Some(age), source);
            }
        }
        (None, AgeSource::Unresolved)
    }

    /// Attach the normalized age to a record
    #[must_use]
    pub fn normalize(&self, record: CaseRecord) -> NormalizedCase {
        let (age, age_source) = self.resolve(&record);
        trace!(
            "age {age:?} via {} (birth year {:?}, raw age {:?})",
            age_source.key(),
            record.birth_year,
            record.raw_age
        );
        NormalizedCase {
            record,
            age,
            age_source,
        }
    }

    /// Normalize every record in parallel, keeping input order
    #[must_use]
    pub fn normalize_all(
        &self,
        records: Vec<CaseRecord>,
    ) -> (Vec<NormalizedCase>, AgeNormalizationReport) {
        let cases: Vec<NormalizedCase> = records
            .into_par_iter()
            .map(|record| self.normalize(record))
            .collect();
        let report = AgeNormalizationReport::from_cases(&cases);

        info!(
            "Normalized ages: {} of {} records have an age ({:.1}% excluded from age bands)",
            report.valid_ages, report.total_records, report.missing_percentage
        );
        (cases, report)
    }

    fn from_raw_age(&self, record: &CaseRecord) -> Option<(u8, AgeSource)> {
        let raw = record.raw_age?;
        match self.config.raw_age_encoding {
            RawAgeEncoding::Magnitude => {
                if raw > self.config.days_threshold {
                    valid_age((raw / self.config.days_per_year).round())
                        .map(|age| (age, AgeSource::RawDays))
                } else {
                    valid_age(raw).map(|age| (age, AgeSource::RawYears))
                }
            }
            RawAgeEncoding::UnitPrefixed => self
                .decode_unit_prefixed(raw)
                .and_then(valid_age)
                .map(|age| (age, AgeSource::RawUnitPrefixed)),
        }
    }

    /// Years encoded by a SINAN `NU_IDADE_N` value such as `4025` or `3006`
    fn decode_unit_prefixed(&self, raw: f64) -> Option<f64> {
        if raw.fract() != 0.0 || !(1000.0..5000.0).contains(&raw) {
            return None;
        }
        // Integral and below 5000 by the check above
        let code = raw as u32;
        let amount = f64::from(code % 1000);
        let years = match code / 1000 {
            1 => 0.0,
            2 => amount / self.config.days_per_year,
            3 => amount / 12.0,
            4 => amount,
            _ => return None,
        };
        Some(years.floor())
    }
}

fn from_birth_year(record: &CaseRecord) -> Option<u8> {
    let age = record.effective_year()?.checked_sub(record.birth_year?)?;
    valid_age(f64::from(age))
}

/// Whole years when within [0, 120]
fn valid_age(years: f64) -> Option<u8> {
    if (0.0..=MAX_AGE).contains(&years) {
        // Non-negative and at most 120
        Some(years.floor() as u8)
    } else {
        None
    }
}
