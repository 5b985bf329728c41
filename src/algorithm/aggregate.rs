//! One-dimensional breakdowns
//!
//! Every percentage here is relative to the total number of records, so a
//! dimension with missing values sums to less than 100 %; the difference is
//! the share of records without a value.

use std::hash::Hash;

use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::algorithm::percentage;
use crate::models::case::{NormalizedCase, YearMonth};
use crate::models::geo::region_label;
use crate::models::symptom::Symptom;
use crate::models::types::{Classification, Outcome, Sex};

/// Count and share of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    pub count: u64,
    pub percentage: f64,
}

impl CategoryCount {
    #[must_use]
    pub fn new(key: impl Into<String>, count: u64, total: u64) -> Self {
        Self {
            key: key.into(),
            label: None,
            count,
            percentage: percentage(count, total),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Headline figures of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_cases: u64,
    pub first_notification: Option<NaiveDate>,
    pub last_notification: Option<NaiveDate>,
    /// Notification years present, ascending
    pub years: Vec<i32>,
    pub distinct_regions: usize,
}

/// Count records by an optional key
fn tally<K, F>(cases: &[NormalizedCase], key: F) -> FxHashMap<K, u64>
where
    K: Eq + Hash,
    F: Fn(&NormalizedCase) -> Option<K>,
{
    let mut counts = FxHashMap::default();
    for case in cases {
        if let Some(k) = key(case) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// Sort `(key, count)` pairs by descending count, ties by ascending key
fn by_count_desc<K: Ord>(counts: FxHashMap<K, u64>) -> Vec<(K, u64)> {
    counts
        .into_iter()
        .sorted_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)))
        .collect()
}

/// Cases per state, most affected first, labelled with the state name
///
/// `limit` caps the number of entries; percentages stay relative to all records.
#[must_use]
pub fn count_by_region(cases: &[NormalizedCase], limit: Option<usize>) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    let counts = tally(cases, |c| c.record.region.clone());
    by_count_desc(counts)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(region, count)| {
            let label = region_label(&region).unwrap_or_else(|| region.clone());
            CategoryCount::new(region, count, total).with_label(label)
        })
        .collect()
}

/// Cases per notification year, chronological
#[must_use]
pub fn count_by_year(cases: &[NormalizedCase]) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    tally(cases, |c| c.record.effective_year())
        .into_iter()
        .sorted_by_key(|(year, _)| *year)
        .map(|(year, count)| CategoryCount::new(year.to_string(), count, total))
        .collect()
}

/// Cases per year-month of the notification date, chronological
#[must_use]
pub fn count_by_month(cases: &[NormalizedCase]) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    tally(cases, |c| c.record.year_month())
        .into_iter()
        .sorted_by_key(|(month, _)| *month)
        .map(|(month, count): (YearMonth, u64)| CategoryCount::new(month.key(), count, total))
        .collect()
}

/// Cases per sex; every category is listed, zero-filled
#[must_use]
pub fn count_by_sex(cases: &[NormalizedCase]) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    let counts = tally(cases, |c| c.record.sex);
    Sex::all()
        .into_iter()
        .map(|sex| CategoryCount::new(sex.key(), counts.get(&sex).copied().unwrap_or(0), total))
        .collect()
}

/// Records with each of `symptoms`, in the given order
#[must_use]
pub fn count_by_symptom(cases: &[NormalizedCase], symptoms: &[Symptom]) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    let mut counts = vec![0_u64; symptoms.len()];
    for case in cases {
        for (idx, symptom) in symptoms.iter().enumerate() {
            if case.record.has_symptom(*symptom) {
                counts[idx] += 1;
            }
        }
    }
    symptoms
        .iter()
        .zip(counts)
        .map(|(symptom, count)| {
            CategoryCount::new(symptom.key(), count, total).with_label(symptom.default_column())
        })
        .collect()
}

/// Cases per final classification code, most frequent first
#[must_use]
pub fn count_by_classification(cases: &[NormalizedCase]) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    let counts = tally(cases, |c| c.record.classification.map(|cls| cls.code()));
    by_count_desc(counts)
        .into_iter()
        .map(|(code, count)| {
            let label = Classification::from(code).label();
            CategoryCount::new(code.to_string(), count, total).with_label(label)
        })
        .collect()
}

/// Cases per outcome; every category is listed, zero-filled
#[must_use]
pub fn count_by_outcome(cases: &[NormalizedCase]) -> Vec<CategoryCount> {
    let total = cases.len() as u64;
    let counts = tally(cases, |c| c.record.outcome);
    Outcome::all()
        .into_iter()
        .map(|outcome| {
            CategoryCount::new(
                outcome.code().to_string(),
                counts.get(&outcome).copied().unwrap_or(0),
                total,
            )
            .with_label(outcome.key())
        })
        .collect()
}

/// Total, date span, years and region count
#[must_use]
pub fn overview(cases: &[NormalizedCase]) -> Overview {
    let dates = cases.iter().filter_map(|c| c.record.notification_date);
    let (first_notification, last_notification) = match dates.minmax() {
        itertools::MinMaxResult::NoElements => (None, None),
        itertools::MinMaxResult::OneElement(d) => (Some(d), Some(d)),
        itertools::MinMaxResult::MinMax(min, max) => (Some(min), Some(max)),
    };

    let years = cases
        .iter()
        .filter_map(|c| c.record.effective_year())
        .unique()
        .sorted()
        .collect();

    Overview {
        total_cases: cases.len() as u64,
        first_notification,
        last_notification,
        years,
        distinct_regions: cases
            .iter()
            .filter_map(|c| c.record.region.as_deref())
            .unique()
            .count(),
    }
}
