//! Two-dimensional breakdowns: age band against deaths, symptoms and sex;
//! sex against outcome; symptom against symptom.
//!
//! Unlike the one-dimensional blocks, percentages inside a band or a sex are
//! relative to that band or sex.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algorithm::aggregate::CategoryCount;
use crate::algorithm::percentage;
use crate::models::age_band::AgeBand;
use crate::models::case::NormalizedCase;
use crate::models::symptom::Symptom;
use crate::models::types::{Outcome, Sex};

/// Cases and deaths in one age band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBandStats {
    pub band: AgeBand,
    pub count: u64,
    /// Share of all records
    pub percentage: f64,
    /// Deaths by the disease
    pub deaths: u64,
    /// Deaths per 100 cases in the band; 0 for an empty band
    pub death_rate: f64,
}

/// A breakdown within one age band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandBreakdown {
    pub band: AgeBand,
    /// Cases in the band, the denominator of `items`
    pub total: u64,
    pub items: Vec<CategoryCount>,
}

/// Outcome and symptoms within one sex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexProfile {
    pub sex: Sex,
    pub cases: u64,
    pub cures: u64,
    pub cure_percentage: f64,
    pub deaths: u64,
    pub death_percentage: f64,
    /// Percentages relative to `cases`
    pub symptoms: Vec<CategoryCount>,
}

/// Records showing both symptoms of an unordered pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomPair {
    pub first: Symptom,
    pub second: Symptom,
    pub count: u64,
    /// Share of all records
    pub percentage: f64,
}

fn cases_in_band(cases: &[NormalizedCase], band: AgeBand) -> impl Iterator<Item = &NormalizedCase> {
    cases.iter().filter(move |c| c.age_band() == Some(band))
}

fn symptom_counts<'a>(
    cases: impl Iterator<Item = &'a NormalizedCase>,
    symptoms: &[Symptom],
) -> (u64, Vec<u64>) {
    let mut total = 0;
    let mut counts = vec![0_u64; symptoms.len()];
    for case in cases {
        total += 1;
        for (idx, symptom) in symptoms.iter().enumerate() {
            if case.record.has_symptom(*symptom) {
                counts[idx] += 1;
            }
        }
    }
    (total, counts)
}

fn symptom_items(symptoms: &[Symptom], counts: Vec<u64>, total: u64) -> Vec<CategoryCount> {
    symptoms
        .iter()
        .zip(counts)
        .map(|(symptom, count)| CategoryCount::new(symptom.key(), count, total))
        .collect()
}

/// Count, share and death rate for each of the six bands
///
/// Records without a normalized age are not assigned to any band. Without an
/// outcome column every band reports zero deaths.
#[must_use]
pub fn age_band_stats(cases: &[NormalizedCase]) -> Vec<AgeBandStats> {
    let total = cases.len() as u64;
    let mut counts = [0_u64; AgeBand::ALL.len()];
    let mut deaths = [0_u64; AgeBand::ALL.len()];
    for case in cases {
        if let Some(band) = case.age_band() {
            counts[band.index()] += 1;
            if case.record.died_of_disease() {
                deaths[band.index()] += 1;
            }
        }
    }

    AgeBand::ALL
        .into_iter()
        .map(|band| {
            let count = counts[band.index()];
            AgeBandStats {
                band,
                count,
                percentage: percentage(count, total),
                deaths: deaths[band.index()],
                death_rate: percentage(deaths[band.index()], count),
            }
        })
        .collect()
}

/// Prevalence of each of `symptoms` within each band
#[must_use]
pub fn symptoms_by_age_band(cases: &[NormalizedCase], symptoms: &[Symptom]) -> Vec<BandBreakdown> {
    AgeBand::ALL
        .into_iter()
        .map(|band| {
            let (total, counts) = symptom_counts(cases_in_band(cases, band), symptoms);
            BandBreakdown {
                band,
                total,
                items: symptom_items(symptoms, counts, total),
            }
        })
        .collect()
}

/// Sex distribution within each band
#[must_use]
pub fn sex_by_age_band(cases: &[NormalizedCase]) -> Vec<BandBreakdown> {
    AgeBand::ALL
        .into_iter()
        .map(|band| {
            let in_band: Vec<&NormalizedCase> = cases_in_band(cases, band).collect();
            let total = in_band.len() as u64;
            let items = Sex::all()
                .into_iter()
                .map(|sex| {
                    let count = in_band.iter().filter(|c| c.record.sex == Some(sex)).count();
                    CategoryCount::new(sex.key(), count as u64, total)
                })
                .collect();
            BandBreakdown { band, total, items }
        })
        .collect()
}

/// Cure, death and symptom figures for female and male cases
///
/// Only `symptoms` are listed; cures and deaths are zero without an outcome column.
#[must_use]
pub fn sex_profile(cases: &[NormalizedCase], symptoms: &[Symptom]) -> Vec<SexProfile> {
    [Sex::Female, Sex::Male]
        .into_iter()
        .map(|sex| {
            let of_sex: Vec<&NormalizedCase> =
                cases.iter().filter(|c| c.record.sex == Some(sex)).collect();
            let total = of_sex.len() as u64;
            let cures = of_sex
                .iter()
                .filter(|c| c.record.outcome == Some(Outcome::Cure))
                .count() as u64;
            let deaths = of_sex.iter().filter(|c| c.record.died_of_disease()).count() as u64;
            let (_, counts) = symptom_counts(of_sex.iter().copied(), symptoms);

            SexProfile {
                sex,
                cases: total,
                cures,
                cure_percentage: percentage(cures, total),
                deaths,
                death_percentage: percentage(deaths, total),
                symptoms: symptom_items(symptoms, counts, total),
            }
        })
        .collect()
}

/// Records showing both `a` and `b`
///
/// Symmetric in its arguments.
#[must_use]
pub fn co_occurrence(cases: &[NormalizedCase], a: Symptom, b: Symptom) -> u64 {
    cases
        .iter()
        .filter(|c| c.record.symptoms.contains_both(a, b))
        .count() as u64
}

/// The `top_n` most frequent pairs drawn from `symptoms`
///
/// Pairs are unordered and listed once, in the order of `symptoms`. Pairs never
/// seen together are dropped; ties keep that order.
#[must_use]
pub fn symptom_pairs(cases: &[NormalizedCase], symptoms: &[Symptom], top_n: usize) -> Vec<SymptomPair> {
    let total = cases.len() as u64;
    let pairs: Vec<(Symptom, Symptom)> = symptoms.iter().copied().tuple_combinations().collect();

    let mut counts = vec![0_u64; pairs.len()];
    for case in cases {
        let symptoms = case.record.symptoms;
        if symptoms.len() < 2 {
            continue;
        }
        for (idx, (a, b)) in pairs.iter().enumerate() {
            if symptoms.contains_both(*a, *b) {
                counts[idx] += 1;
            }
        }
    }

    pairs
        .into_iter()
        .zip(counts)
        .filter(|&(_, count)| count > 0)
        .map(|((first, second), count)| SymptomPair {
            first,
            second,
            count,
            percentage: percentage(count, total),
        })
        .sorted_by(|a, b| b.count.cmp(&a.count))
        .take(top_n)
        .collect()
}
