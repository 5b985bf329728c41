//! End-to-end processing: load, normalize ages, compute every requested
//! block in parallel and assemble the bundle.

use std::path::Path;
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::algorithm::age::{AgeNormalizationReport, AgeNormalizer};
use crate::algorithm::{aggregate, crosstab, regional};
use crate::bundle::{AggregateBundle, DataQuality, Metadata, SkippedDimension, write_bundle};
use crate::config::{Dimension, ProcessorConfig};
use crate::error::{Result, StatsError};
use crate::loader::{LoadReport, LoadedRecords, load_records};
use crate::models::case::NormalizedCase;
use crate::models::symptom::Symptom;
use crate::schema::columns::Column;
use crate::utils::logging::log_warning;

/// Load and age-normalization figures, without any aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub load: LoadReport,
    pub age: AgeNormalizationReport,
}

/// Columns whose absence prevents `dimension`; empty when it can be computed
///
/// Symptom blocks need at least one symptom column and report only the ones
/// present. Outcome figures inside age bands and the sex profile are zero
/// without an outcome column.
#[must_use]
pub fn unmet_columns(dimension: Dimension, has: impl Fn(Column) -> bool) -> Vec<Column> {
    let all_missing = |columns: &[Column]| -> Vec<Column> {
        columns.iter().copied().filter(|c| !has(*c)).collect()
    };
    let symptoms = || {
        let columns: Vec<Column> = Symptom::ALL.into_iter().map(Column::Symptom).collect();
        if columns.iter().any(|c| has(*c)) {
            Vec::new()
        } else {
            columns
        }
    };
    let year = || {
        if has(Column::NotificationYear) || has(Column::NotificationDate) {
            Vec::new()
        } else {
            vec![Column::NotificationYear, Column::NotificationDate]
        }
    };
    let age = || {
        if has(Column::RawAge) || (has(Column::BirthYear) && year().is_empty()) {
            Vec::new()
        } else {
            let mut missing = all_missing(&[Column::BirthYear, Column::RawAge]);
            missing.extend(year());
            missing
        }
    };

    let mut missing = match dimension {
        Dimension::Region => all_missing(&[Column::Region]),
        Dimension::Year => year(),
        Dimension::Month => all_missing(&[Column::NotificationDate]),
        Dimension::Sex => all_missing(&[Column::Sex]),
        Dimension::Symptom | Dimension::SymptomPairs => symptoms(),
        Dimension::Classification => all_missing(&[Column::Classification]),
        Dimension::Outcome => all_missing(&[Column::Outcome]),
        Dimension::AgeBand => age(),
        Dimension::SymptomsByAgeBand => {
            let mut m = age();
            m.extend(symptoms());
            m
        }
        Dimension::SexByAgeBand => {
            let mut m = age();
            m.extend(all_missing(&[Column::Sex]));
            m
        }
        Dimension::SexProfile => all_missing(&[Column::Sex]),
        Dimension::Regional => all_missing(&[Column::Region, Column::SubRegion, Column::NotificationDate]),
    };
    missing.sort_unstable();
    missing.dedup();
    missing
}

/// Blocks to compute, and requested blocks that cannot be
fn plan(config: &ProcessorConfig, loaded: &LoadedRecords) -> (Vec<Dimension>, Vec<SkippedDimension>) {
    let mut enabled = Vec::new();
    let mut skipped = Vec::new();
    for dimension in Dimension::ALL {
        if !config.wants(dimension) {
            continue;
        }
        let missing = unmet_columns(dimension, |c| loaded.has_column(c));
        if missing.is_empty() {
            enabled.push(dimension);
        } else {
            let missing: Vec<String> = missing.into_iter().map(Column::key).collect();
            log_warning(
                &format!(
                    "Not computing {}: missing columns {}",
                    dimension.bundle_key(),
                    missing.join(", ")
                ),
                None,
            );
            skipped.push(SkippedDimension {
                dimension,
                missing_columns: missing,
            });
        }
    }
    (enabled, skipped)
}

/// Symptoms whose column the source carries, in declaration order
fn present_symptoms(loaded: &LoadedRecords) -> Vec<Symptom> {
    Symptom::ALL
        .into_iter()
        .filter(|s| loaded.has_column(Column::Symptom(*s)))
        .collect()
}

/// Compute every enabled block over the normalized records
fn compute_blocks(
    bundle: &mut AggregateBundle,
    cases: &[NormalizedCase],
    symptoms: &[Symptom],
    enabled: &[Dimension],
    config: &ProcessorConfig,
) {
    let on = |d: Dimension| enabled.contains(&d);

    let ((by_region, by_year, by_month), (by_sex, by_symptom, by_classification, by_outcome)) =
        rayon::join(
            || {
                (
                    on(Dimension::Region)
                        .then(|| aggregate::count_by_region(cases, config.region_limit)),
                    on(Dimension::Year).then(|| aggregate::count_by_year(cases)),
                    on(Dimension::Month).then(|| aggregate::count_by_month(cases)),
                )
            },
            || {
                (
                    on(Dimension::Sex).then(|| aggregate::count_by_sex(cases)),
                    on(Dimension::Symptom).then(|| aggregate::count_by_symptom(cases, symptoms)),
                    on(Dimension::Classification)
                        .then(|| aggregate::count_by_classification(cases)),
                    on(Dimension::Outcome).then(|| aggregate::count_by_outcome(cases)),
                )
            },
        );

    let ((age_bands, symptoms_by_age_band, sex_by_age_band), (sex_profile, symptom_pairs, regional)) = rayon::join(
        || {
            (
                on(Dimension::AgeBand).then(|| crosstab::age_band_stats(cases)),
                on(Dimension::SymptomsByAgeBand)
                    .then(|| crosstab::symptoms_by_age_band(cases, symptoms)),
                on(Dimension::SexByAgeBand).then(|| crosstab::sex_by_age_band(cases)),
            )
        },
        || {
            (
                on(Dimension::SexProfile).then(|| crosstab::sex_profile(cases, symptoms)),
                on(Dimension::SymptomPairs)
                    .then(|| crosstab::symptom_pairs(cases, symptoms, config.top_symptom_pairs)),
                on(Dimension::Regional).then(|| {
                    config
                        .regions
                        .iter()
                        .map(|region| {
                            regional::regional_summary(
                                cases,
                                region,
                                config.national_population,
                                &config.codes,
                            )
                        })
                        .collect::<Vec<_>>()
                }),
            )
        },
    );

    bundle.by_region = by_region;
    bundle.by_year = by_year;
    bundle.by_month = by_month;
    bundle.by_sex = by_sex;
    bundle.by_symptom = by_symptom;
    bundle.by_classification = by_classification;
    bundle.by_outcome = by_outcome;
    bundle.age_bands = age_bands;
    bundle.symptoms_by_age_band = symptoms_by_age_band;
    bundle.sex_by_age_band = sex_by_age_band;
    bundle.sex_profile = sex_profile;
    bundle.symptom_pairs = symptom_pairs;
    bundle.regional = regional;
}

fn thread_pool(config: &ProcessorConfig) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .thread_name(|i| format!("dengue-stats-{i}"))
        .build()
        .map_err(|e| StatsError::config(format!("cannot start worker pool: {e}")))
}

/// Normalize and aggregate already loaded records
pub fn build_bundle(loaded: LoadedRecords, config: &ProcessorConfig) -> Result<AggregateBundle> {
    config.validate()?;
    let pool = thread_pool(config)?;
    Ok(pool.install(|| assemble(loaded, config)))
}

fn assemble(loaded: LoadedRecords, config: &ProcessorConfig) -> AggregateBundle {
    let start = Instant::now();
    let (enabled, skipped) = plan(config, &loaded);
    let symptoms = present_symptoms(&loaded);
    let LoadedRecords { records, report, .. } = loaded;

    let (cases, age) = AgeNormalizer::new(&config.age).normalize_all(records);

    let metadata = Metadata::new(report.source.display().to_string(), cases.len() as u64);
    let quality = DataQuality {
        rows_read: report.rows_read,
        rows_skipped: report.rows_skipped,
        coercion_failures: report.coercion_failures.failures,
        columns_missing: report.columns_missing,
        dimensions_skipped: skipped,
        age,
    };
    let mut bundle = AggregateBundle::new(metadata, aggregate::overview(&cases), quality);
    compute_blocks(&mut bundle, &cases, &symptoms, &enabled, config);

    info!(
        "Computed {} blocks over {} records in {:?}",
        bundle.computed_keys().len(),
        cases.len(),
        start.elapsed()
    );
    bundle
}

/// Load `source` and compute its bundle
pub fn run(source: &Path, config: &ProcessorConfig) -> Result<AggregateBundle> {
    config.validate()?;
    let pool = thread_pool(config)?;
    pool.install(|| {
        let loaded = load_records(source, config)?;
        Ok(assemble(loaded, config))
    })
}

/// Load `source`, compute its bundle and atomically write it to `output`
pub fn process(source: &Path, output: &Path, config: &ProcessorConfig) -> Result<AggregateBundle> {
    let bundle = run(source, config)?;
    write_bundle(&bundle, output, config.pretty_json)?;
    Ok(bundle)
}

/// Load `source` and report data quality without aggregating
pub fn inspect(source: &Path, config: &ProcessorConfig) -> Result<InspectReport> {
    config.validate()?;
    let loaded = load_records(source, config)?;
    let LoadedRecords { records, report, .. } = loaded;
    let (_, age) = AgeNormalizer::new(&config.age).normalize_all(records);
    Ok(InspectReport { load: report, age })
}
