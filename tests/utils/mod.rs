use std::path::{Path, PathBuf};

use dengue_stats::ProcessorConfig;
use dengue_stats::models::{CaseRecord, Sex, Symptom};
use dengue_stats::models::types::Outcome;
use dengue_stats::schema::Column;
use dengue_stats::utils::test::{CaseBuilder, write_sinan_csv};

/// Configuration without spinner, on two workers
#[must_use]
pub fn test_config() -> ProcessorConfig {
    config_with_threads(2)
}

#[must_use]
pub fn config_with_threads(threads: usize) -> ProcessorConfig {
    ProcessorConfig {
        threads: Some(threads),
        ..ProcessorConfig::default()
    }
    .with_progress(false)
}

/// Six cases in Santa Catarina aged 3, 12, 25, 40, 55 and 70, and four in
/// Rondônia without any age information
#[must_use]
pub fn ten_case_scenario() -> Vec<CaseRecord> {
    let mut records: Vec<CaseRecord> = [3, 12, 25, 40, 55, 70]
        .into_iter()
        .enumerate()
        .map(|(i, age)| {
            let builder = CaseBuilder::new()
                .notified(2025, 1 + (i as u32 % 3), 10)
                .notification_year(2025)
                .region("42")
                .sub_region(if i % 2 == 0 { "420460" } else { "420540" })
                .born(2025 - age)
                .sex(if i % 2 == 0 { Sex::Female } else { Sex::Male })
                .symptoms(&[Symptom::Fever, Symptom::Headache]);
            if age == 70 {
                builder.outcome(Outcome::DeathByDisease).build()
            } else {
                builder.outcome(Outcome::Cure).build()
            }
        })
        .collect();
    records.extend((0..4).map(|_| {
        CaseBuilder::new()
            .notified(2025, 2, 1)
            .notification_year(2025)
            .region("11")
            .sub_region("110020")
            .sex(Sex::Male)
            .symptoms(&[Symptom::Fever])
            .outcome(Outcome::Cure)
            .build()
    }));
    records
}

/// Write `records` with every SINAN column to `dir/name`
pub fn write_full_csv(dir: &Path, name: &str, records: &[CaseRecord]) -> PathBuf {
    write_csv_with(dir, name, records, &Column::all())
}

/// Write `records` with only `columns` to `dir/name`
pub fn write_csv_with(dir: &Path, name: &str, records: &[CaseRecord], columns: &[Column]) -> PathBuf {
    let path = dir.join(name);
    write_sinan_csv(&path, records, columns).expect("fixture CSV should be writable");
    path
}

pub fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
