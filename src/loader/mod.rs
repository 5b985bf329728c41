//! Record loading
//!
//! Reads the raw notification file (CSV-like text or Parquet) into
//! [`CaseRecord`]s and reports what was skipped or could not be coerced.

pub mod csv;
pub mod parquet;

use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::ProgressBar;
use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::ProcessorConfig;
use crate::error::util::validate_source;
use crate::error::{Result, StatsError};
use crate::models::case::CaseRecord;
use crate::schema::coerce::CoercionStats;
use crate::schema::columns::{Column, ResolvedColumns};
use crate::utils::logging::{
    create_spinner, finish_spinner, log_operation_complete, log_operation_start, log_warning,
};

/// Number of skipped rows logged at `warn` before switching to `debug`
const SKIPPED_ROW_WARN_LIMIT: u64 = 10;

/// File format of a source, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Delimited text (`.csv`, `.tsv`, `.txt`, anything unrecognised)
    Csv,
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("parquet" | "pq") => Self::Parquet,
            _ => Self::Csv,
        }
    }
}

/// What the loader saw while reading a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub source: PathBuf,
    pub format: SourceFormat,
    /// Data rows encountered, header excluded
    pub rows_read: u64,
    pub rows_kept: u64,
    /// Malformed rows that were dropped
    pub rows_skipped: u64,
    /// Coercion failures per logical column
    pub coercion_failures: CoercionStats,
    /// Logical columns present in the source
    pub columns_found: Vec<String>,
    /// Logical columns absent from the source
    pub columns_missing: Vec<String>,
}

/// Records loaded from one source
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    pub records: Vec<CaseRecord>,
    pub report: LoadReport,
    present: FxHashSet<Column>,
}

impl LoadedRecords {
    /// Whether the source carried a logical column
    #[must_use]
    pub fn has_column(&self, column: Column) -> bool {
        self.present.contains(&column)
    }

    /// Logical columns absent from the source
    #[must_use]
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::all()
            .into_iter()
            .filter(|c| !self.present.contains(c))
            .collect()
    }
}

/// Tallies rows while a source is read
#[derive(Debug, Default)]
pub(crate) struct RowTally {
    pub rows_read: u64,
    pub rows_skipped: u64,
    pub coercion: CoercionStats,
}

impl RowTally {
    /// Log and count a malformed row
    pub fn skip(&mut self, row: u64, reason: impl Into<String>) {
        self.rows_skipped += 1;
        let err = StatsError::MalformedRow {
            row,
            reason: reason.into(),
        };
        if self.rows_skipped <= SKIPPED_ROW_WARN_LIMIT {
            warn!("{err}; row skipped");
        } else {
            debug!("{err}; row skipped");
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.rows_read += other.rows_read;
        self.rows_skipped += other.rows_skipped;
        self.coercion.merge(&other.coercion);
    }
}

/// Load every record from `path`
///
/// Fails with [`StatsError::SourceUnavailable`] when the path does not resolve
/// or cannot be opened; malformed rows and bad fields are counted, not fatal.
pub fn load_records(path: &Path, config: &ProcessorConfig) -> Result<LoadedRecords> {
    validate_source(path)?;

    let start = Instant::now();
    let format = SourceFormat::from_path(path);
    log_operation_start(&format!("Loading {format:?} notifications from"), path);

    let spinner = create_spinner(Some("reading notifications"), config.show_progress);
    let result = match format {
        SourceFormat::Csv => csv::read_csv(path, config, &spinner),
        SourceFormat::Parquet => parquet::read_parquet(path, config, &spinner),
    };
    finish_spinner(&spinner);
    let (records, resolved, tally) = result?;

    let loaded = assemble(path, format, records, &resolved, tally);
    log_operation_complete("loaded", path, loaded.records.len(), Some(start.elapsed()));
    report_anomalies(&loaded.report);
    Ok(loaded)
}

fn assemble(
    path: &Path,
    format: SourceFormat,
    records: Vec<CaseRecord>,
    resolved: &ResolvedColumns,
    tally: RowTally,
) -> LoadedRecords {
    let present: FxHashSet<Column> = resolved.iter().map(|(column, _)| column).collect();
    let (found, missing): (Vec<Column>, Vec<Column>) =
        Column::all().into_iter().partition(|c| present.contains(c));

    let report = LoadReport {
        source: path.to_path_buf(),
        format,
        rows_read: tally.rows_read,
        rows_kept: records.len() as u64,
        rows_skipped: tally.rows_skipped,
        coercion_failures: tally.coercion,
        columns_found: found.into_iter().map(Column::key).collect(),
        columns_missing: missing.into_iter().map(Column::key).collect(),
    };

    LoadedRecords {
        records,
        report,
        present,
    }
}

fn report_anomalies(report: &LoadReport) {
    if report.rows_skipped > 0 {
        log_warning(
            &format!("Skipped {} malformed rows", report.rows_skipped),
            Some(&report.source),
        );
    }
    for (column, failures) in &report.coercion_failures.failures {
        log_warning(
            &format!("{failures} values of {column} could not be coerced and were set to null"),
            None,
        );
    }
    if !report.columns_missing.is_empty() {
        log_warning(
            &format!(
                "Columns not found in source: {}",
                report.columns_missing.join(", ")
            ),
            Some(&report.source),
        );
    }
}

/// Tick the spinner and refresh its message every so often
pub(crate) fn tick(spinner: &ProgressBar, rows: u64) {
    spinner.inc(1);
    if rows % 50_000 == 0 {
        spinner.set_message(format!("{rows} rows read"));
    }
}
