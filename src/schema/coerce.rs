//! Coercion of raw source rows into [`CaseRecord`]s
//!
//! Both source formats hand rows to [`RecordCoercer`] through the [`RawRow`]
//! trait, so CSV and Parquet inputs obey exactly the same type rules.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use crate::config::ProcessorConfig;
use crate::error::StatsError;
use crate::models::case::CaseRecord;
use crate::models::symptom::Symptom;
use crate::models::types::{Classification, Outcome, Sex};
use crate::schema::codes::{canonical_code, canonical_flag, parse_number, parse_numeric_code};
use crate::schema::columns::Column;
use crate::schema::date_utils::parse_date_string;

/// Number of coercion failures per column logged at `warn` before switching to `debug`
const WARN_LIMIT_PER_COLUMN: u64 = 5;

/// A row of textual values addressed by logical column
pub trait RawRow {
    /// Raw value of `column`; `None` when the column is absent or the cell is null
    fn field(&self, column: Column) -> Option<&str>;
}

/// Per-column coercion failure counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoercionStats {
    /// Failures keyed by column key
    pub failures: BTreeMap<String, u64>,
}

impl CoercionStats {
    /// Count a failed coercion and log it
    pub fn record_failure(&mut self, column: Column, source_name: &str, value: &str, row: u64) {
        let count = self.failures.entry(column.key()).or_insert(0);
        *count += 1;

        let err = StatsError::FieldCoercion {
            column: source_name.to_string(),
            value: value.to_string(),
            row,
        };
        if *count <= WARN_LIMIT_PER_COLUMN {
            warn!("{err}; field set to null");
        } else {
            debug!("{err}; field set to null");
        }
    }

    /// Total failures over all columns
    #[must_use]
    pub fn total(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Fold another set of counts into this one
    pub fn merge(&mut self, other: &Self) {
        for (column, count) in &other.failures {
            *self.failures.entry(column.clone()).or_insert(0) += count;
        }
    }
}

/// Turns raw rows into typed records according to the run configuration
#[derive(Debug)]
pub struct RecordCoercer<'a> {
    config: &'a ProcessorConfig,
    yes_code: &'a str,
}

impl<'a> RecordCoercer<'a> {
    #[must_use]
    pub fn new(config: &'a ProcessorConfig) -> Self {
        Self {
            config,
            yes_code: canonical_flag(&config.symptom_yes_code),
        }
    }

    /// Coerce one row
    ///
    /// Returns `None` when every logical field is empty, which the loader treats
    /// as a malformed row. Individual fields that fail to coerce become `None`
    /// and are counted in `stats`.
    pub fn coerce<R: RawRow + ?Sized>(
        &self,
        row: &R,
        row_number: u64,
        stats: &mut CoercionStats,
    ) -> Option<CaseRecord> {
        let any_value = Column::all()
            .into_iter()
            .any(|c| row.field(c).is_some_and(|v| !v.trim().is_empty()));
        if !any_value {
            return None;
        }

        let codes = &self.config.codes;
        let mut record = CaseRecord {
            region: row
                .field(Column::Region)
                .and_then(|v| canonical_code(v, codes.region_width, false)),
            sub_region: row.field(Column::SubRegion).and_then(|v| {
                canonical_code(v, codes.sub_region_width, codes.truncate_check_digit)
            }),
            ..CaseRecord::default()
        };

        record.notification_date = self.coerce_with(row, Column::NotificationDate, row_number, stats, |v| {
            parse_date_string(v, &self.config.dates)
        });
        record.notification_year = self.coerce_with(row, Column::NotificationYear, row_number, stats, parse_year);
        record.birth_year = self.coerce_with(row, Column::BirthYear, row_number, stats, parse_year);
        record.raw_age = self.coerce_with(row, Column::RawAge, row_number, stats, parse_number);
        record.sex = self.coerce_with(row, Column::Sex, row_number, stats, Sex::from_code);
        record.classification =
            self.coerce_with(row, Column::Classification, row_number, stats, Classification::from_code);
        record.outcome = self.coerce_with(row, Column::Outcome, row_number, stats, Outcome::from_code);

        for symptom in Symptom::ALL {
            if row
                .field(Column::Symptom(symptom))
                .is_some_and(|v| canonical_flag(v) == self.yes_code)
            {
                record.symptoms.insert(symptom);
            }
        }

        Some(record)
    }

    fn coerce_with<R, T, F>(
        &self,
        row: &R,
        column: Column,
        row_number: u64,
        stats: &mut CoercionStats,
        parse: F,
    ) -> Option<T>
    where
        R: RawRow + ?Sized,
        F: FnOnce(&str) -> Option<T>,
    {
        let raw = row.field(column)?;
        if raw.trim().is_empty() {
            return None;
        }
        let parsed = parse(raw);
        if parsed.is_none() {
            stats.record_failure(
                column,
                self.config.columns.source_name(column),
                raw,
                row_number,
            );
        }
        parsed
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    parse_numeric_code(raw).and_then(|v| i32::try_from(v).ok())
}
