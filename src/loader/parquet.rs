//! Parquet sources
//!
//! Only the mapped columns are projected. Each batch is converted to text
//! column by column and then coerced exactly like a CSV row; batches are
//! coerced in parallel.

use std::path::Path;

use ::parquet::arrow::ProjectionMask;
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::config::ProcessorConfig;
use crate::error::util::safe_open_file;
use crate::error::{Result, StatsError};
use crate::loader::{RowTally, tick};
use crate::models::case::CaseRecord;
use crate::schema::coerce::{RawRow, RecordCoercer};
use crate::schema::columns::{Column, ResolvedColumns};
use crate::utils::arrow::{downcast_array, utf8_column};
use crate::utils::logging::log_warning;

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

struct ParquetRow<'a> {
    columns: &'a [(Column, StringArray)],
    row: usize,
}

impl RawRow for ParquetRow<'_> {
    fn field(&self, column: Column) -> Option<&str> {
        self.columns
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, array)| (!array.is_null(self.row)).then(|| array.value(self.row)))
    }
}

/// Read a Parquet file into records
pub(crate) fn read_parquet(
    path: &Path,
    config: &ProcessorConfig,
    spinner: &ProgressBar,
) -> Result<(Vec<CaseRecord>, ResolvedColumns, RowTally)> {
    let file = safe_open_file(path, "reading notifications")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
        StatsError::source_unavailable(path, format!("not a readable Parquet file: {e}"))
    })?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let resolved = config.columns.resolve(&headers);

    let mut roots: Vec<usize> = resolved.iter().map(|(_, idx)| idx).collect();
    if roots.is_empty() {
        let rows = u64::try_from(builder.metadata().file_metadata().num_rows()).unwrap_or(0);
        log_warning("No mapped column found, every row is unusable", Some(path));
        let tally = RowTally {
            rows_read: rows,
            rows_skipped: rows,
            ..RowTally::default()
        };
        return Ok((Vec::new(), resolved, tally));
    }
    roots.sort_unstable();
    roots.dedup();

    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    let reader = builder
        .with_projection(mask)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build()?;
    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    let named: Vec<(Column, &str)> = resolved
        .iter()
        .map(|(column, idx)| (column, headers[idx].as_str()))
        .collect();

    let mut first_rows = Vec::with_capacity(batches.len());
    let mut next_row = 1_u64;
    for batch in &batches {
        first_rows.push(next_row);
        next_row += batch.num_rows() as u64;
    }

    let coercer = RecordCoercer::new(config);
    let parts = batches
        .par_iter()
        .zip(first_rows.par_iter())
        .map(|(batch, &first_row)| coerce_batch(batch, first_row, &named, &coercer, spinner))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(parts.iter().map(|(r, _)| r.len()).sum());
    let mut tally = RowTally::default();
    for (part, part_tally) in parts {
        records.extend(part);
        tally.merge(&part_tally);
    }

    Ok((records, resolved, tally))
}

fn coerce_batch(
    batch: &RecordBatch,
    first_row: u64,
    named: &[(Column, &str)],
    coercer: &RecordCoercer<'_>,
    spinner: &ProgressBar,
) -> Result<(Vec<CaseRecord>, RowTally)> {
    let mut columns = Vec::with_capacity(named.len());
    for &(column, name) in named {
        if let Some(array) = utf8_column(batch, name)? {
            let strings = downcast_array::<StringArray>(&array, name, "Utf8")?;
            columns.push((column, strings.clone()));
        }
    }

    let mut tally = RowTally::default();
    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let row_number = first_row + row as u64;
        tally.rows_read += 1;
        tick(spinner, row_number);

        let view = ParquetRow {
            columns: &columns,
            row,
        };
        match coercer.coerce(&view, row_number, &mut tally.coercion) {
            Some(record) => records.push(record),
            None => tally.skip(row_number, "every mapped field is null or empty"),
        }
    }

    Ok((records, tally))
}
