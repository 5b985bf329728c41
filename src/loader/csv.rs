//! Delimited text sources
//!
//! DATASUS exports are usually Latin-1 with `;` or `,` separators, so fields
//! are decoded as UTF-8 with a Latin-1 fallback and the delimiter is sniffed
//! from the header line unless configured.

use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ::csv::{ByteRecord, ReaderBuilder, StringRecord};
use indicatif::ProgressBar;

use crate::config::ProcessorConfig;
use crate::error::util::safe_open_file;
use crate::error::{Result, StatsError};
use crate::loader::{RowTally, tick};
use crate::models::case::CaseRecord;
use crate::schema::coerce::{RawRow, RecordCoercer};
use crate::schema::columns::{Column, ResolvedColumns};

/// Delimiters considered when sniffing, in order of preference on ties
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

struct CsvRow<'a> {
    record: &'a StringRecord,
    resolved: &'a ResolvedColumns,
}

impl RawRow for CsvRow<'_> {
    fn field(&self, column: Column) -> Option<&str> {
        self.resolved
            .index(column)
            .and_then(|idx| self.record.get(idx))
    }
}

/// Read a delimited file into records
pub(crate) fn read_csv(
    path: &Path,
    config: &ProcessorConfig,
    spinner: &ProgressBar,
) -> Result<(Vec<CaseRecord>, ResolvedColumns, RowTally)> {
    let delimiter = match config.csv.delimiter {
        Some(c) => delimiter_byte(c)?,
        None => detect_delimiter(path)?,
    };

    let file = safe_open_file(path, "reading notifications")?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| StatsError::source_unavailable(path, format!("cannot read header: {e}")))?
        .iter()
        .map(|h| decode_field(h).trim_start_matches('\u{feff}').to_string())
        .collect();
    let resolved = config.columns.resolve(&headers);

    let coercer = RecordCoercer::new(config);
    let mut tally = RowTally::default();
    let mut records = Vec::new();

    for result in reader.byte_records() {
        tally.rows_read += 1;
        let row = tally.rows_read;
        tick(spinner, row);

        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => {
                return Err(StatsError::source_unavailable(path, e.to_string()));
            }
            Err(e) => {
                tally.skip(row, e.to_string());
                continue;
            }
        };

        if raw.len() != headers.len() {
            tally.skip(
                row,
                format!("expected {} fields, found {}", headers.len(), raw.len()),
            );
            continue;
        }

        let text = decode_record(&raw);
        let view = CsvRow {
            record: &text,
            resolved: &resolved,
        };
        match coercer.coerce(&view, row, &mut tally.coercion) {
            Some(record) => records.push(record),
            None => tally.skip(row, "every mapped field is empty"),
        }
    }

    Ok((records, resolved, tally))
}

fn delimiter_byte(c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| StatsError::config(format!("delimiter '{c}' is not a single ASCII character")))
}

fn detect_delimiter(path: &Path) -> Result<u8> {
    let file = safe_open_file(path, "sniffing the delimiter")?;
    let mut header = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut header)
        .map_err(|e| StatsError::source_unavailable(path, e.to_string()))?;

    let fallback = if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"))
    {
        b'\t'
    } else {
        b','
    };
    Ok(sniff_delimiter(&header).unwrap_or(fallback))
}

/// The candidate delimiter occurring most often in a header line
fn sniff_delimiter(header: &[u8]) -> Option<u8> {
    CANDIDATE_DELIMITERS
        .iter()
        .map(|&d| (d, header.iter().filter(|&&b| b == d).count()))
        .filter(|&(_, count)| count > 0)
        .fold(None, |best: Option<(u8, usize)>, candidate| match best {
            Some((_, best_count)) if best_count >= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(d, _)| d)
}

/// Decode a field as UTF-8, falling back to Latin-1
fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn decode_record(raw: &ByteRecord) -> StringRecord {
    raw.iter().map(decode_field).collect()
}
