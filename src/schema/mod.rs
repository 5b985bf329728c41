//! Source schema handling: column mapping, code canonicalisation, tolerant
//! date parsing and row coercion.

pub mod codes;
pub mod coerce;
pub mod columns;
pub mod date_utils;

pub use codes::{CodeFormatConfig, canonical_code};
pub use coerce::{CoercionStats, RawRow, RecordCoercer};
pub use columns::{Column, ColumnMapping, ResolvedColumns};
pub use date_utils::{DateFormatConfig, parse_date_string};
