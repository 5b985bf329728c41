//! Error handling for the statistics pipeline.
//!
//! Only [`StatsError::SourceUnavailable`] and the wrapped I/O/format errors abort
//! a run. [`StatsError::MalformedRow`] and [`StatsError::FieldCoercion`] describe
//! anomalies that the loader logs and counts while it keeps going.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the pipeline
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The source path is missing or cannot be read
    #[error("Source unavailable: {}: {reason}", path.display())]
    SourceUnavailable {
        /// Path that failed to resolve
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A row could not be parsed into any usable record
    #[error("Malformed row {row}: {reason}")]
    MalformedRow {
        /// One-based data row number (header excluded)
        row: u64,
        /// What went wrong
        reason: String,
    },

    /// A single field could not be coerced to its target type
    #[error("Could not coerce {column} value '{value}' (row {row})")]
    FieldCoercion {
        /// Source column name
        column: String,
        /// Offending raw value
        value: String,
        /// One-based data row number
        row: u64,
    },

    /// Error opening or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error in an Arrow kernel
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error serializing or deserializing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The bundle could not be persisted
    #[error("Output error: {0}")]
    Output(String),
}

impl StatsError {
    /// Build a `SourceUnavailable` error for `path`
    pub fn source_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error should abort a processing run
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedRow { .. } | Self::FieldCoercion { .. })
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, StatsError>;
