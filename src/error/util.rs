//! Utility functions for error handling
//!
//! Opening the source is the only fatal step of a run, so these helpers turn
//! every way it can fail into a `SourceUnavailable` carrying the path.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, StatsError};

/// Check that a source path exists and is a regular file
pub fn validate_source(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(StatsError::source_unavailable(path, "File not found"));
    }

    if !path.is_file() {
        return Err(StatsError::source_unavailable(path, "Path is not a file"));
    }

    Ok(())
}

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    validate_source(path)?;

    match fs::File::open(path) {
        Ok(file) => Ok(file),
        Err(e) => {
            let reason = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    format!("Permission denied while {purpose} - check file permissions")
                }
                io::ErrorKind::NotFound => {
                    format!("File disappeared while {purpose}")
                }
                _ => format!("Failed to open file for {purpose}: {e}"),
            };

            Err(StatsError::source_unavailable(path, reason))
        }
    }
}
