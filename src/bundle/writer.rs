//! Atomic bundle persistence
//!
//! The bundle is written to a temporary file next to the destination and
//! renamed over it only once fully written, so readers never see a partial
//! document.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use tempfile::NamedTempFile;

use crate::bundle::AggregateBundle;
use crate::error::{Result, StatsError};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Write `bundle` to `path`, replacing any previous file
pub fn write_bundle(bundle: &AggregateBundle, path: &Path, pretty: bool) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing aggregate bundle to", path);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        if pretty {
            serde_json::to_writer_pretty(&mut writer, bundle)?;
        } else {
            serde_json::to_writer(&mut writer, bundle)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| {
        StatsError::Output(format!("cannot replace {}: {}", path.display(), e.error))
    })?;

    log_operation_complete(
        "wrote",
        path,
        bundle.computed_keys().len(),
        Some(start.elapsed()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::age::AgeNormalizationReport;
    use crate::algorithm::aggregate::overview;
    use crate::bundle::{DataQuality, Metadata};
    use std::collections::BTreeMap;

    fn bundle(total: u64) -> AggregateBundle {
        let quality = DataQuality {
            rows_read: total,
            rows_skipped: 0,
            coercion_failures: BTreeMap::new(),
            columns_missing: Vec::new(),
            dimensions_skipped: Vec::new(),
            age: AgeNormalizationReport::from_cases(&[]),
        };
        AggregateBundle::new(Metadata::new("in.csv", total), overview(&[]), quality)
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("bundle.json");

        write_bundle(&bundle(1), &path, true).unwrap();
        write_bundle(&bundle(2), &path, false).unwrap();

        let written: AggregateBundle =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.metadata.total_records, 2);

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
