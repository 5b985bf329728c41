#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use dengue_stats::{Dimension, SourceFormat, load_records, run};
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use crate::utils::{approx, test_config};

    fn write_batch(path: &std::path::Path, batch: &RecordBatch) {
        let file = File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("SG_UF_NOT", DataType::Utf8, true),
            Field::new("NU_ANO", DataType::Int32, true),
            Field::new("ANO_NASC", DataType::Int32, true),
            Field::new("NU_IDADE_N", DataType::Utf8, true),
            Field::new("CS_SEXO", DataType::Utf8, true),
            Field::new("EVOLUCAO", DataType::Utf8, true),
            Field::new("UNRELATED", DataType::Utf8, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("42"), Some("42"), Some("11"), None])),
            Arc::new(Int32Array::from(vec![Some(2025), Some(2025), Some(2025), Some(2025)])),
            Arc::new(Int32Array::from(vec![Some(2020), None, None, None])),
            Arc::new(StringArray::from(vec![None, Some("7300"), None, Some("40")])),
            Arc::new(StringArray::from(vec![Some("F"), Some("M"), Some("M"), Some("F")])),
            Arc::new(StringArray::from(vec![Some("1"), Some("2"), Some("1"), None])),
            Arc::new(StringArray::from(vec![Some("x"), Some("y"), Some("z"), Some("w")])),
        ];
        RecordBatch::try_new(schema, columns).unwrap()
    }

    #[test]
    fn test_parquet_loads_like_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cases.parquet");
        write_batch(&path, &sample_batch());

        let loaded = load_records(&path, &test_config()).unwrap();
        assert_eq!(loaded.report.format, SourceFormat::Parquet);
        assert_eq!(loaded.report.rows_read, 4);
        assert_eq!(loaded.records.len(), 4);
        assert_eq!(loaded.records[0].birth_year, Some(2020));
        assert_eq!(loaded.records[1].raw_age, Some(7300.0));
        assert!(loaded.report.columns_found.contains(&"raw_age".to_string()));
        assert!(loaded.report.columns_missing.contains(&"notification_date".to_string()));
    }

    #[test]
    fn test_parquet_end_to_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cases.parquet");
        write_batch(&path, &sample_batch());

        let bundle = run(&path, &test_config()).unwrap();
        assert_eq!(bundle.metadata.total_records, 4);

        let regions = bundle.by_region.as_ref().unwrap();
        assert_eq!(regions[0].key, "42");
        assert_eq!(regions[0].count, 2);
        assert!(approx(regions[0].percentage, 50.0));
        // One record without a region leaves a 25 % remainder
        let covered: f64 = regions.iter().map(|r| r.percentage).sum();
        assert!(approx(covered, 75.0));

        let bands = bundle.age_bands.as_ref().unwrap();
        let counts: Vec<u64> = bands.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 1, 1, 1, 0, 0]);
        assert_eq!(bands[2].deaths, 1);

        assert!(bundle.has(Dimension::Year));
        assert!(!bundle.has(Dimension::Month));
        assert!(!bundle.has(Dimension::Symptom));
    }
}
