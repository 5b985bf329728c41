#[cfg(test)]
mod tests {
    use dengue_stats::{AggregateBundle, process};
    use tempfile::tempdir;

    use crate::utils::{test_config, ten_case_scenario, write_full_csv};

    #[test]
    fn test_process_replaces_previous_bundle() {
        let dir = tempdir().unwrap();
        let source = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());
        let output = dir.path().join("public").join("dashboard_stats.json");
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        std::fs::write(&output, "{\"stale\": true}").unwrap();

        let bundle = process(&source, &output, &test_config()).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(!text.contains("stale"));
        let written: AggregateBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(written.metadata.total_records, bundle.metadata.total_records);
        assert_eq!(written.computed_keys(), bundle.computed_keys());
        assert_eq!(written.by_region.unwrap()[0].count, 6);

        let leftovers: Vec<_> = std::fs::read_dir(output.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_failed_run_leaves_previous_bundle() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("dashboard_stats.json");
        std::fs::write(&output, "{\"previous\": true}").unwrap();

        let result = process(&dir.path().join("missing.csv"), &output, &test_config());
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "{\"previous\": true}"
        );
    }

    #[test]
    fn test_compact_output() {
        let dir = tempdir().unwrap();
        let source = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());
        let output = dir.path().join("stats.json");

        let mut config = test_config();
        config.pretty_json = false;
        process(&source, &output, &config).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(!text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["age_bands"][0]["band"], "0-4");
        assert_eq!(value["metadata"]["total_records"], 10);
    }
}
