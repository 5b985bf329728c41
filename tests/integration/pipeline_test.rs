#[cfg(test)]
mod tests {
    use crate::utils::{approx, config_with_threads, test_config, ten_case_scenario, write_csv_with, write_full_csv};
    use dengue_stats::models::Symptom;
    use dengue_stats::models::types::Sex;
    use dengue_stats::schema::Column;
    use dengue_stats::{AgeBand, Dimension, RegionalConfig, StatsError, build_bundle, inspect, load_records, run};
    use tempfile::tempdir;

    #[test]
    fn test_ten_case_scenario() {
        let dir = tempdir().unwrap();
        let path = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());

        let bundle = run(&path, &test_config()).unwrap();
        assert_eq!(bundle.metadata.total_records, 10);
        assert!(bundle.data_quality.dimensions_skipped.is_empty());

        let regions = bundle.by_region.as_ref().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].key, "42");
        assert_eq!(regions[0].count, 6);
        assert!(approx(regions[0].percentage, 60.0));
        assert_eq!(regions[0].label.as_deref(), Some("SC - Santa Catarina"));
        assert_eq!(regions[1].key, "11");
        assert_eq!(regions[1].count, 4);
        assert!(approx(regions[1].percentage, 40.0));

        let bands = bundle.age_bands.as_ref().unwrap();
        assert_eq!(bands.len(), AgeBand::ALL.len());
        for band in bands {
            assert_eq!(band.count, 1, "band {}", band.band);
        }
        let oldest = &bands[AgeBand::Over60.index()];
        assert_eq!(oldest.deaths, 1);
        assert!(approx(oldest.death_rate, 100.0));

        assert_eq!(bundle.data_quality.age.valid_ages, 6);
        assert_eq!(bundle.data_quality.age.missing_ages, 4);
    }

    #[test]
    fn test_every_block_present_with_full_columns() {
        let dir = tempdir().unwrap();
        let path = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());

        let bundle = run(&path, &test_config()).unwrap();
        for dimension in Dimension::ALL {
            assert!(bundle.has(dimension), "{} missing", dimension.bundle_key());
        }

        let sexes = bundle.by_sex.as_ref().unwrap();
        assert_eq!(sexes.iter().find(|s| s.key == "male").unwrap().count, 7);

        let pairs = bundle.symptom_pairs.as_ref().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].count, 6);

        let profile = bundle.sex_profile.as_ref().unwrap();
        assert_eq!(profile[0].sex, Sex::Female);
        assert_eq!(profile[0].cases, 3);

        let regional = &bundle.regional.as_ref().unwrap()[0];
        assert_eq!(regional.total_cases, 6);
        assert_eq!(regional.distinct_sub_regions, 2);
        assert_eq!(regional.focus[0].cases, 3);
        assert_eq!(
            regional.monthly.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["2025-01", "2025-02", "2025-03"]
        );
    }

    #[test]
    fn test_missing_columns_leave_blocks_out() {
        let dir = tempdir().unwrap();
        let path = write_csv_with(
            dir.path(),
            "partial.csv",
            &ten_case_scenario(),
            &[Column::Region, Column::Sex, Column::NotificationDate],
        );

        let bundle = run(&path, &test_config()).unwrap();
        assert!(bundle.has(Dimension::Region));
        assert!(bundle.has(Dimension::Sex));
        assert!(bundle.has(Dimension::Month));
        assert!(bundle.has(Dimension::Year));
        assert!(!bundle.has(Dimension::Symptom));
        assert!(!bundle.has(Dimension::AgeBand));
        assert!(!bundle.has(Dimension::Regional));

        let skipped: Vec<Dimension> = bundle
            .data_quality
            .dimensions_skipped
            .iter()
            .map(|s| s.dimension)
            .collect();
        assert!(skipped.contains(&Dimension::Symptom));
        assert!(skipped.contains(&Dimension::Regional));
        assert!(!skipped.contains(&Dimension::Region));

        let json = bundle.to_json(false).unwrap();
        assert!(!json.contains("\"by_symptom\""));
        assert!(!json.contains("\"age_bands\""));
        assert!(json.contains("\"by_region\""));
    }

    #[test]
    fn test_partial_symptoms_and_no_outcome_still_compute_blocks() {
        let dir = tempdir().unwrap();
        let mut columns = vec![
            Column::Region,
            Column::Sex,
            Column::NotificationYear,
            Column::BirthYear,
        ];
        columns.extend(
            [
                Symptom::Fever,
                Symptom::Myalgia,
                Symptom::Headache,
                Symptom::Rash,
                Symptom::Vomiting,
                Symptom::Nausea,
            ]
            .map(Column::Symptom),
        );
        let path = write_csv_with(dir.path(), "six_symptoms.csv", &ten_case_scenario(), &columns);

        let bundle = run(&path, &test_config()).unwrap();
        for dimension in [
            Dimension::AgeBand,
            Dimension::Symptom,
            Dimension::SymptomPairs,
            Dimension::SymptomsByAgeBand,
            Dimension::SexProfile,
        ] {
            assert!(bundle.has(dimension), "{} missing", dimension.bundle_key());
        }

        let bands = bundle.age_bands.as_ref().unwrap();
        assert_eq!(bands.iter().map(|b| b.count).sum::<u64>(), 6);
        assert!(bands.iter().all(|b| b.deaths == 0 && approx(b.death_rate, 0.0)));

        let symptoms = bundle.by_symptom.as_ref().unwrap();
        assert_eq!(symptoms.len(), 6);
        assert_eq!(symptoms[0].key, "fever");
        assert_eq!(symptoms[0].count, 10);

        let profile = bundle.sex_profile.as_ref().unwrap();
        assert_eq!(profile[0].symptoms.len(), 6);
        assert_eq!(profile[0].cures, 0);

        let skipped: Vec<Dimension> = bundle
            .data_quality
            .dimensions_skipped
            .iter()
            .map(|s| s.dimension)
            .collect();
        assert!(!skipped.contains(&Dimension::AgeBand));
        assert!(!skipped.contains(&Dimension::Symptom));
        let missing = &bundle.data_quality.columns_missing;
        assert!(missing.contains(&"outcome".to_string()));
        assert!(missing.contains(&"symptom_petechiae".to_string()));
        assert!(!missing.contains(&"symptom_fever".to_string()));
    }

    #[test]
    fn test_unrequested_blocks_are_not_reported_as_skipped() {
        let dir = tempdir().unwrap();
        let path = write_csv_with(dir.path(), "regions.csv", &ten_case_scenario(), &[Column::Region]);

        let config = test_config().with_dimensions(&[Dimension::Region]);
        let bundle = run(&path, &config).unwrap();
        assert_eq!(bundle.computed_keys(), vec!["by_region"]);
        assert!(bundle.data_quality.dimensions_skipped.is_empty());
    }

    #[test]
    fn test_malformed_rows_and_bad_values_are_counted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dirty.csv");
        std::fs::write(
            &path,
            "SG_UF_NOT,CS_SEXO,DT_NOTIFIC\n\
             42,F,2025-01-15\n\
             42,M\n\
             11,F,not-a-date\n\
             11,F,2025-02-01,extra\n\
             35,X,2025-03-01\n",
        )
        .unwrap();

        let bundle = run(&path, &test_config()).unwrap();
        assert_eq!(bundle.data_quality.rows_read, 5);
        assert_eq!(bundle.data_quality.rows_skipped, 2);
        assert_eq!(bundle.metadata.total_records, 3);
        assert_eq!(bundle.data_quality.coercion_failures["notification_date"], 1);
        assert_eq!(bundle.data_quality.coercion_failures["sex"], 1);

        let months = bundle.by_month.as_ref().unwrap();
        assert_eq!(months.iter().map(|m| m.count).sum::<u64>(), 2);
    }

    #[test]
    fn test_missing_source_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = run(&dir.path().join("absent.csv"), &test_config()).unwrap_err();
        assert!(matches!(err, StatsError::SourceUnavailable { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let dir = tempdir().unwrap();
        let records = dengue_stats::utils::test::generate_synthetic_records(2_000, 11);
        let path = write_full_csv(dir.path(), "synthetic.csv", &records);

        let single = run(&path, &config_with_threads(1)).unwrap();
        let many = run(&path, &config_with_threads(4)).unwrap();
        assert_eq!(single.by_region, many.by_region);
        assert_eq!(single.age_bands, many.age_bands);
        assert_eq!(single.symptom_pairs, many.symptom_pairs);
        assert_eq!(single.regional, many.regional);
        assert_eq!(single.data_quality, many.data_quality);
    }

    #[test]
    fn test_inspect_reports_without_aggregating() {
        let dir = tempdir().unwrap();
        let path = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());

        let report = inspect(&path, &test_config()).unwrap();
        assert_eq!(report.load.rows_read, 10);
        assert_eq!(report.load.rows_kept, 10);
        assert!(report.load.columns_missing.is_empty());
        assert_eq!(report.age.valid_ages, 6);
        assert_eq!(report.age.by_source["birth_year"], 6);
    }

    #[test]
    fn test_bundle_from_already_loaded_records() {
        let dir = tempdir().unwrap();
        let path = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());
        let config = test_config();

        let loaded = load_records(&path, &config).unwrap();
        assert!(loaded.has_column(Column::RawAge));
        let bundle = build_bundle(loaded, &config).unwrap();
        assert_eq!(bundle.overview.total_cases, 10);
        assert_eq!(bundle.overview.distinct_regions, 2);
        assert_eq!(bundle.overview.years, vec![2025]);
    }

    #[test]
    fn test_one_summary_per_configured_region() {
        let dir = tempdir().unwrap();
        let path = write_full_csv(dir.path(), "cases.csv", &ten_case_scenario());
        let rondonia = RegionalConfig {
            region_code: "11".to_string(),
            name: "Rondônia".to_string(),
            population: 1_800_000,
            top_sub_regions: 3,
            focus_sub_regions: Vec::new(),
        };
        let config = test_config()
            .with_regions(vec![RegionalConfig::default(), rondonia])
            .with_dimensions(&[Dimension::Regional]);

        let bundle = run(&path, &config).unwrap();
        let summaries = bundle.regional.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].region_code, "11");
        assert_eq!(summaries[1].total_cases, 4);
        assert_eq!(summaries[1].monthly.len(), 1);
        assert!(approx(summaries[1].national.share_of_national, 40.0));
    }
}
