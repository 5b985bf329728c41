#[cfg(test)]
mod tests {
    use dengue_stats::AgeNormalizer;
    use dengue_stats::algorithm::{aggregate, crosstab, regional};
    use dengue_stats::config::{AgeNormalizationConfig, RegionalConfig};
    use dengue_stats::models::{NormalizedCase, Symptom};
    use dengue_stats::schema::CodeFormatConfig;
    use dengue_stats::utils::test::generate_synthetic_records;

    fn synthetic_cases(count: usize, seed: u64) -> Vec<NormalizedCase> {
        let config = AgeNormalizationConfig::default();
        let (cases, _) = AgeNormalizer::new(&config).normalize_all(generate_synthetic_records(count, seed));
        cases
    }

    #[test]
    fn test_band_counts_never_exceed_total() {
        for seed in [1, 2, 3] {
            let cases = synthetic_cases(1_500, seed);
            let total = cases.len() as u64;
            let with_age = cases.iter().filter(|c| c.age.is_some()).count() as u64;

            let bands = crosstab::age_band_stats(&cases);
            let banded: u64 = bands.iter().map(|b| b.count).sum();
            assert_eq!(banded, with_age);
            assert!(banded <= total);
            for band in &bands {
                assert!(band.deaths <= band.count);
                assert!((0.0..=100.0).contains(&band.death_rate));
            }

            for breakdown in crosstab::sex_by_age_band(&cases) {
                let by_sex: u64 = breakdown.items.iter().map(|i| i.count).sum();
                assert!(by_sex <= breakdown.total);
            }
        }
    }

    #[test]
    fn test_percentages_stay_within_bounds() {
        let cases = synthetic_cases(2_000, 42);
        let blocks = [
            aggregate::count_by_region(&cases, None),
            aggregate::count_by_year(&cases),
            aggregate::count_by_month(&cases),
            aggregate::count_by_sex(&cases),
            aggregate::count_by_symptom(&cases, &Symptom::ALL),
            aggregate::count_by_classification(&cases),
            aggregate::count_by_outcome(&cases),
        ];
        for block in &blocks {
            for item in block {
                assert!((0.0..=100.0).contains(&item.percentage), "{item:?}");
            }
        }
        // Mutually exclusive categories never sum above 100 %
        for block in &blocks[..4] {
            let sum: f64 = block.iter().map(|i| i.percentage).sum();
            assert!(sum <= 100.0 + 1e-9);
        }
        for block in &blocks[5..] {
            let sum: f64 = block.iter().map(|i| i.percentage).sum();
            assert!(sum <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn test_symptom_pairs_are_symmetric_and_bounded() {
        let cases = synthetic_cases(1_000, 9);
        let singles = aggregate::count_by_symptom(&cases, &Symptom::ALL);

        for a in Symptom::ALL {
            for b in Symptom::ALL {
                assert_eq!(
                    crosstab::co_occurrence(&cases, a, b),
                    crosstab::co_occurrence(&cases, b, a)
                );
            }
        }

        let pairs = crosstab::symptom_pairs(&cases, &Symptom::ALL, 55);
        assert!(pairs.len() <= 55);
        for window in pairs.windows(2) {
            assert!(window[0].count >= window[1].count);
        }
        for pair in &pairs {
            assert_ne!(pair.first, pair.second);
            assert!(pair.first < pair.second);
            let first = singles.iter().find(|s| s.key == pair.first.key()).unwrap();
            let second = singles.iter().find(|s| s.key == pair.second.key()).unwrap();
            assert!(pair.count <= first.count.min(second.count));
        }
    }

    #[test]
    fn test_regional_totals_match_region_breakdown() {
        let cases = synthetic_cases(1_000, 5);
        let summary = regional::regional_summary(
            &cases,
            &RegionalConfig::default(),
            212_000_000,
            &CodeFormatConfig::default(),
        );
        let regions = aggregate::count_by_region(&cases, None);
        let sc = regions.iter().find(|r| r.key == "42").map_or(0, |r| r.count);
        assert_eq!(summary.total_cases, sc);

        let monthly: u64 = summary.monthly.iter().map(|m| m.cases).sum();
        assert_eq!(monthly, sc);
        let by_sub_region: u64 = summary.top_sub_regions.iter().map(|s| s.count).sum();
        assert!(by_sub_region <= sc);
    }
}
