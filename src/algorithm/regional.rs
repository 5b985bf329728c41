//! Drill-down into one state: municipalities, monthly trend and incidence
//! compared with the whole country.

use itertools::Itertools;
use log::warn;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::algorithm::aggregate::CategoryCount;
use crate::algorithm::percentage;
use crate::config::RegionalConfig;
use crate::models::case::{NormalizedCase, YearMonth};
use crate::schema::codes::{CodeFormatConfig, canonical_code};

/// Cases per 100 000 inhabitants
pub const INCIDENCE_SCALE: f64 = 100_000.0;

/// Longest month span that is zero-filled (50 years)
pub const MAX_FILLED_MONTHS: i64 = 600;

/// Cases in one calendar month and the change from the previous month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// `YYYY-MM`
    pub month: String,
    pub cases: u64,
    /// Percent change from the previous month; 0 for the first month and
    /// after a month without cases
    pub growth: f64,
}

/// Cases in a named municipality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusCount {
    pub code: String,
    pub name: String,
    pub cases: u64,
}

/// The region measured against the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalComparison {
    /// Share of all records that fall in the region
    pub share_of_national: f64,
    pub region_incidence_per_100k: f64,
    pub national_incidence_per_100k: f64,
    /// Region incidence over national incidence; 0 when the latter is 0
    pub incidence_ratio: f64,
}

/// Statistics for one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalSummary {
    pub region_code: String,
    pub name: String,
    pub total_cases: u64,
    pub distinct_sub_regions: usize,
    /// Municipalities by case count; percentages relative to the region
    pub top_sub_regions: Vec<CategoryCount>,
    pub focus: Vec<FocusCount>,
    pub monthly: Vec<MonthPoint>,
    pub national: NationalComparison,
}

/// Cases per 100 000 inhabitants; 0 for an unknown population
#[must_use]
pub fn incidence_per_100k(cases: u64, population: u64) -> f64 {
    if population == 0 {
        0.0
    } else {
        cases as f64 / population as f64 * INCIDENCE_SCALE
    }
}

/// `(C_r / P_r) / (C_n / P_n)`; 0 when the national incidence is 0
#[must_use]
pub fn incidence_ratio(
    region_cases: u64,
    region_population: u64,
    national_cases: u64,
    national_population: u64,
) -> f64 {
    let national = incidence_per_100k(national_cases, national_population);
    if national == 0.0 {
        0.0
    } else {
        incidence_per_100k(region_cases, region_population) / national
    }
}

/// Month-over-month change in percent
///
/// The first entry is 0, as is every entry following a zero month.
#[must_use]
pub fn growth_series(counts: &[u64]) -> Vec<f64> {
    let mut growth = Vec::with_capacity(counts.len());
    if counts.is_empty() {
        return growth;
    }
    growth.push(0.0);
    for (previous, current) in counts.iter().tuple_windows() {
        if *previous == 0 {
            growth.push(0.0);
        } else {
            growth.push((*current as f64 - *previous as f64) / *previous as f64 * 100.0);
        }
    }
    growth
}

/// Cases per month between the first and last observed month, gaps zero-filled
///
/// A span longer than [`MAX_FILLED_MONTHS`] means outlier dates; only observed
/// months are listed then.
#[must_use]
pub fn month_series<'a>(cases: impl IntoIterator<Item = &'a NormalizedCase>) -> Vec<MonthPoint> {
    let mut counts: FxHashMap<YearMonth, u64> = FxHashMap::default();
    for case in cases {
        if let Some(month) = case.record.year_month() {
            *counts.entry(month).or_insert(0) += 1;
        }
    }

    let (Some(first), Some(last)) = (counts.keys().min().copied(), counts.keys().max().copied())
    else {
        return Vec::new();
    };

    let months: Vec<YearMonth> = if first.months_until(last) > MAX_FILLED_MONTHS {
        warn!(
            "Notification months span {} to {}; listing observed months only",
            first.key(),
            last.key()
        );
        counts.keys().copied().sorted().collect()
    } else {
        let mut months = Vec::new();
        let mut month = first;
        while month <= last {
            months.push(month);
            month = month.succ();
        }
        months
    };

    let series: Vec<u64> = months
        .iter()
        .map(|m| counts.get(m).copied().unwrap_or(0))
        .collect();
    let growth = growth_series(&series);

    months
        .into_iter()
        .zip(series)
        .zip(growth)
        .map(|((month, cases), growth)| MonthPoint {
            month: month.key(),
            cases,
            growth,
        })
        .collect()
}

/// Drill-down for one configured region
///
/// Every field is present even when the region has no cases.
#[must_use]
pub fn regional_summary(
    cases: &[NormalizedCase],
    region: &RegionalConfig,
    national_population: u64,
    codes: &CodeFormatConfig,
) -> RegionalSummary {
    let region_code = canonical_code(&region.region_code, codes.region_width, false)
        .unwrap_or_else(|| region.region_code.clone());
    let in_region: Vec<&NormalizedCase> = cases
        .iter()
        .filter(|c| c.record.is_in_region(&region_code))
        .collect();
    let total_cases = in_region.len() as u64;
    let national_cases = cases.len() as u64;

    let mut by_sub_region: FxHashMap<&str, u64> = FxHashMap::default();
    for case in &in_region {
        if let Some(code) = case.record.sub_region.as_deref() {
            *by_sub_region.entry(code).or_insert(0) += 1;
        }
    }
    let distinct_sub_regions = by_sub_region.len();

    let top_sub_regions = by_sub_region
        .iter()
        .sorted_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)))
        .take(region.top_sub_regions)
        .map(|(code, count)| CategoryCount::new(*code, *count, total_cases))
        .collect();

    let focus = region
        .focus_sub_regions
        .iter()
        .map(|f| {
            let code = canonical_code(&f.code, codes.sub_region_width, codes.truncate_check_digit)
                .unwrap_or_else(|| f.code.clone());
            FocusCount {
                cases: by_sub_region.get(code.as_str()).copied().unwrap_or(0),
                code,
                name: f.name.clone(),
            }
        })
        .collect();

    let national = NationalComparison {
        share_of_national: percentage(total_cases, national_cases),
        region_incidence_per_100k: incidence_per_100k(total_cases, region.population),
        national_incidence_per_100k: incidence_per_100k(national_cases, national_population),
        incidence_ratio: incidence_ratio(
            total_cases,
            region.population,
            national_cases,
            national_population,
        ),
    };

    RegionalSummary {
        region_code,
        name: region.name.clone(),
        total_cases,
        distinct_sub_regions,
        top_sub_regions,
        focus,
        monthly: month_series(in_region.iter().copied()),
        national,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubRegionFocus;
    use crate::models::case::{AgeSource, CaseRecord};
    use chrono::NaiveDate;

    fn case(region: &str, sub_region: &str, date: Option<(i32, u32, u32)>) -> NormalizedCase {
        NormalizedCase {
            record: CaseRecord {
                region: Some(region.to_string()),
                sub_region: Some(sub_region.to_string()),
                notification_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                ..CaseRecord::default()
            },
            age: None,
            age_source: AgeSource::Unresolved,
        }
    }

    #[test]
    fn test_growth_rules() {
        let growth = growth_series(&[10, 15, 0, 4, 2]);
        assert_eq!(growth.len(), 5);
        assert!(growth[0].abs() < f64::EPSILON);
        assert!((growth[1] - 50.0).abs() < 1e-9);
        assert!((growth[2] + 100.0).abs() < 1e-9);
        assert!(growth[3].abs() < f64::EPSILON);
        assert!((growth[4] + 50.0).abs() < 1e-9);
        assert!(growth_series(&[]).is_empty());
    }

    #[test]
    fn test_incidence_ratio() {
        let ratio = incidence_ratio(700, 7_000_000, 21_200, 212_000_000);
        assert!((ratio - 1.0).abs() < 1e-9);
        assert!(incidence_ratio(5, 100, 0, 1000).abs() < f64::EPSILON);
        assert!(incidence_per_100k(5, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_month_gaps_are_zero_filled_across_years() {
        let cases = vec![
            case("42", "420460", Some((2024, 11, 3))),
            case("42", "420460", Some((2025, 2, 1))),
            case("42", "420460", Some((2025, 2, 9))),
            case("42", "420460", None),
        ];
        let series = month_series(&cases);
        let keys: Vec<_> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(keys, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(series[1].cases, 0);
        assert_eq!(series[3].cases, 2);
        assert!(series[3].growth.abs() < f64::EPSILON);
    }

    #[test]
    fn test_outlier_date_does_not_stretch_series() {
        let cases = vec![
            case("42", "420460", Some((1, 1, 1))),
            case("42", "420460", Some((2025, 1, 5))),
            case("42", "420460", Some((2025, 3, 5))),
        ];
        let series = month_series(&cases);
        let keys: Vec<_> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(keys, vec!["0001-01", "2025-01", "2025-03"]);
        assert!(series.iter().all(|p| p.cases == 1));
    }

    #[test]
    fn test_summary_for_region() {
        let cases = vec![
            case("42", "420460", Some((2025, 1, 5))),
            case("42", "420460", Some((2025, 2, 5))),
            case("42", "420540", Some((2025, 2, 6))),
            case("11", "110020", Some((2025, 2, 6))),
        ];
        let config = RegionalConfig {
            top_sub_regions: 1,
            focus_sub_regions: vec![SubRegionFocus {
                code: "4204608".to_string(),
                name: "Criciúma".to_string(),
            }],
            ..RegionalConfig::default()
        };
        let summary = regional_summary(&cases, &config, 212_000_000, &CodeFormatConfig::default());

        assert_eq!(summary.total_cases, 3);
        assert_eq!(summary.distinct_sub_regions, 2);
        assert_eq!(summary.top_sub_regions.len(), 1);
        assert_eq!(summary.top_sub_regions[0].key, "420460");
        assert_eq!(summary.focus[0].code, "420460");
        assert_eq!(summary.focus[0].cases, 2);
        assert!((summary.national.share_of_national - 75.0).abs() < 1e-9);
        assert!((summary.monthly[1].growth - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_region_still_reports_every_field() {
        let cases = vec![case("11", "110020", Some((2025, 1, 1)))];
        let summary = regional_summary(
            &cases,
            &RegionalConfig::default(),
            212_000_000,
            &CodeFormatConfig::default(),
        );
        assert_eq!(summary.total_cases, 0);
        assert!(summary.monthly.is_empty());
        assert_eq!(summary.focus.len(), 1);
        assert_eq!(summary.focus[0].cases, 0);
        assert!(summary.national.incidence_ratio.abs() < f64::EPSILON);
    }
}
