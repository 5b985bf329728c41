//! Configuration for a processing run.
//!
//! Defaults reproduce the constants the dashboard has always been fed with
//! (SINAN column names, Santa Catarina drill-down, 2025 population
//! approximations). Every value can be overridden from a JSON file, a handful of
//! environment variables, or the command line.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::util::safe_open_file;
use crate::error::{Result, StatsError};
use crate::schema::codes::CodeFormatConfig;
use crate::schema::columns::ColumnMapping;
use crate::schema::date_utils::DateFormatConfig;

/// Environment variable overriding the national population
pub const ENV_NATIONAL_POPULATION: &str = "DENGUE_NATIONAL_POPULATION";
/// Environment variable overriding the number of symptom pairs reported
pub const ENV_TOP_PAIRS: &str = "DENGUE_TOP_PAIRS";
/// Environment variable overriding the worker count
pub const ENV_THREADS: &str = "DENGUE_THREADS";

/// A block of statistics that can be requested for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    Year,
    Month,
    Sex,
    Symptom,
    Classification,
    Outcome,
    AgeBand,
    SymptomsByAgeBand,
    SexByAgeBand,
    SexProfile,
    SymptomPairs,
    Regional,
}

impl Dimension {
    pub const ALL: [Self; 13] = [
        Self::Region,
        Self::Year,
        Self::Month,
        Self::Sex,
        Self::Symptom,
        Self::Classification,
        Self::Outcome,
        Self::AgeBand,
        Self::SymptomsByAgeBand,
        Self::SexByAgeBand,
        Self::SexProfile,
        Self::SymptomPairs,
        Self::Regional,
    ];

    /// Key of the block in the output bundle
    #[must_use]
    pub const fn bundle_key(self) -> &'static str {
        match self {
            Self::Region => "by_region",
            Self::Year => "by_year",
            Self::Month => "by_month",
            Self::Sex => "by_sex",
            Self::Symptom => "by_symptom",
            Self::Classification => "by_classification",
            Self::Outcome => "by_outcome",
            Self::AgeBand => "age_bands",
            Self::SymptomsByAgeBand => "symptoms_by_age_band",
            Self::SexByAgeBand => "sex_by_age_band",
            Self::SexProfile => "sex_profile",
            Self::SymptomPairs => "symptom_pairs",
            Self::Regional => "regional",
        }
    }
}

/// Which rule the age normalizer tries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRule {
    /// Notification year minus birth year
    BirthYear,
    /// The raw age field, decoded per [`RawAgeEncoding`]
    RawAge,
}

/// How the raw age field is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAgeEncoding {
    /// Values above the days threshold are days, values in [0, 120] are years
    Magnitude,
    /// Leading digit is the unit (1 hours, 2 days, 3 months, 4 years), the
    /// remaining digits the amount, e.g. `4025` is 25 years
    UnitPrefixed,
}

/// Age normalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeNormalizationConfig {
    /// Rules in priority order
    pub rules: Vec<AgeRule>,
    pub raw_age_encoding: RawAgeEncoding,
    /// Raw ages strictly greater than this are read as days
    pub days_threshold: f64,
    /// Divisor converting days to years
    pub days_per_year: f64,
}

impl Default for AgeNormalizationConfig {
    fn default() -> Self {
        Self {
            rules: vec![AgeRule::BirthYear, AgeRule::RawAge],
            raw_age_encoding: RawAgeEncoding::Magnitude,
            days_threshold: 1000.0,
            days_per_year: 365.25,
        }
    }
}

/// A municipality reported on its own in a regional drill-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRegionFocus {
    /// Municipality code, canonicalised like the source codes
    pub code: String,
    pub name: String,
}

/// Settings for one regional drill-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalConfig {
    /// State code, e.g. `"42"`
    pub region_code: String,
    pub name: String,
    /// Resident population used for incidence
    pub population: u64,
    /// Number of municipalities listed by count
    pub top_sub_regions: usize,
    pub focus_sub_regions: Vec<SubRegionFocus>,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        Self {
            region_code: "42".to_string(),
            name: "Santa Catarina".to_string(),
            population: 7_000_000,
            top_sub_regions: 10,
            focus_sub_regions: vec![SubRegionFocus {
                code: "420460".to_string(),
                name: "Criciúma".to_string(),
            }],
        }
    }
}

/// CSV reading options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter; sniffed from the header line when unset
    pub delimiter: Option<char>,
}

/// Configuration for a processing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub columns: ColumnMapping,
    pub codes: CodeFormatConfig,
    pub dates: DateFormatConfig,
    pub csv: CsvOptions,
    /// Canonical value meaning "symptom present"
    pub symptom_yes_code: String,
    pub age: AgeNormalizationConfig,
    /// Blocks computed this run
    pub dimensions: Vec<Dimension>,
    /// Maximum number of regions in the region breakdown
    pub region_limit: Option<usize>,
    /// Number of symptom pairs reported
    pub top_symptom_pairs: usize,
    pub national_population: u64,
    pub regions: Vec<RegionalConfig>,
    /// Worker threads for aggregation; `None` uses every core
    pub threads: Option<usize>,
    /// Show a spinner while loading
    pub show_progress: bool,
    /// Pretty-print the bundle
    pub pretty_json: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            codes: CodeFormatConfig::default(),
            dates: DateFormatConfig::default(),
            csv: CsvOptions::default(),
            symptom_yes_code: "1".to_string(),
            age: AgeNormalizationConfig::default(),
            dimensions: Dimension::ALL.to_vec(),
            region_limit: Some(20),
            top_symptom_pairs: 5,
            national_population: 212_000_000,
            regions: vec![RegionalConfig::default()],
            threads: None,
            show_progress: true,
            pretty_json: true,
        }
    }
}

impl ProcessorConfig {
    /// Create a configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "reading configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| StatsError::config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_NATIONAL_POPULATION) {
            self.national_population = parse_env(ENV_NATIONAL_POPULATION, &value)?;
        }
        if let Some(value) = lookup(ENV_TOP_PAIRS) {
            self.top_symptom_pairs = parse_env(ENV_TOP_PAIRS, &value)?;
        }
        if let Some(value) = lookup(ENV_THREADS) {
            self.threads = Some(parse_env(ENV_THREADS, &value)?);
        }
        Ok(self)
    }

    /// Reject settings that cannot produce a meaningful bundle
    pub fn validate(&self) -> Result<()> {
        if self.age.days_per_year <= 0.0 || !self.age.days_per_year.is_finite() {
            return Err(StatsError::config("age.days_per_year must be positive"));
        }
        if !self.age.days_threshold.is_finite() || self.age.days_threshold < 0.0 {
            return Err(StatsError::config("age.days_threshold must be non-negative"));
        }
        if self.age.rules.is_empty() {
            return Err(StatsError::config("age.rules must name at least one rule"));
        }
        if self.symptom_yes_code.trim().is_empty() {
            return Err(StatsError::config("symptom_yes_code must not be empty"));
        }
        if self.threads == Some(0) {
            return Err(StatsError::config("threads must be at least 1"));
        }
        for region in &self.regions {
            if region.region_code.trim().is_empty() {
                return Err(StatsError::config(format!(
                    "regional drill-down '{}' has an empty region code",
                    region.name
                )));
            }
        }
        Ok(())
    }

    /// Whether a block was requested
    #[must_use]
    pub fn wants(&self, dimension: Dimension) -> bool {
        self.dimensions.contains(&dimension)
    }

    /// Number of aggregation workers
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Restrict the run to the given blocks
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: &[Dimension]) -> Self {
        self.dimensions = dimensions.to_vec();
        self
    }

    /// Replace the regional drill-downs
    #[must_use]
    pub fn with_regions(mut self, regions: Vec<RegionalConfig>) -> Self {
        self.regions = regions;
        self
    }

    /// Set the national population
    #[must_use]
    pub const fn with_national_population(mut self, population: u64) -> Self {
        self.national_population = population;
        self
    }

    /// Enable or disable the load spinner
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Set the age normalization settings
    #[must_use]
    pub fn with_age(mut self, age: AgeNormalizationConfig) -> Self {
        self.age = age;
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StatsError::config(format!("{key}: cannot parse '{value}'")))
}

impl fmt::Display for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processor Configuration:")?;
        writeln!(f, "  Age Rules: {:?}", self.age.rules)?;
        writeln!(f, "  Raw Age Encoding: {:?}", self.age.raw_age_encoding)?;
        writeln!(f, "  Days Threshold: {}", self.age.days_threshold)?;
        writeln!(f, "  Symptom Yes Code: {}", self.symptom_yes_code)?;
        writeln!(f, "  Dimensions: {}", self.dimensions.len())?;
        if let Some(limit) = self.region_limit {
            writeln!(f, "  Region Limit: {limit}")?;
        }
        writeln!(f, "  Top Symptom Pairs: {}", self.top_symptom_pairs)?;
        writeln!(f, "  National Population: {}", self.national_population)?;
        for region in &self.regions {
            writeln!(
                f,
                "  Region: {} ({}) population {}",
                region.name, region.region_code, region.population
            )?;
        }
        writeln!(f, "  Workers: {}", self.worker_count())?;
        Ok(())
    }
}
