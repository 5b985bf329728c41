//! Notification records before and after age normalization

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::age_band::AgeBand;
use crate::models::symptom::{Symptom, SymptomSet};
use crate::models::types::{Classification, Outcome, Sex};

/// One notified case as coerced by the loader
///
/// Every field except the symptom set is nullable: a value that is missing or
/// cannot be coerced stays `None` and the record is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseRecord {
    /// `DT_NOTIFIC`
    pub notification_date: Option<NaiveDate>,
    /// `NU_ANO`
    pub notification_year: Option<i32>,
    /// Canonical state code
    pub region: Option<String>,
    /// Canonical municipality code
    pub sub_region: Option<String>,
    pub sex: Option<Sex>,
    /// `ANO_NASC`
    pub birth_year: Option<i32>,
    /// `NU_IDADE_N`, unit unknown until normalized
    pub raw_age: Option<f64>,
    pub symptoms: SymptomSet,
    pub classification: Option<Classification>,
    pub outcome: Option<Outcome>,
}

impl CaseRecord {
    /// Notification year, falling back to the year of the notification date
    #[must_use]
    pub fn effective_year(&self) -> Option<i32> {
        self.notification_year
            .or_else(|| self.notification_date.map(|d| d.year()))
    }

    /// `(year, month)` of the notification date
    #[must_use]
    pub fn year_month(&self) -> Option<YearMonth> {
        self.notification_date
            .map(|d| YearMonth::new(d.year(), d.month()))
    }

    /// Whether the symptom flag was "yes"
    #[must_use]
    pub const fn has_symptom(&self, symptom: Symptom) -> bool {
        self.symptoms.contains(symptom)
    }

    /// Whether the record is in `region`
    #[must_use]
    pub fn is_in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }

    /// Whether the outcome was death by dengue
    #[must_use]
    pub fn died_of_disease(&self) -> bool {
        self.outcome == Some(Outcome::DeathByDisease)
    }
}

/// Calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The following calendar month
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Calendar months from `self` to `later`; negative when `later` is earlier
    #[must_use]
    pub fn months_until(self, later: Self) -> i64 {
        (i64::from(later.year) - i64::from(self.year)) * 12 + i64::from(later.month)
            - i64::from(self.month)
    }

    /// `YYYY-MM` key
    #[must_use]
    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Which rule produced a record's normalized age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeSource {
    /// Notification year minus birth year
    BirthYear,
    /// Raw age field read as years
    RawYears,
    /// Raw age field read as days
    RawDays,
    /// Raw age field decoded from a unit-prefixed code
    RawUnitPrefixed,
    /// No rule produced a valid age
    Unresolved,
}

impl AgeSource {
    pub const ALL: [Self; 5] = [
        Self::BirthYear,
        Self::RawYears,
        Self::RawDays,
        Self::RawUnitPrefixed,
        Self::Unresolved,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BirthYear => "birth_year",
            Self::RawYears => "raw_years",
            Self::RawDays => "raw_days",
            Self::RawUnitPrefixed => "raw_unit_prefixed",
            Self::Unresolved => "unresolved",
        }
    }
}

/// A record together with its normalized age
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCase {
    pub record: CaseRecord,
    /// Age in years, always within [0, 120]
    pub age: Option<u8>,
    pub age_source: AgeSource,
}

impl NormalizedCase {
    /// Age band, `None` when the age could not be recovered
    #[must_use]
    pub fn age_band(&self) -> Option<AgeBand> {
        self.age.map(AgeBand::from_age)
    }
}
