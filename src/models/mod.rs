//! Domain model for notification records

pub mod age_band;
pub mod case;
pub mod geo;
pub mod symptom;
pub mod types;

pub use age_band::AgeBand;
pub use case::{AgeSource, CaseRecord, NormalizedCase, YearMonth};
pub use symptom::{Symptom, SymptomSet};
pub use types::{Classification, Outcome, Sex};
