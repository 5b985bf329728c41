//! A Rust library for turning dengue notification records (CSV or Parquet)
//! into the aggregated statistics bundle consumed by the dashboard.

pub mod algorithm;
pub mod bundle;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{Dimension, ProcessorConfig, RegionalConfig};
pub use error::{Result, StatsError};
pub use models::{AgeBand, CaseRecord, NormalizedCase, Symptom};

// Loading
pub use loader::{LoadReport, LoadedRecords, SourceFormat, load_records};

// Aggregation
pub use algorithm::age::{AgeNormalizationReport, AgeNormalizer};
pub use bundle::{AggregateBundle, write_bundle};
pub use pipeline::{InspectReport, build_bundle, inspect, process, run};
