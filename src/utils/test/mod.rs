//! Test utilities for testing and benchmarking
//!
//! Builders for hand-written records, a seeded generator for larger inputs and
//! a writer producing SINAN-shaped CSV files from either.


// Re-export commonly used functions for convenience
pub use fixtures::{CaseBuilder, write_sinan_csv};
pub use generator::generate_synthetic_records;
