//! Arrow utilities
//!
//! Helpers for reading Arrow columns as text so that Parquet sources share
//! the CSV coercion path.

pub mod array_utils;

pub use array_utils::{downcast_array, utf8_column};
