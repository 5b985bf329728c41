//! Utility functions shared by the loaders and the pipeline

pub mod arrow;
pub mod logging;
pub mod test;

pub use logging::{log_operation_complete, log_operation_start, log_warning};
