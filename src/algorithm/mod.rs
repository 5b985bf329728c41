//! Statistics computed over the normalized record set
//!
//! Every function here is pure: it reads an immutable slice of
//! [`NormalizedCase`](crate::models::NormalizedCase)s and returns a
//! serializable block.

pub mod age;
pub mod aggregate;
pub mod crosstab;
pub mod regional;

/// `count / total` as a percentage; 0 when `total` is 0
#[must_use]
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
