//! Canonical representation of coded fields
//!
//! Region and municipality codes are opaque strings. They are canonicalised once
//! at load time so that every later join or filter compares like with like:
//! numeric codes are left-zero-padded to a fixed width, float artefacts such as
//! `"42.0"` lose their fraction, and IBGE 7-digit municipality codes drop their
//! check digit. State codes never lose a digit. Non-numeric codes are only trimmed.

use serde::{Deserialize, Serialize};

/// Fixed widths for canonical codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeFormatConfig {
    /// Width of state codes (IBGE: 2)
    pub region_width: usize,
    /// Width of municipality codes (SINAN: 6)
    pub sub_region_width: usize,
    /// Drop the trailing check digit of municipality codes exactly one digit too long
    pub truncate_check_digit: bool,
}

impl Default for CodeFormatConfig {
    fn default() -> Self {
        Self {
            region_width: 2,
            sub_region_width: 6,
            truncate_check_digit: true,
        }
    }
}

/// Canonical form of a code, `None` when the value is blank
#[must_use]
pub fn canonical_code(raw: &str, width: usize, truncate_check_digit: bool) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits = strip_zero_fraction(trimmed);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Some(trimmed.to_string());
    }

    if truncate_check_digit && digits.len() == width + 1 {
        return Some(digits[..width].to_string());
    }

    Some(format!("{digits:0>width$}"))
}

/// Parse a coded numeric field permissively (`"2"`, `" 2 "`, `"2.0"`)
#[must_use]
pub fn parse_numeric_code(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        // Integral by construction
        Some(value as i64)
    } else {
        None
    }
}

/// Parse a numeric field permissively; non-numeric or non-finite values are `None`
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Canonical form of a yes/no flag value, for comparison with the "yes" sentinel
#[must_use]
pub fn canonical_flag(raw: &str) -> &str {
    strip_zero_fraction(raw.trim())
}

fn strip_zero_fraction(s: &str) -> &str {
    match s.split_once('.') {
        Some((int, frac))
            if !int.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c == '0') =>
        {
            int
        }
        _ => s,
    }
}
