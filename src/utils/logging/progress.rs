//! Progress reporting for long loads, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Template of the load spinner
pub const SPINNER_TEMPLATE: &str = "{spinner:.green} {elapsed_precise} {pos} rows {msg}";

/// Create a spinner for operations without a known length
///
/// Returns a hidden spinner when `visible` is false, so callers can tick it
/// unconditionally.
///
/// # Arguments
/// * `message` - Optional message to display with the spinner
/// * `visible` - Whether the spinner is drawn at all
#[must_use]
pub fn create_spinner(message: Option<&str>, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);

    if let Some(msg) = message {
        pb.set_message(msg.to_string());
    }

    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a spinner and clear it from the terminal
pub fn finish_spinner(pb: &ProgressBar) {
    pb.finish_and_clear();
}
