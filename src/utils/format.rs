//! Text helpers shared by the engine and the control surface.

use crate::core::CoreError;
use chrono::{DateTime, Local};
use std::time::SystemTime;

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with 1024-based units and two decimals, e.g. `1.50 KB`.
///
/// Negative sizes are rejected with [`CoreError::InvalidSize`].
pub fn format_size(size: i64) -> Result<String, CoreError> {
    if size < 0 {
        return Err(CoreError::InvalidSize(size));
    }

    let mut value = size as f64;
    for unit in &SIZE_UNITS[..SIZE_UNITS.len() - 1] {
        if value < 1024.0 {
            return Ok(format!("{:.2} {}", value, unit));
        }
        value /= 1024.0;
    }
    Ok(format!("{:.2} {}", value, SIZE_UNITS[SIZE_UNITS.len() - 1]))
}

/// Local `YYYY-MM-DD HH:MM:SS` rendering of a modification time.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Target names parsed from the multi-line input box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    pub targets: Vec<String>,
    pub duplicates_removed: usize,
}

/// Splits the raw input into one target per line.
///
/// Lines are trimmed, blank lines dropped and repeated lines removed,
/// keeping the first occurrence.
pub fn parse_targets(text: &str) -> TargetList {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut targets: Vec<String> = Vec::with_capacity(lines.len());
    for line in &lines {
        if !targets.iter().any(|t| t == line) {
            targets.push(line.to_string());
        }
    }

    TargetList {
        duplicates_removed: lines.len() - targets.len(),
        targets,
    }
}
