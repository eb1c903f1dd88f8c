//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Validation variants are raised before a search starts. The per-item
/// variants (`Io`) are returned by the lowest-level helpers so that the
/// walker can decide to log and skip them instead of aborting.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// No directory was given, or it does not exist.
    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    /// Represents a path that was expected to be a directory but was not.
    #[error("Path is not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// The target list was empty after cleaning.
    #[error("Please enter at least one filename")]
    EmptyTargets,

    /// A date range string did not have the `YYYY-MM-DD - YYYY-MM-DD` shape.
    #[error("Invalid date range '{0}', expected 'YYYY-MM-DD - YYYY-MM-DD'")]
    InvalidDateRange(String),

    /// A negative size was handed to the size formatter.
    #[error("Invalid size: {0}")]
    InvalidSize(i64),

    /// The fuzzy similarity threshold was outside `0.0..=1.0`.
    #[error("Fuzzy threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f32),

    /// Represents an error during the parsing or building of a glob pattern.
    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] globset::Error),

    /// A search was requested while another one is still running.
    #[error("A search is already running")]
    SearchInProgress,

    /// Represents an error that occurred when a Tokio task was joined.
    /// This is often due to a task panicking or being cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl CoreError {
    /// Returns `true` for errors that reject a request before any work starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_)
                | Self::NotADirectory(_)
                | Self::EmptyTargets
                | Self::InvalidDateRange(_)
                | Self::InvalidThreshold(_)
                | Self::GlobPattern(_)
        )
    }
}
