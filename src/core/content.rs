//! Best-effort substring search inside a file's text.

use super::error::CoreError;
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_CONTENT_SIZE: u64 = 20 * 1024 * 1024; // 20MB

/// Reads candidate files as UTF-8 and tests them for a substring.
#[derive(Debug, Clone, Copy)]
pub struct ContentScanner {
    max_file_size: u64,
}

impl Default for ContentScanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTENT_SIZE)
    }
}

impl ContentScanner {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Case-sensitive containment check that never fails.
    ///
    /// Unreadable, oversized or non-UTF-8 files count as "no match"; the
    /// reason is logged so one bad file cannot stop a whole search.
    pub fn contains_text(&self, path: &Path, search_text: &str) -> bool {
        self.read_text(path)
            .is_some_and(|content| content.contains(search_text))
    }

    /// Fallible variant of [`Self::contains_text`].
    pub fn scan(&self, path: &Path, search_text: &str) -> Result<bool, CoreError> {
        Ok(self
            .load(path)?
            .is_some_and(|content| content.contains(search_text)))
    }

    /// The file's text, or `None` if it is too large or cannot be read.
    ///
    /// Read errors are logged here, so callers can test many targets
    /// against one read.
    pub fn read_text(&self, path: &Path) -> Option<String> {
        match self.load(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping content search in {}: {}", path.display(), e);
                None
            }
        }
    }

    fn load(&self, path: &Path) -> Result<Option<String>, CoreError> {
        let metadata = fs::metadata(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        if metadata.len() > self.max_file_size {
            tracing::debug!(
                "File too large for content search ({} bytes): {}",
                metadata.len(),
                path.display()
            );
            return Ok(None);
        }

        fs::read_to_string(path)
            .map(Some)
            .map_err(|e| CoreError::Io(e, path.to_path_buf()))
    }
}
