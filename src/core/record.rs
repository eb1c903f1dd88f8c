//! Per-file metadata looked up at display time.

use super::error::CoreError;
use crate::utils::format::{format_size, format_timestamp};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata of one matched file, derived on demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub full_path: PathBuf,
    pub size_bytes: u64,
    pub modified: SystemTime,
}

impl FileRecord {
    /// Stats `path`. Fails if the file disappeared since it was found.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let metadata = fs::metadata(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        let modified = metadata
            .modified()
            .map_err(|e| CoreError::Io(e, path.to_path_buf()))?;

        Ok(Self {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            full_path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified,
        })
    }

    /// Like [`Self::from_path`], but logs and drops files that vanished.
    pub fn lookup(path: &Path) -> Option<Self> {
        match Self::from_path(path) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Excluding missing result {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// One row handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub display_name: String,
    pub full_path: PathBuf,
    pub size_bytes: u64,
    pub size_display: String,
    pub last_modified: String,
}

impl From<&FileRecord> for ResultRow {
    fn from(record: &FileRecord) -> Self {
        let size_display = i64::try_from(record.size_bytes)
            .map_err(|_| CoreError::InvalidSize(i64::MAX))
            .and_then(format_size)
            .unwrap_or_else(|e| e.to_string());

        Self {
            display_name: record.name.clone(),
            full_path: record.full_path.clone(),
            size_bytes: record.size_bytes,
            size_display,
            last_modified: format_timestamp(record.modified),
        }
    }
}
