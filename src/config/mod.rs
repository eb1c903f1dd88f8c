pub mod settings;

use crate::core::matcher::DEFAULT_FUZZY_THRESHOLD;
use crate::core::{MatchOptions, PartialMode, SelectionPolicy, SortKey};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub default_directory: Option<PathBuf>,
    pub exact_match: bool,
    pub case_sensitive: bool,
    pub search_content: bool,
    pub partial_mode: PartialMode,
    pub fuzzy_threshold: f32,
    pub selection_policy: SelectionPolicy,
    pub sort_key: SortKey,
    pub max_content_file_size_mb: u64,
    pub exclude_patterns: Vec<String>,
    pub follow_links: bool,
    pub history_limit: usize,
    pub progress_interval: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }

    /// The matching flags this configuration starts a search with.
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            exact_match: self.exact_match,
            case_sensitive: self.case_sensitive,
            search_content: self.search_content,
            partial_mode: self.partial_mode,
            fuzzy_threshold: self.fuzzy_threshold,
        }
    }

    pub fn max_content_file_size(&self) -> u64 {
        self.max_content_file_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_directory: dirs::home_dir(),
            exact_match: false,
            case_sensitive: false,
            search_content: false,
            partial_mode: PartialMode::Substring,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            selection_policy: SelectionPolicy::All,
            sort_key: SortKey::None,
            max_content_file_size_mb: 20,
            exclude_patterns: Vec::new(),
            follow_links: false,
            history_limit: 10,
            progress_interval: 25,
        }
    }
}
