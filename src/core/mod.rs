pub mod content;
pub mod error;
pub mod exclude;
pub mod extensions;
pub mod matcher;
pub mod record;
pub mod search;
pub mod selector;

use globset::GlobSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use content::ContentScanner;
pub use error::CoreError;
pub use exclude::build_exclude_set;
pub use extensions::{extensions_from_selection, ExtensionSet};
pub use matcher::{is_match, MatchOptions, PartialMode};
pub use record::{FileRecord, ResultRow};
pub use search::{CancellationToken, FileSearcher, SearchOutcome};
pub use selector::{select, DateRange, Selection, SelectionPolicy, SizeRange, SortKey};

/// Immutable configuration of a single search.
///
/// Construction validates the request, so a `SearchSpec` that exists always
/// points at a readable directory and carries at least one target.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    directory: PathBuf,
    targets: Vec<String>,
    extensions: ExtensionSet,
    options: MatchOptions,
    exclude_patterns: Vec<String>,
    exclude_set: GlobSet,
    follow_links: bool,
}

impl SearchSpec {
    /// Validates and builds a search request.
    ///
    /// Targets are trimmed, blank ones dropped and duplicates removed while
    /// keeping the first occurrence.
    pub fn new<P, I, S>(
        directory: P,
        targets: I,
        extensions: ExtensionSet,
        options: MatchOptions,
    ) -> Result<Self, CoreError>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let directory = validate_directory(directory.as_ref())?;

        let mut cleaned: Vec<String> = Vec::new();
        for target in targets {
            let trimmed = target.as_ref().trim();
            if !trimmed.is_empty() && !cleaned.iter().any(|t| t == trimmed) {
                cleaned.push(trimmed.to_string());
            }
        }
        if cleaned.is_empty() {
            return Err(CoreError::EmptyTargets);
        }

        if !(0.0..=1.0).contains(&options.fuzzy_threshold) {
            return Err(CoreError::InvalidThreshold(options.fuzzy_threshold));
        }

        Ok(Self {
            directory,
            targets: cleaned,
            extensions,
            options,
            exclude_patterns: Vec::new(),
            exclude_set: GlobSet::empty(),
            follow_links: false,
        })
    }

    /// Adds gitignore-style patterns that prune entries from the walk.
    pub fn with_exclude_patterns<S: AsRef<str>>(
        mut self,
        patterns: &[S],
    ) -> Result<Self, CoreError> {
        self.exclude_set = build_exclude_set(patterns)?;
        self.exclude_patterns = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        Ok(self)
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Returns `true` if the path is pruned by an exclude pattern.
    ///
    /// Patterns see the path relative to the search root, so directories
    /// above the root never match.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude_set.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.directory).unwrap_or(path);
        !relative.as_os_str().is_empty() && self.exclude_set.is_match(relative)
    }
}

fn validate_directory(directory: &Path) -> Result<PathBuf, CoreError> {
    if directory.as_os_str().is_empty() || !directory.exists() {
        return Err(CoreError::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(CoreError::NotADirectory(directory.to_path_buf()));
    }
    fs::read_dir(directory).map_err(|e| CoreError::Io(e, directory.to_path_buf()))?;
    std::path::absolute(directory).map_err(|e| CoreError::Io(e, directory.to_path_buf()))
}

/// The paths that matched one target, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub target: String,
    pub paths: Vec<PathBuf>,
}

/// Per-target match results of one search, in target order.
///
/// Every target of the originating [`SearchSpec`] has a group, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroups {
    groups: Vec<MatchGroup>,
}

impl MatchGroups {
    pub fn with_targets(targets: &[String]) -> Self {
        Self {
            groups: targets
                .iter()
                .map(|target| MatchGroup {
                    target: target.clone(),
                    paths: Vec::new(),
                })
                .collect(),
        }
    }

    /// Appends a path to the group at `index` (the target's position in the spec).
    pub(crate) fn push(&mut self, index: usize, path: PathBuf) {
        if let Some(group) = self.groups.get_mut(index) {
            group.paths.push(path);
        }
    }

    pub fn get(&self, target: &str) -> Option<&[PathBuf]> {
        self.groups
            .iter()
            .find(|group| group.target == target)
            .map(|group| group.paths.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchGroup> {
        self.groups.iter()
    }

    pub fn total_matches(&self) -> usize {
        self.groups.iter().map(|group| group.paths.len()).sum()
    }

    /// `true` when no target matched anything.
    pub fn is_empty(&self) -> bool {
        self.total_matches() == 0
    }

    /// All paths, target by target, each in discovery order.
    pub fn flatten(&self) -> Vec<PathBuf> {
        self.groups
            .iter()
            .flat_map(|group| group.paths.iter().cloned())
            .collect()
    }
}

impl<'a> IntoIterator for &'a MatchGroups {
    type Item = &'a MatchGroup;
    type IntoIter = std::slice::Iter<'a, MatchGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Periodic progress report from a running search.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchProgress {
    pub files_visited: usize,
    pub matches_found: usize,
    pub current_path: String,
}
