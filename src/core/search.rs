//! The tree walker: one pass over the directory, every file against every target.

use super::content::ContentScanner;
use super::matcher;
use super::{MatchGroups, SearchProgress, SearchSpec};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

const PROGRESS_UPDATE_INTERVAL: usize = 25;

/// Shared stop flag for a running search.
///
/// Clones observe the same flag. The walker polls it per directory, per
/// file and per target, and returns whatever it has collected so far.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns `true` only for the call that set the flag.
    pub fn cancel(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clears the flag before the next search starts.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// What a finished (or stopped) walk produced.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub groups: MatchGroups,
    /// `true` if the walk stopped early; `groups` then holds a valid prefix.
    pub cancelled: bool,
    pub files_visited: usize,
    /// Directory entries that could not be read and were skipped.
    pub entries_skipped: usize,
}

/// Runs searches. Holds only tuning knobs, so one instance can be reused.
#[derive(Debug, Clone)]
pub struct FileSearcher {
    content_scanner: ContentScanner,
    progress_interval: usize,
}

impl Default for FileSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSearcher {
    pub fn new() -> Self {
        Self {
            content_scanner: ContentScanner::default(),
            progress_interval: PROGRESS_UPDATE_INTERVAL,
        }
    }

    pub fn with_content_scanner(mut self, content_scanner: ContentScanner) -> Self {
        self.content_scanner = content_scanner;
        self
    }

    /// Report progress every `interval` files (minimum 1).
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn search(&self, spec: &SearchSpec, cancel: &CancellationToken) -> SearchOutcome {
        self.search_with_progress(spec, cancel, |_| {})
    }

    /// Walks `spec.directory()` and collects matches per target.
    ///
    /// Blocks on file system I/O; run it on a worker thread. Unreadable
    /// entries are logged and skipped. Cancellation is not an error: the
    /// outcome is marked `cancelled` and keeps the matches found so far.
    pub fn search_with_progress<F>(
        &self,
        spec: &SearchSpec,
        cancel: &CancellationToken,
        progress_callback: F,
    ) -> SearchOutcome
    where
        F: Fn(SearchProgress),
    {
        let mut outcome = SearchOutcome {
            groups: MatchGroups::with_targets(spec.targets()),
            ..SearchOutcome::default()
        };

        tracing::info!(
            "Searching {} for {} target(s)",
            spec.directory().display(),
            spec.targets().len()
        );

        let mut walker = WalkDir::new(spec.directory())
            .follow_links(spec.follow_links())
            .sort_by_file_name()
            .into_iter();

        'walk: loop {
            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    outcome.entries_skipped += 1;
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if cancel.is_cancelled() {
                    outcome.cancelled = true;
                    break;
                }
                if entry.depth() > 0 && spec.is_excluded(entry.path()) {
                    tracing::debug!("Excluded directory {}", entry.path().display());
                    walker.skip_current_dir();
                }
                continue;
            }

            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            if !is_file(&entry) || spec.is_excluded(entry.path()) {
                continue;
            }
            outcome.files_visited += 1;

            let path = entry.path();
            if spec.extensions().accepts(path) {
                let file_name = entry.file_name().to_string_lossy();
                // Read at most once per file, and only if a name check fails.
                let mut content: Option<Option<String>> = None;
                for (index, target) in spec.targets().iter().enumerate() {
                    if cancel.is_cancelled() {
                        outcome.cancelled = true;
                        break 'walk;
                    }
                    if self.target_matches(spec, path, &file_name, target, &mut content) {
                        tracing::debug!("Match for '{}': {}", target, path.display());
                        outcome.groups.push(index, path.to_path_buf());
                    }
                }
            }

            if outcome.files_visited % self.progress_interval == 0 {
                progress_callback(SearchProgress {
                    files_visited: outcome.files_visited,
                    matches_found: outcome.groups.total_matches(),
                    current_path: path.display().to_string(),
                });
            }
        }

        if outcome.cancelled {
            tracing::info!(
                "Search cancelled after {} files, {} match(es) kept",
                outcome.files_visited,
                outcome.groups.total_matches()
            );
        } else {
            tracing::info!(
                "Search finished: {} files visited, {} match(es), {} entries skipped",
                outcome.files_visited,
                outcome.groups.total_matches(),
                outcome.entries_skipped
            );
        }

        outcome
    }

    fn target_matches(
        &self,
        spec: &SearchSpec,
        path: &Path,
        file_name: &str,
        target: &str,
        content: &mut Option<Option<String>>,
    ) -> bool {
        let options = spec.options();
        if options.exact_match {
            return matcher::is_exact_match(
                file_name,
                target,
                spec.extensions(),
                options.case_sensitive,
            );
        }

        matcher::is_partial_match(
            file_name,
            target,
            options.case_sensitive,
            options.partial_mode,
            options.fuzzy_threshold,
        ) || (options.search_content
            && content
                .get_or_insert_with(|| self.content_scanner.read_text(path))
                .as_deref()
                .is_some_and(|text| text.contains(target)))
    }
}

fn is_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchOptions, PartialMode};
    use crate::utils::test_helpers::{file_tree, setup_test_logging};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn spec(dir: &Path, targets: &[&str], extensions: &[&str], options: MatchOptions) -> SearchSpec {
        SearchSpec::new(dir, targets, extensions.iter().collect(), options).unwrap()
    }

    #[test]
    fn test_case_insensitive_partial_search() {
        setup_test_logging();
        let dir = file_tree(&[("a.txt", ""), ("A.TXT", ""), ("b.log", "")]);
        let spec = spec(dir.path(), &["a"], &[], MatchOptions::default());

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());

        let mut found = names(outcome.groups.get("a").unwrap());
        found.sort();
        assert_eq!(found, vec!["A.TXT", "a.txt"]);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.files_visited, 3);
    }

    #[test]
    fn test_results_are_absolute_and_recursive() {
        let dir = file_tree(&[("deep/nested/report.pdf", ""), ("report.pdf", "")]);
        let options = MatchOptions {
            exact_match: true,
            ..MatchOptions::default()
        };
        let spec = spec(dir.path(), &["report"], &[".pdf"], options);

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        let paths = outcome.groups.get("report").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.is_absolute()));
        assert!(paths.iter().any(|p| p.ends_with("deep/nested/report.pdf")));
    }

    #[test]
    fn test_extension_filter_skips_files() {
        let dir = file_tree(&[("notes.txt", ""), ("notes.md", ""), ("notes", "")]);
        let spec = spec(dir.path(), &["notes"], &["md"], MatchOptions::default());

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        assert_eq!(names(outcome.groups.get("notes").unwrap()), vec!["notes.md"]);
    }

    #[test]
    fn test_one_file_can_match_several_targets() {
        let dir = file_tree(&[("annual_report.txt", "")]);
        let spec = spec(dir.path(), &["annual", "report", "budget"], &[], MatchOptions::default());

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        assert_eq!(outcome.groups.get("annual").unwrap().len(), 1);
        assert_eq!(outcome.groups.get("report").unwrap().len(), 1);
        assert!(outcome.groups.get("budget").unwrap().is_empty());
    }

    #[test]
    fn test_content_search_supplements_name_matching() {
        let dir = file_tree(&[
            ("invoice_march.txt", "nothing here"),
            ("summary.txt", "see invoice 42"),
            ("other.txt", "unrelated"),
        ]);
        let options = MatchOptions {
            search_content: true,
            ..MatchOptions::default()
        };
        let spec = spec(dir.path(), &["invoice"], &[], options);

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        assert_eq!(
            names(outcome.groups.get("invoice").unwrap()),
            vec!["invoice_march.txt", "summary.txt"]
        );
    }

    #[traced_test]
    #[test]
    fn test_content_is_read_once_per_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        let options = MatchOptions {
            search_content: true,
            ..MatchOptions::default()
        };
        let spec = spec(dir.path(), &["alpha", "beta", "gamma"], &[], options);

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        assert!(outcome.groups.is_empty());
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("Skipping content search"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("file was read {} times", n)),
            }
        });
    }

    #[test]
    fn test_exact_mode_ignores_content() {
        let dir = file_tree(&[("summary.txt", "invoice")]);
        let options = MatchOptions {
            exact_match: true,
            search_content: true,
            ..MatchOptions::default()
        };
        let spec = spec(dir.path(), &["invoice"], &[], options);

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        assert!(outcome.groups.is_empty());
    }

    #[test]
    fn test_fuzzy_mode_is_opt_in() {
        let dir = file_tree(&[("quarterly.txt", "")]);
        let substring = spec(dir.path(), &["quartrly"], &[], MatchOptions::default());
        let fuzzy = spec(
            dir.path(),
            &["quartrly"],
            &[],
            MatchOptions {
                partial_mode: PartialMode::SubstringOrFuzzy,
                ..MatchOptions::default()
            },
        );

        let searcher = FileSearcher::new();
        let token = CancellationToken::new();
        assert!(searcher.search(&substring, &token).groups.is_empty());
        assert_eq!(searcher.search(&fuzzy, &token).groups.total_matches(), 1);
    }

    #[test]
    fn test_excluded_directories_are_pruned() {
        let dir = file_tree(&[("keep/log.txt", ""), ("node_modules/log.txt", "")]);
        let spec = spec(dir.path(), &["log"], &[], MatchOptions::default())
            .with_exclude_patterns(&["node_modules/"])
            .unwrap();

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        let paths = outcome.groups.get("log").unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("keep/log.txt"));
    }

    #[test]
    fn test_exclude_patterns_ignore_directories_above_root() {
        let dir = file_tree(&[
            ("build/proj/a.txt", ""),
            ("build/proj/src/a.rs", ""),
            ("build/proj/build/a.o", ""),
        ]);
        let root = dir.path().join("build").join("proj");
        let spec = spec(&root, &["a"], &[], MatchOptions::default())
            .with_exclude_patterns(&["build/"])
            .unwrap();

        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());
        assert_eq!(outcome.files_visited, 2);
        assert_eq!(names(outcome.groups.get("a").unwrap()), vec!["a.txt", "a.rs"]);
    }

    #[test]
    fn test_cancelled_before_start_returns_empty() {
        let dir = file_tree(&[("a.txt", "")]);
        let spec = spec(dir.path(), &["a"], &[], MatchOptions::default());
        let token = CancellationToken::new();
        token.cancel();

        let outcome = FileSearcher::new().search(&spec, &token);
        assert!(outcome.cancelled);
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.files_visited, 0);
    }

    #[test]
    fn test_cancellation_keeps_committed_prefix() {
        let files: Vec<(String, &str)> = (0..200)
            .map(|i| (format!("match_{:03}.txt", i), ""))
            .collect();
        let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), *c)).collect();
        let dir = file_tree(&borrowed);
        let spec = spec(dir.path(), &["match"], &[], MatchOptions::default());

        let token = CancellationToken::new();
        let stopper = token.clone();
        let outcome = FileSearcher::new()
            .with_progress_interval(1)
            .search_with_progress(&spec, &token, move |progress| {
                if progress.files_visited == 50 {
                    stopper.cancel();
                }
            });

        assert!(outcome.cancelled);
        let paths = outcome.groups.get("match").unwrap();
        assert_eq!(paths.len(), 50);
        let expected: Vec<String> = (0..50).map(|i| format!("match_{:03}.txt", i)).collect();
        assert_eq!(names(paths), expected);
    }

    #[test]
    fn test_token_is_set_once_and_resettable() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.cancel());
        assert!(!token.clone().cancel());
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_progress_is_reported() {
        let dir = file_tree(&[("a1", ""), ("a2", ""), ("a3", ""), ("a4", "")]);
        let spec = spec(dir.path(), &["a"], &[], MatchOptions::default());
        let reports = std::sync::Mutex::new(Vec::new());

        FileSearcher::new()
            .with_progress_interval(2)
            .search_with_progress(&spec, &CancellationToken::new(), |p| {
                reports.lock().unwrap().push(p.files_visited)
            });

        assert_eq!(reports.into_inner().unwrap(), vec![2, 4]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_abort() {
        use crate::utils::test_helpers::running_as_root;
        use std::os::unix::fs::PermissionsExt;

        if running_as_root() {
            return;
        }

        let dir = file_tree(&[("locked/a.txt", ""), ("open/a.txt", "")]);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let spec = spec(dir.path(), &["a"], &[], MatchOptions::default());
        let outcome = FileSearcher::new().search(&spec, &CancellationToken::new());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(outcome.groups.total_matches(), 1);
        assert!(outcome.entries_skipped >= 1);
    }
}
