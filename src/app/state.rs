//! Defines the central, mutable state of the control surface.

use super::history::SearchHistory;
use super::view_model::ResultView;
use crate::config::AppConfig;
use crate::core::{CancellationToken, MatchGroups, Selection};
use tokio::task::JoinHandle;

/// Holds the complete, mutable state of the control surface.
///
/// Wrapped in an `Arc<Mutex<...>>` and shared between the front end and the
/// task that waits for the search worker. The worker itself only sees an
/// immutable `SearchSpec` and the cancellation token.
pub struct AppState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// Recent target texts.
    pub history: SearchHistory,
    /// `true` while a search worker is running. Starting another search is refused.
    pub is_searching: bool,
    /// Advisory status line ("Found 3 file(s)", "Stopping search...").
    pub status_message: String,
    /// Files the last search walked past, including a cancelled one.
    pub files_visited: usize,
    /// Shared with the worker; reset at the start of every search.
    pub cancel_token: CancellationToken,
    /// A handle to the task that drives the current search.
    pub search_task: Option<JoinHandle<()>>,
    /// The selection (policy, sort, filters) of the last search.
    pub selection: Selection,
    /// Match groups of the last completed or cancelled search.
    pub last_groups: Option<MatchGroups>,
    /// The rendered result of the last search.
    pub last_result: Option<ResultView>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            history: SearchHistory::new(config.history_limit),
            selection: Selection {
                policy: config.selection_policy,
                sort_key: config.sort_key,
                ..Selection::default()
            },
            config,
            is_searching: false,
            status_message: String::from("Ready"),
            files_visited: 0,
            cancel_token: CancellationToken::new(),
            search_task: None,
            last_groups: None,
            last_result: None,
        }
    }

    /// Requests the running search (if any) to stop. Returns `true` if a
    /// running search was signalled.
    pub fn cancel_current_search(&mut self) -> bool {
        if !self.is_searching {
            return false;
        }
        self.cancel_token.cancel();
        self.status_message = String::from("Stopping search...");
        true
    }
}

impl Default for AppState {
    /// Creates a default `AppState` instance, loading the configuration from disk.
    fn default() -> Self {
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        });
        Self::new(config)
    }
}
