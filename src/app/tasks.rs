//! Starts, stops and re-renders searches on behalf of the front end.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::helpers::{lock_state, with_state_and_notify};
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::{build_result_view, generate_ui_state, ResultView};

use crate::core::{
    CancellationToken, ContentScanner, CoreError, DateRange, ExtensionSet, FileSearcher,
    MatchGroups, MatchOptions, SearchSpec, Selection, SelectionPolicy, SizeRange, SortKey,
};
use crate::utils::format::parse_targets;

/// Everything the user entered for one search, still unvalidated.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub directory: PathBuf,
    /// Raw multi-line target input, one name per line.
    pub targets_text: String,
    pub extensions: ExtensionSet,
    pub options: MatchOptions,
    pub policy: SelectionPolicy,
    pub sort_key: SortKey,
    pub size_range: SizeRange,
    /// `YYYY-MM-DD - YYYY-MM-DD`, or blank for no date filter.
    pub date_range: String,
}

/// A validated request, ready to hand to the worker.
struct PreparedSearch {
    spec: SearchSpec,
    selection: Selection,
    duplicates_removed: usize,
}

fn prepare(request: &SearchRequest, state: &AppState) -> Result<PreparedSearch, CoreError> {
    let parsed = parse_targets(&request.targets_text);
    let date_range = DateRange::parse_optional(&request.date_range)?;

    let spec = SearchSpec::new(
        &request.directory,
        &parsed.targets,
        request.extensions.clone(),
        request.options,
    )?
    .with_exclude_patterns(state.config.exclude_patterns.as_slice())?
    .with_follow_links(state.config.follow_links);

    Ok(PreparedSearch {
        spec,
        selection: Selection {
            policy: request.policy,
            sort_key: request.sort_key,
            size_range: Some(request.size_range).filter(|range| !range.is_unset()),
            date_range,
        },
        duplicates_removed: parsed.duplicates_removed,
    })
}

/// Validates the request and starts a search on a blocking worker.
///
/// Returns immediately. Validation errors and a search that is already
/// running are reported both as the return value and as a `ShowError`
/// event; in that case no state beyond the status line changes.
pub fn start_search<P: EventProxy>(
    request: SearchRequest,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> Result<(), CoreError> {
    let mut state_guard = lock_state(&state);

    if state_guard.is_searching {
        proxy.send_event(UserEvent::ShowError(CoreError::SearchInProgress.to_string()));
        return Err(CoreError::SearchInProgress);
    }

    let prepared = match prepare(&request, &state_guard) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!("Rejected search request: {}", e);
            state_guard.status_message = e.to_string();
            proxy.send_event(UserEvent::ShowError(e.to_string()));
            proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(&state_guard))));
            return Err(e);
        }
    };

    state_guard.history.add(request.targets_text.trim());
    state_guard.cancel_token.reset();
    state_guard.is_searching = true;
    state_guard.files_visited = 0;
    state_guard.last_groups = None;
    state_guard.last_result = None;
    state_guard.selection = prepared.selection;
    state_guard.status_message = if prepared.duplicates_removed > 0 {
        format!(
            "Removed {} duplicate lines. Searching...",
            prepared.duplicates_removed
        )
    } else {
        String::from("Searching...")
    };

    let searcher = FileSearcher::new()
        .with_content_scanner(ContentScanner::new(state_guard.config.max_content_file_size()))
        .with_progress_interval(state_guard.config.progress_interval);
    let token = state_guard.cancel_token.clone();

    tracing::info!(
        "Starting search in {} for {:?}",
        prepared.spec.directory().display(),
        prepared.spec.targets()
    );
    let handle = tokio::spawn(search_task(
        proxy.clone(),
        state.clone(),
        searcher,
        prepared.spec,
        prepared.selection,
        token,
    ));
    state_guard.search_task = Some(handle);

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(&state_guard))));
    Ok(())
}

/// Waits for the worker and publishes its result.
///
/// Every exit path clears `is_searching`, so the front end can always
/// start the next search.
async fn search_task<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
    searcher: FileSearcher,
    spec: SearchSpec,
    selection: Selection,
    token: CancellationToken,
) {
    let progress_proxy = proxy.clone();
    let worker = tokio::task::spawn_blocking(move || {
        let outcome = searcher.search_with_progress(&spec, &token, |progress| {
            progress_proxy.send_event(UserEvent::SearchProgress(progress));
        });
        let view = build_result_view(&outcome.groups, &selection, outcome.cancelled);
        (outcome, view)
    });

    let result = worker.await;

    let mut state_guard = lock_state(&state);
    state_guard.is_searching = false;
    state_guard.search_task = None;

    match result {
        Ok((outcome, view)) => {
            state_guard.status_message = view.status_message();
            state_guard.files_visited = outcome.files_visited;
            state_guard.last_groups = Some(outcome.groups);
            state_guard.last_result = Some(view.clone());
            proxy.send_event(UserEvent::SearchFinished(Box::new(view)));
        }
        Err(e) => {
            let error = CoreError::from(e);
            tracing::error!("Search worker failed: {}", error);
            state_guard.status_message = format!("Search error: {}", error);
            proxy.send_event(UserEvent::ShowError(state_guard.status_message.clone()));
        }
    }

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(&state_guard))));
}

/// Asks the running search to stop. The worker returns its partial result.
pub fn stop_search<P: EventProxy>(proxy: &P, state: &Arc<Mutex<AppState>>) {
    with_state_and_notify(state, proxy, |s| {
        if s.cancel_current_search() {
            tracing::info!("Search cancellation requested");
        }
    });
}

/// Re-applies a different selection to the last search's groups without
/// walking the tree again.
pub async fn reselect<P: EventProxy>(
    selection: Selection,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> Option<ResultView> {
    let (groups, cancelled): (MatchGroups, bool) = {
        let state_guard = lock_state(&state);
        if state_guard.is_searching {
            return None;
        }
        let groups = state_guard.last_groups.clone()?;
        let cancelled = state_guard
            .last_result
            .as_ref()
            .is_some_and(|view| view.cancelled);
        (groups, cancelled)
    };

    let view = match tokio::task::spawn_blocking(move || {
        build_result_view(&groups, &selection, cancelled)
    })
    .await
    {
        Ok(view) => view,
        Err(e) => {
            tracing::error!("Failed to rebuild results: {}", e);
            proxy.send_event(UserEvent::ShowError(format!("Search error: {}", e)));
            return None;
        }
    };

    with_state_and_notify(&state, &proxy, |s| {
        s.selection = selection;
        s.status_message = view.status_message();
        s.last_result = Some(view.clone());
    });
    proxy.send_event(UserEvent::SearchFinished(Box::new(view.clone())));
    Some(view)
}
