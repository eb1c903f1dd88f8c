//! Turns search results and `AppState` into values the front end can render.

use crate::core::selector::{lookup_all, select_records};
use crate::core::{MatchGroups, ResultRow, Selection, SelectionPolicy};
use serde::Serialize;

use super::state::AppState;

/// A labelled block of result rows. `All` produces one section per target;
/// the reducing policies produce a single unlabelled section.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ResultSection {
    pub label: Option<String>,
    pub rows: Vec<ResultRow>,
}

/// Everything the results pane shows after a search.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ResultView {
    pub policy: SelectionPolicy,
    pub sections: Vec<ResultSection>,
    pub cancelled: bool,
}

impl ResultView {
    pub fn total_rows(&self) -> usize {
        self.sections.iter().map(|section| section.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &ResultRow> {
        self.sections.iter().flat_map(|section| section.rows.iter())
    }

    /// The status line for this result.
    pub fn status_message(&self) -> String {
        let summary = if self.is_empty() {
            String::from("No files found")
        } else {
            format!("Found {} file(s)", self.total_rows())
        };
        if self.cancelled {
            format!("Search cancelled. {}", summary)
        } else {
            summary
        }
    }
}

/// Applies the selection to the groups and looks up display metadata.
///
/// Stats every file it shows, so call it off the UI thread. Files that
/// vanished since the walk are left out.
pub fn build_result_view(groups: &MatchGroups, selection: &Selection, cancelled: bool) -> ResultView {
    let sections = match selection.policy {
        SelectionPolicy::All => groups
            .iter()
            .filter(|group| !group.paths.is_empty())
            .map(|group| ResultSection {
                label: Some(group.target.clone()),
                rows: lookup_all(&group.paths).iter().map(ResultRow::from).collect(),
            })
            .filter(|section| !section.rows.is_empty())
            .collect(),
        _ => {
            let rows: Vec<ResultRow> = select_records(groups, selection)
                .iter()
                .map(ResultRow::from)
                .collect();
            if rows.is_empty() {
                Vec::new()
            } else {
                vec![ResultSection { label: None, rows }]
            }
        }
    };

    ResultView {
        policy: selection.policy,
        sections,
        cancelled,
    }
}

/// A serializable snapshot of the control surface.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub is_searching: bool,
    pub can_start_search: bool,
    pub can_stop_search: bool,
    pub status_message: String,
    pub files_visited: usize,
    pub history: Vec<String>,
    pub result_count: usize,
}

/// Creates the complete `UiState` from the current `AppState`.
pub fn generate_ui_state(state: &AppState) -> UiState {
    UiState {
        is_searching: state.is_searching,
        can_start_search: !state.is_searching,
        can_stop_search: state.is_searching && !state.cancel_token.is_cancelled(),
        status_message: state.status_message.clone(),
        files_visited: state.files_visited,
        history: state.history.menu_labels(),
        result_count: state.last_result.as_ref().map_or(0, ResultView::total_rows),
    }
}
