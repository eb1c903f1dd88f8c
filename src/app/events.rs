//! Defines the events sent from the search worker back to the control surface.

use super::view_model::{ResultView, UiState};
use crate::core::SearchProgress;

/// Events delivered to the front end.
///
/// The worker never touches presentation state directly; it only posts
/// these values and lets the receiver render them.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// A complete state update to re-render the controls.
    StateUpdate(Box<UiState>),
    /// A progress update while a search is walking the tree.
    SearchProgress(SearchProgress),
    /// The final (or cancelled) result of a search, ready for display.
    SearchFinished(Box<ResultView>),
    /// An error message to be displayed to the user.
    ShowError(String),
}
