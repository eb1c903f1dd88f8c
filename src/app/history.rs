//! In-memory list of recent search inputs.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
const MENU_LABEL_MAX_CHARS: usize = 50;

/// Recent target texts, most recent first, without duplicates.
///
/// Lives only as long as the application window; nothing is persisted.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SearchHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit: limit.max(1),
        }
    }

    /// Records `text` as the most recent entry.
    ///
    /// An identical entry moves to the front instead of being duplicated.
    /// Blank text is ignored.
    pub fn add(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if let Some(pos) = self.entries.iter().position(|entry| entry == text) {
            self.entries.remove(pos);
        }
        self.entries.push_front(text.to_string());
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Menu labels, shortened to 50 characters plus an ellipsis.
    pub fn menu_labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| {
                if entry.chars().count() > MENU_LABEL_MAX_CHARS {
                    let head: String = entry.chars().take(MENU_LABEL_MAX_CHARS).collect();
                    format!("{}...", head)
                } else {
                    entry.clone()
                }
            })
            .collect()
    }
}
