//! Turns the user's extension check boxes into the set of suffixes the walker accepts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A named group of selectable extensions, as shown in the file type picker.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionCategory {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

/// The built-in extension catalogue.
pub const EXTENSION_CATEGORIES: &[ExtensionCategory] = &[
    ExtensionCategory {
        name: "Images",
        extensions: &["jpg", "png", "gif", "webp", "svg", "ico"],
    },
    ExtensionCategory {
        name: "Documents",
        extensions: &["pdf", "doc", "docx", "xls", "xlsx", "txt"],
    },
    ExtensionCategory {
        name: "Code",
        extensions: &["py", "java", "cpp", "js", "html", "css"],
    },
    ExtensionCategory {
        name: "Other",
        extensions: &["json", "xml", "md", "csv", "sql", "log"],
    },
];

/// A set of normalized extensions (lowercase, leading dot).
///
/// An empty set means "no extension filter": every file is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an extension, normalizing it first. Blank labels are ignored.
    pub fn insert(&mut self, label: &str) -> bool {
        match normalize_extension(label) {
            Some(ext) => self.0.insert(ext),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Membership test for an already normalized extension such as `.pdf`.
    pub fn contains(&self, extension: &str) -> bool {
        self.0.contains(extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if `name` ends with one of the extensions in the set.
    /// The comparison is ASCII case-insensitive.
    pub fn is_suffix_of(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.0.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Decides whether a file passes the extension filter.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.is_empty() {
            return true;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => self.0.contains(&format!(".{}", ext.to_lowercase())),
            None => false,
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label.as_ref());
        }
        set
    }
}

/// Lowercases an extension label and gives it exactly one leading dot.
pub fn normalize_extension(label: &str) -> Option<String> {
    let trimmed = label.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Builds the permitted extension set from the picker's selection state.
pub fn extensions_from_selection(selected: &BTreeMap<String, bool>) -> ExtensionSet {
    selected
        .iter()
        .filter(|(_, &is_selected)| is_selected)
        .map(|(label, _)| label.as_str())
        .collect()
}

/// Returns the full catalogue with every entry set to `value`.
/// Backs the "Select All" (`true`) and "Clear All" (`false`) buttons.
pub fn catalogue_selection(value: bool) -> BTreeMap<String, bool> {
    EXTENSION_CATEGORIES
        .iter()
        .flat_map(|category| category.extensions.iter())
        .map(|ext| (ext.to_string(), value))
        .collect()
}
