//! Decides whether one candidate file name satisfies one target name.

use super::extensions::ExtensionSet;
use serde::{Deserialize, Serialize};
use similar::TextDiff;
use std::borrow::Cow;
use std::path::Path;

/// Default similarity a stem must exceed in [`PartialMode::SubstringOrFuzzy`].
pub const DEFAULT_FUZZY_THRESHOLD: f32 = 0.8;

/// How non-exact matching treats a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialMode {
    /// The target must be contained in the file stem.
    #[default]
    Substring,
    /// Containment, or a stem/target similarity ratio above the threshold.
    SubstringOrFuzzy,
}

/// The flags that steer name (and content) matching for a whole search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub exact_match: bool,
    pub case_sensitive: bool,
    pub search_content: bool,
    pub partial_mode: PartialMode,
    pub fuzzy_threshold: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact_match: false,
            case_sensitive: false,
            search_content: false,
            partial_mode: PartialMode::Substring,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Name-only match of `file_name` against `target` under `options`.
///
/// Content search is not consulted here; the walker ORs it in separately.
pub fn is_match(
    file_name: &str,
    target: &str,
    extensions: &ExtensionSet,
    options: &MatchOptions,
) -> bool {
    if options.exact_match {
        is_exact_match(file_name, target, extensions, options.case_sensitive)
    } else {
        is_partial_match(
            file_name,
            target,
            options.case_sensitive,
            options.partial_mode,
            options.fuzzy_threshold,
        )
    }
}

/// Exact stem or exact full name, tolerant of a missing extension on the target.
///
/// Matches when the names are equal, when the target plus the candidate's
/// own extension equals the name, or when the target plus any extension of
/// `extensions` equals the name. A target that already carries the suffix
/// is never suffixed a second time.
pub fn is_exact_match(
    file_name: &str,
    target: &str,
    extensions: &ExtensionSet,
    case_sensitive: bool,
) -> bool {
    let name = normalize(file_name, case_sensitive);
    let target = normalize(target, case_sensitive);

    if name == target {
        return true;
    }

    let own_extension = extension_of(&name);
    if !own_extension.is_empty()
        && !ends_with_ignore_case(&target, own_extension)
        && name.len() == target.len() + own_extension.len()
        && name.starts_with(&*target)
        && name.ends_with(own_extension)
    {
        return true;
    }

    if extensions.is_suffix_of(&target) {
        return false;
    }
    extensions
        .iter()
        .any(|ext| name.strip_suffix(ext) == Some(&*target))
}

/// Substring containment of the target in the file stem, optionally
/// falling back to a similarity ratio.
pub fn is_partial_match(
    file_name: &str,
    target: &str,
    case_sensitive: bool,
    mode: PartialMode,
    fuzzy_threshold: f32,
) -> bool {
    let stem = normalize(stem_of(file_name), case_sensitive);
    let target = normalize(target, case_sensitive);

    if stem.contains(&*target) {
        return true;
    }

    match mode {
        PartialMode::Substring => false,
        PartialMode::SubstringOrFuzzy => similarity(&stem, &target) > fuzzy_threshold,
    }
}

/// Character-level similarity in `0.0..=1.0` (`2 * matches / total length`).
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    TextDiff::from_chars(a, b).ratio()
}

/// File name without its final extension. Dotfiles keep their full name.
pub fn stem_of(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

/// The final extension including its dot, or `""` if there is none.
pub fn extension_of(file_name: &str) -> &str {
    let stem_len = stem_of(file_name).len();
    match file_name.get(stem_len..) {
        Some(rest) if rest.starts_with('.') && rest.len() > 1 => rest,
        _ => "",
    }
}

fn normalize(value: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.to_lowercase())
    }
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.to_lowercase().ends_with(&suffix.to_lowercase())
}
