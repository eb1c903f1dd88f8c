use super::error::CoreError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Builds a `GlobSet` from `.gitignore`-style exclude patterns.
///
/// Blank lines and `#` comments are skipped. A trailing `/` marks a
/// directory pattern, which excludes the directory and everything below it.
/// Unlike ignore files, a broken pattern is reported instead of dropped,
/// because the user typed it for this search.
pub fn build_exclude_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, CoreError> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let trimmed = pattern.as_ref().trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(dir_pattern) = trimmed.strip_suffix('/') {
            builder.add(Glob::new(&format!("**/{}", dir_pattern))?);
            builder.add(Glob::new(&format!("**/{}/**", dir_pattern))?);
        } else {
            builder.add(Glob::new(&format!("**/{}", trimmed))?);
        }
    }

    Ok(builder.build()?)
}
