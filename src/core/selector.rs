//! Reduces per-target match groups to the ordered list that gets displayed.

use super::error::CoreError;
use super::record::FileRecord;
use super::MatchGroups;
use chrono::{DateTime, Local, NaiveDate};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::SystemTime;

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})\s+-\s+(\d{4}-\d{2}-\d{2})\s*$")
        .expect("date range pattern is valid")
});

/// Which files of each target group survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Every match, grouped by target.
    #[default]
    All,
    Newest,
    Oldest,
    Largest,
    Smallest,
}

impl SelectionPolicy {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Newest,
        Self::Oldest,
        Self::Largest,
        Self::Smallest,
    ];
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::All => "All",
            Self::Newest => "Newest",
            Self::Oldest => "Oldest",
            Self::Largest => "Largest",
            Self::Smallest => "Smallest",
        };
        f.write_str(label)
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown search type '{}'", s))
    }
}

/// Final ordering of a reduced selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    None,
    Size,
    Date,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "size" => Ok(Self::Size),
            "date" => Ok(Self::Date),
            _ => Err(format!("unknown sort key '{}'", s)),
        }
    }
}

/// Inclusive size bounds in KiB. A zero bound is unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min_kib: u64,
    pub max_kib: u64,
}

impl SizeRange {
    pub fn new(min_kib: u64, max_kib: u64) -> Self {
        Self { min_kib, max_kib }
    }

    pub fn is_unset(&self) -> bool {
        self.min_kib == 0 && self.max_kib == 0
    }

    pub fn contains(&self, size_bytes: u64) -> bool {
        let above_min = self.min_kib == 0 || size_bytes >= self.min_kib.saturating_mul(1024);
        let below_max = self.max_kib == 0 || size_bytes <= self.max_kib.saturating_mul(1024);
        above_min && below_max
    }
}

/// Inclusive calendar date range, compared in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parses optional range text; blank text means "no date filter".
    pub fn parse_optional(text: &str) -> Result<Option<Self>, CoreError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        text.parse().map(Some)
    }

    pub fn contains(&self, time: SystemTime) -> bool {
        let date = DateTime::<Local>::from(time).date_naive();
        self.start <= date && date <= self.end
    }
}

impl FromStr for DateRange {
    type Err = CoreError;

    /// Accepts `YYYY-MM-DD - YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDateRange(s.to_string());
        let caps = DATE_RANGE_RE.captures(s).ok_or_else(invalid)?;

        let start = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").map_err(|_| invalid())?;
        let end = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d").map_err(|_| invalid())?;
        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

/// Everything the selector needs besides the groups themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub policy: SelectionPolicy,
    pub sort_key: SortKey,
    pub size_range: Option<SizeRange>,
    pub date_range: Option<DateRange>,
}

/// Reduces `groups` to the ordered paths to display.
///
/// `All` keeps every path in target-then-discovery order and ignores
/// filters and sorting. The other policies keep at most one file per
/// target, then apply the size and date filters, then the sort key.
pub fn select(groups: &MatchGroups, selection: &Selection) -> Vec<PathBuf> {
    match selection.policy {
        SelectionPolicy::All => groups.flatten(),
        _ => select_records(groups, selection)
            .into_iter()
            .map(|record| record.full_path)
            .collect(),
    }
}

/// Like [`select`] for the reducing policies, but keeps the looked-up metadata.
///
/// For `All` every still existing file is returned unfiltered.
pub fn select_records(groups: &MatchGroups, selection: &Selection) -> Vec<FileRecord> {
    if selection.policy == SelectionPolicy::All {
        let paths = groups.flatten();
        return lookup_all(&paths);
    }

    let mut records: Vec<FileRecord> = groups
        .iter()
        .filter_map(|group| reduce_group(&group.paths, selection.policy))
        .collect();

    if let Some(range) = selection.size_range.filter(|r| !r.is_unset()) {
        records.retain(|record| range.contains(record.size_bytes));
    }
    if let Some(range) = selection.date_range {
        records.retain(|record| range.contains(record.modified));
    }

    match selection.sort_key {
        SortKey::None => {}
        SortKey::Size => records.sort_by_key(|record| record.size_bytes),
        SortKey::Date => records.sort_by_key(|record| record.modified),
    }

    records
}

/// Stats paths in parallel, dropping (and logging) the ones that vanished.
/// Output order follows input order.
pub fn lookup_all(paths: &[PathBuf]) -> Vec<FileRecord> {
    paths
        .par_iter()
        .filter_map(|path| FileRecord::lookup(path))
        .collect()
}

/// Picks the single file a policy keeps from one group; ties go to the
/// earlier discovery.
fn reduce_group(paths: &[PathBuf], policy: SelectionPolicy) -> Option<FileRecord> {
    let candidates = lookup_all(paths);
    let mut iter = candidates.into_iter();
    let first = iter.next()?;

    let wins = |challenger: &FileRecord, best: &FileRecord| match policy {
        SelectionPolicy::Newest => challenger.modified > best.modified,
        SelectionPolicy::Oldest => challenger.modified < best.modified,
        SelectionPolicy::Largest => challenger.size_bytes > best.size_bytes,
        SelectionPolicy::Smallest => challenger.size_bytes < best.size_bytes,
        SelectionPolicy::All => false,
    };

    Some(iter.fold(first, |best, challenger| {
        if wins(&challenger, &best) {
            challenger
        } else {
            best
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::write_aged_file;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn fixture() -> (TempDir, MatchGroups) {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let targets = vec!["x".to_string(), "y".to_string(), "empty".to_string()];
        let mut groups = MatchGroups::with_targets(&targets);
        groups.push(0, write_aged_file(root, "x_mid.txt", 2048, 20));
        groups.push(0, write_aged_file(root, "x_old.txt", 512, 30));
        groups.push(0, write_aged_file(root, "x_new.txt", 4096, 10));
        groups.push(1, write_aged_file(root, "y_only.txt", 100, 5));
        (dir, groups)
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn with_policy(policy: SelectionPolicy) -> Selection {
        Selection {
            policy,
            ..Selection::default()
        }
    }

    #[test]
    fn test_all_flattens_in_target_order() {
        let (_dir, groups) = fixture();
        let selected = select(&groups, &with_policy(SelectionPolicy::All));
        assert_eq!(
            names(&selected),
            vec!["x_mid.txt", "x_old.txt", "x_new.txt", "y_only.txt"]
        );
    }

    #[test]
    fn test_newest_and_oldest_pick_one_per_target() {
        let (_dir, groups) = fixture();
        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Newest))),
            vec!["x_new.txt", "y_only.txt"]
        );
        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Oldest))),
            vec!["x_old.txt", "y_only.txt"]
        );
    }

    #[test]
    fn test_largest_and_smallest() {
        let (_dir, groups) = fixture();
        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Largest))),
            vec!["x_new.txt", "y_only.txt"]
        );
        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Smallest))),
            vec!["x_old.txt", "y_only.txt"]
        );
    }

    #[test]
    fn test_ties_keep_first_discovered() {
        let dir = tempdir().unwrap();
        let targets = vec!["t".to_string()];
        let mut groups = MatchGroups::with_targets(&targets);
        groups.push(0, write_aged_file(dir.path(), "first.txt", 10, 3));
        groups.push(0, write_aged_file(dir.path(), "second.txt", 10, 3));

        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Largest))),
            vec!["first.txt"]
        );
        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Smallest))),
            vec!["first.txt"]
        );
    }

    #[test]
    fn test_sort_by_size_and_date() {
        let (_dir, groups) = fixture();
        let mut selection = with_policy(SelectionPolicy::Newest);

        selection.sort_key = SortKey::Size;
        assert_eq!(
            names(&select(&groups, &selection)),
            vec!["y_only.txt", "x_new.txt"]
        );

        selection.sort_key = SortKey::Date;
        assert_eq!(
            names(&select(&groups, &selection)),
            vec!["x_new.txt", "y_only.txt"]
        );
    }

    #[test]
    fn test_size_range_filter_is_inclusive() {
        let (_dir, groups) = fixture();
        let mut selection = with_policy(SelectionPolicy::Largest);

        selection.size_range = Some(SizeRange::new(4, 4));
        assert_eq!(names(&select(&groups, &selection)), vec!["x_new.txt"]);

        selection.size_range = Some(SizeRange::new(0, 1));
        assert_eq!(names(&select(&groups, &selection)), vec!["y_only.txt"]);

        selection.size_range = Some(SizeRange::default());
        assert_eq!(select(&groups, &selection).len(), 2);
    }

    #[test]
    fn test_date_range_filter() {
        let (_dir, groups) = fixture();
        let today = Local::now().date_naive();
        let mut selection = with_policy(SelectionPolicy::Oldest);
        selection.date_range = Some(DateRange {
            start: today - chrono::Days::new(7),
            end: today,
        });
        assert_eq!(names(&select(&groups, &selection)), vec!["y_only.txt"]);
    }

    #[test]
    fn test_filters_do_not_apply_to_all() {
        let (_dir, groups) = fixture();
        let selection = Selection {
            policy: SelectionPolicy::All,
            sort_key: SortKey::Size,
            size_range: Some(SizeRange::new(1000, 0)),
            date_range: None,
        };
        assert_eq!(select(&groups, &selection).len(), 4);
    }

    #[test]
    fn test_select_is_idempotent() {
        let (_dir, groups) = fixture();
        for policy in SelectionPolicy::ALL {
            let selection = Selection {
                policy,
                sort_key: SortKey::Date,
                ..Selection::default()
            };
            assert_eq!(select(&groups, &selection), select(&groups, &selection));
        }
    }

    #[test]
    fn test_vanished_files_are_excluded() {
        let (_dir, groups) = fixture();
        let newest = groups.get("x").unwrap()[2].clone();
        fs::remove_file(&newest).unwrap();

        assert_eq!(
            names(&select(&groups, &with_policy(SelectionPolicy::Newest))),
            vec!["x_mid.txt", "y_only.txt"]
        );
    }

    #[test]
    fn test_date_range_parsing() {
        let range: DateRange = "2024-01-01 - 2024-12-31".parse().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        assert_eq!(DateRange::parse_optional("   ").unwrap(), None);
        for bad in ["2024-01-01", "2024-01-01-2024-02-01", "2024-13-01 - 2024-12-01", "2024-05-01 - 2024-01-01"] {
            assert!(matches!(
                bad.parse::<DateRange>(),
                Err(CoreError::InvalidDateRange(_))
            ));
        }
    }

    #[test]
    fn test_policy_and_sort_key_parsing() {
        assert_eq!("newest".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Newest));
        assert_eq!("Smallest".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Smallest));
        assert!("biggest".parse::<SelectionPolicy>().is_err());
        assert_eq!("DATE".parse::<SortKey>(), Ok(SortKey::Date));
        assert!("name".parse::<SortKey>().is_err());
    }
}
