// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository layout naming rules.
//!
//! The repository keeps no metadata of its own. Everything is derived from
//! entry names, so every name that gets written or parsed goes through here.
//!
//! # Layout
//!
//! ```text
//! <repo_path>/
//!   YYYY-MM-DD/
//!     prev -> <repo_path>/<earlier YYYY-MM-DD>
//!   .git/
//! <working_path> -> <repo_path>/<today's YYYY-MM-DD>
//! <working_path>-<YYYY-MM-DDTHH_MM_SS>
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Format of day directory names.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Format of the timestamp suffix given to backups.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H_%M_%S";

/// Name of the marker linking a day directory back to its predecessor.
pub const PREV_LINK: &str = "prev";

/// Name of the day directory for `date`.
pub fn day_name(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Parse an entry name as a day directory name.
///
/// Only names that format back to themselves are accepted, so `2024-1-5`
/// is rejected along with plain garbage like `notes.txt` or `2024-13-40`.
pub fn parse_day(name: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(name, DAY_FORMAT).ok()?;
    (day_name(date) == name).then_some(date)
}

/// Sibling path used to stash whatever occupied `path` at time `now`.
///
/// Returns `None` if `path` has no final component to suffix.
pub fn backup_path(path: &Path, now: NaiveDateTime) -> Option<PathBuf> {
    let name = path.file_name()?;
    let mut backup = name.to_os_string();
    backup.push("-");
    backup.push(now.format(BACKUP_TIMESTAMP_FORMAT).to_string());

    Some(path.with_file_name(backup))
}

/// Check if a path names the previous-day marker.
pub fn is_prev_link(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == PREV_LINK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("2024-06-15", Some((2024, 6, 15)); "regular day")]
    #[test_case("2024-02-29", Some((2024, 2, 29)); "leap day")]
    #[test_case("2023-02-29", None; "not a leap year")]
    #[test_case("2024-13-40", None; "invalid month and day")]
    #[test_case("2024-1-5", None; "missing zero padding")]
    #[test_case("notes.txt", None; "plain file name")]
    #[test_case("2024-06-15.bak", None; "trailing garbage")]
    #[test_case(".git", None; "vcs metadata")]
    #[test_case("", None; "empty name")]
    #[test]
    fn parse_day_names(name: &str, expect: Option<(i32, u32, u32)>) {
        let expect = expect.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_day(name), expect);
    }

    #[test]
    fn day_name_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(987, 1, 5).unwrap();
        assert_eq!(day_name(date), "0987-01-05");
    }

    #[test]
    fn backup_path_is_timestamped_sibling() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();

        let result = backup_path(Path::new("/home/blah/scratch"), now);
        assert_eq!(
            result,
            Some(PathBuf::from("/home/blah/scratch-2024-06-15T09_05_03"))
        );

        assert_eq!(backup_path(Path::new("/"), now), None);
    }

    #[test]
    fn prev_link_matches_final_component() {
        assert!(is_prev_link(Path::new("2024-06-15/prev")));
        assert!(is_prev_link(Path::new("prev")));
        assert!(!is_prev_link(Path::new("prev/notes.txt")));
        assert!(!is_prev_link(Path::new("2024-06-15/previous")));
    }
}
