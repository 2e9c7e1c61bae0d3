// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Day directory index.
//!
//! Day directories are the top-level directories of the repository whose
//! names are dates. Anything else at the top-level is ignored.

use crate::layout::parse_day;

use chrono::NaiveDate;
use std::{
    fs::read_dir,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Day directory found in repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayDir {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// List all day directories at the top-level of `repo_path`.
///
/// Order is unspecified.
///
/// # Errors
///
/// - Return [`DayError::ReadDir`] if the repository cannot be scanned.
pub fn day_dirs(repo_path: &Path) -> Result<Vec<DayDir>> {
    let read_err = |err| DayError::ReadDir {
        source: err,
        path: repo_path.to_path_buf(),
    };

    let mut days = Vec::new();
    for entry in read_dir(repo_path).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let Some(date) = entry.file_name().to_str().and_then(parse_day) else {
            continue;
        };

        if !entry.file_type().map_err(read_err)?.is_dir() {
            debug!("{} is not a directory, skipping", entry.path().display());
            continue;
        }

        days.push(DayDir {
            date,
            path: entry.path(),
        });
    }

    Ok(days)
}

/// Find most recent day directory in `repo_path`.
///
/// # Errors
///
/// - Return [`DayError::ReadDir`] if the repository cannot be scanned.
#[instrument(level = "debug")]
pub fn latest_day(repo_path: &Path) -> Result<Option<PathBuf>> {
    Ok(day_dirs(repo_path)?
        .into_iter()
        .max_by_key(|day| day.date)
        .map(|day| day.path))
}

/// Find most recent day directory in `repo_path` dated strictly before
/// `date`.
///
/// A day directory never counts as its own predecessor, even when it
/// already exists.
///
/// # Errors
///
/// - Return [`DayError::ReadDir`] if the repository cannot be scanned.
#[instrument(level = "debug")]
pub fn latest_day_before(repo_path: &Path, date: NaiveDate) -> Result<Option<PathBuf>> {
    Ok(day_dirs(repo_path)?
        .into_iter()
        .filter(|day| day.date < date)
        .max_by_key(|day| day.date)
        .map(|day| day.path))
}

/// Day directory index error types.
#[derive(Debug, thiserror::Error)]
pub enum DayError {
    /// Repository cannot be scanned.
    #[error("failed to read repository directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = DayError> = std::result::Result<T, E>;
