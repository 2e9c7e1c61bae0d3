// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Empty directory pruning.
//!
//! Reclaim day directories that were created but never written to. A
//! directory holding nothing but its `prev` marker symlink still counts as
//! empty, since the marker is bookkeeping and not user content.

use crate::layout::PREV_LINK;

use std::{
    fs::{read_dir, remove_dir, remove_file},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Remove empty top-level directories of `repo_path`.
///
/// Directories listed in `protected` are never removed, nor is anything
/// that is not a real directory. Returns the removed directories.
///
/// # Errors
///
/// - Return [`PruneError::ReadDir`] if a directory cannot be scanned.
/// - Return [`PruneError::Remove`] if an empty directory or its marker
///   cannot be removed.
#[instrument(level = "debug")]
pub fn prune_empty_days(repo_path: &Path, protected: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in read_dir(repo_path).map_err(|err| read_err(err, repo_path))? {
        let entry = entry.map_err(|err| read_err(err, repo_path))?;
        let child = entry.path();

        if protected.contains(&child) {
            debug!("{} is protected, skipping", child.display());
            continue;
        }

        if !entry
            .file_type()
            .map_err(|err| read_err(err, repo_path))?
            .is_dir()
        {
            continue;
        }

        let Some(marker) = bookkeeping_only(&child)? else {
            continue;
        };

        info!("{} is empty, removing", child.display());
        if let Some(marker) = marker {
            remove_file(&marker).map_err(|err| PruneError::Remove {
                source: err,
                path: marker.clone(),
            })?;
        }
        remove_dir(&child).map_err(|err| PruneError::Remove {
            source: err,
            path: child.clone(),
        })?;

        removed.push(child);
    }

    Ok(removed)
}

/// Inspect `dir` for user content.
///
/// Returns `None` if there is user content. Otherwise returns the `prev`
/// marker symlink to clean up, if any.
fn bookkeeping_only(dir: &Path) -> Result<Option<Option<PathBuf>>> {
    let mut marker = None;
    for entry in read_dir(dir).map_err(|err| read_err(err, dir))? {
        let entry = entry.map_err(|err| read_err(err, dir))?;
        let is_link = entry
            .file_type()
            .map_err(|err| read_err(err, dir))?
            .is_symlink();

        // INVARIANT: Only a symlink named "prev" is bookkeeping.
        if is_link && entry.file_name() == PREV_LINK {
            marker = Some(entry.path());
        } else {
            return Ok(None);
        }
    }

    Ok(Some(marker))
}

fn read_err(source: std::io::Error, path: &Path) -> PruneError {
    PruneError::ReadDir {
        source,
        path: path.to_path_buf(),
    }
}

/// Pruning error types.
#[derive(Debug, thiserror::Error)]
pub enum PruneError {
    /// Directory cannot be scanned.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Empty directory or its marker cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = PruneError> = std::result::Result<T, E>;
