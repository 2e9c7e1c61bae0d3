// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Archive pending work into the repository.
//!
//! All pending work in the repository goes into a single commit labeled
//! with the current day. The `prev` markers are bookkeeping, so a working
//! tree whose only changes are markers is considered clean. Markers still
//! get committed along with real work though.

use crate::{
    layout::{day_name, is_prev_link},
    vcs::{Vcs, VcsError},
};

use chrono::NaiveDate;
use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// What [`commit_pending`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Committed {
    /// Repository was freshly initialized, nothing to commit.
    Initialized,

    /// Working tree had no changes besides `prev` markers.
    Clean,

    /// Pending changes were committed.
    Committed { changes: usize },
}

/// Commit all pending work in `repo_path` as work done until `today`.
///
/// Creates and initializes the repository if it does not exist yet. An
/// existing directory that is not a working tree gets initialized first,
/// then its content is committed like any other pending work.
///
/// # Errors
///
/// - Return [`CommitError::CreateRepo`] if repository directory cannot be
///   created.
/// - Return [`CommitError::Vcs`] if any version control operation fails.
#[instrument(skip(vcs), level = "debug")]
pub fn commit_pending(repo_path: &Path, vcs: impl Vcs, today: NaiveDate) -> Result<Committed> {
    if !repo_path.exists() {
        info!("{} doesn't exist, creating", repo_path.display());
        create_dir_all(repo_path).map_err(|err| CommitError::CreateRepo {
            source: err,
            path: repo_path.to_path_buf(),
        })?;

        info!("initializing repository in {}", repo_path.display());
        vcs.init(repo_path)?;
        return Ok(Committed::Initialized);
    }

    if !repo_path.join(".git").exists() {
        info!("{} is not a repository, initializing", repo_path.display());
        vcs.init(repo_path)?;
    }

    let changes = vcs
        .status(repo_path)?
        .into_iter()
        .filter(|entry| !is_prev_link(&entry.path))
        .count();

    if changes == 0 {
        info!("{} has no local changes", repo_path.display());
        return Ok(Committed::Clean);
    }

    info!("{} has local changes, committing", repo_path.display());
    let date = day_name(today);
    vcs.add(repo_path, ".")?;
    vcs.commit(
        repo_path,
        &date,
        &format!("Temporary / scratch work until {date}"),
    )?;

    Ok(Committed::Committed { changes })
}

/// Commit error types.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Repository directory cannot be created.
    #[error("failed to create repository directory {:?}", path.display())]
    CreateRepo {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Version control operation fails.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Friendly result alias :3
pub type Result<T, E = CommitError> = std::result::Result<T, E>;
