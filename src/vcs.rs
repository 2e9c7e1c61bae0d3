// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version control capability.
//!
//! The repository is archived through four operations: init, status, add,
//! and commit. Each is run with the repository root as its working tree.
//! Two backends are provided: [`GitCommand`], which shells out to the `git`
//! binary so user hooks and configuration apply, and [`Git2Vcs`], which
//! drives libgit2 directly.

pub mod command;
pub mod libgit;

pub use command::GitCommand;
pub use libgit::Git2Vcs;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Version control operations needed to archive the repository.
pub trait Vcs {
    /// Initialize a fresh working tree at `repo`.
    fn init(&self, repo: &Path) -> Result<()>;

    /// List pending changes in working tree at `repo`.
    fn status(&self, repo: &Path) -> Result<Vec<StatusEntry>>;

    /// Stage changes matching `pathspec`.
    fn add(&self, repo: &Path, pathspec: &str) -> Result<()>;

    /// Commit staged changes.
    fn commit(&self, repo: &Path, summary: &str, body: &str) -> Result<()>;
}

impl<V: Vcs + ?Sized> Vcs for &V {
    fn init(&self, repo: &Path) -> Result<()> {
        (**self).init(repo)
    }

    fn status(&self, repo: &Path) -> Result<Vec<StatusEntry>> {
        (**self).status(repo)
    }

    fn add(&self, repo: &Path, pathspec: &str) -> Result<()> {
        (**self).add(repo, pathspec)
    }

    fn commit(&self, repo: &Path, summary: &str, body: &str) -> Result<()> {
        (**self).commit(repo, summary, body)
    }
}

/// Single pending change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Two character porcelain status code, e.g., "??" or " M".
    pub code: String,

    /// Path relative to repository root.
    pub path: PathBuf,
}

impl StatusEntry {
    pub fn new(code: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
        }
    }
}

/// Selectable version control backend.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Run the `git` binary.
    #[default]
    Command,

    /// Use libgit2.
    Libgit2,
}

/// Version control error types.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Command cannot be spawned.
    #[error("failed to run {command:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        command: String,
    },

    /// Command exited unsuccessfully.
    #[error("command {command:?} failed:\n{message}")]
    Failed { command: String, message: String },

    /// Working tree has no root directory, e.g., it is bare.
    #[error("repository at {:?} has no working tree", .0.display())]
    NoWorkTree(PathBuf),
}

/// Friendly result alias :3
pub type Result<T, E = VcsError> = std::result::Result<T, E>;
