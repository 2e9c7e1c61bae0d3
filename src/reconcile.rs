// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Daily scratch directory reconciliation.
//!
//! Every run re-derives the desired state from the filesystem and the
//! repository alone, then converges on it:
//!
//! - Today's day directory exists in the repository.
//! - The working path is a symlink to today's day directory.
//! - Today's `prev` marker links to the latest earlier day directory, if
//!   there is one.
//! - All pending work is committed, and empty day directories are gone.
//!
//! Most runs find today's directory in place and the working path already
//! linked, in which case nothing else is looked at. Otherwise, or when a
//! full check is requested, the whole sequence runs: commit, prune,
//! re-index, create today's directory, and link `prev`. Every step is
//! idempotent, so re-running after a failure picks up where it stopped.
//!
//! Concurrent runs against the same repository are not guarded against.

use crate::{
    clock::{Clock, SystemClock},
    commit::{commit_pending, CommitError, Committed},
    days::{latest_day_before, DayError},
    layout::{day_name, PREV_LINK},
    link::{ensure_symlink, LinkError, Linked},
    prune::{prune_empty_days, PruneError},
    vcs::{GitCommand, Vcs},
};

use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Reconcile daily scratch directory.
#[derive(Debug)]
pub struct Reconciler<V = GitCommand, C = SystemClock>
where
    V: Vcs,
    C: Clock,
{
    repo_path: PathBuf,
    working_path: PathBuf,
    full: bool,
    vcs: V,
    clock: C,
}

impl<V, C> Reconciler<V, C>
where
    V: Vcs,
    C: Clock,
{
    /// Construct new reconciler.
    ///
    /// Both paths should be absolute, since they end up as symlink targets.
    pub fn new(
        repo_path: impl Into<PathBuf>,
        working_path: impl Into<PathBuf>,
        vcs: V,
        clock: C,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            working_path: working_path.into(),
            full: false,
            vcs,
            clock,
        }
    }

    /// Run the full sequence even if today's setup already looks right.
    pub fn full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    /// Converge on today's layout.
    ///
    /// # Errors
    ///
    /// - Return [`ReconcileError::Link`] if a symlink cannot be put in place,
    ///   including when a backup would clobber an existing path.
    /// - Return [`ReconcileError::Commit`] if archiving pending work fails.
    ///   Nothing after the commit step runs in that case.
    /// - Return [`ReconcileError::Prune`], [`ReconcileError::Days`], or
    ///   [`ReconcileError::CreateDayDir`] on filesystem failures.
    #[instrument(skip(self), fields(repo = %self.repo_path.display()), level = "debug")]
    pub fn run(&self) -> Result<Report> {
        // INVARIANT: One notion of today for the whole run.
        let now = self.clock.now();
        let day_dir = self.repo_path.join(day_name(now.date()));

        let day_dir_exists = day_dir.is_dir();
        let working = ensure_symlink(&self.working_path, &day_dir, &self.clock)?;

        // INVARIANT: A stale working path alone forces the full sequence.
        let settled = day_dir_exists && !working.did_work();
        if settled {
            info!("{} already exists, nothing to do", day_dir.display());
            if !self.full {
                return Ok(Report::NothingToDo { day_dir });
            }
        }

        let commit = commit_pending(&self.repo_path, &self.vcs, now.date())?;
        let pruned = prune_empty_days(&self.repo_path, std::slice::from_ref(&day_dir))?;
        let latest = latest_day_before(&self.repo_path, now.date())?;

        let created_day_dir = !day_dir_exists;
        if created_day_dir {
            info!("creating {}", day_dir.display());
            create_dir_all(&day_dir).map_err(|err| ReconcileError::CreateDayDir {
                source: err,
                path: day_dir.clone(),
            })?;
        }

        let prev = match latest {
            Some(latest) => {
                info!("previous working path was {}", latest.display());
                let linked = ensure_symlink(&day_dir.join(PREV_LINK), &latest, &self.clock)?;
                Some(PrevLink {
                    target: latest,
                    linked,
                })
            }
            None => None,
        };

        Ok(Report::Reconciled(Reconciliation {
            day_dir,
            working,
            commit,
            pruned,
            created_day_dir,
            prev,
        }))
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Today's directory exists and the working path already links to it.
    NothingToDo { day_dir: PathBuf },

    /// Full sequence ran.
    Reconciled(Reconciliation),
}

impl Report {
    /// Today's day directory.
    pub fn day_dir(&self) -> &Path {
        match self {
            Self::NothingToDo { day_dir } => day_dir,
            Self::Reconciled(reconciliation) => &reconciliation.day_dir,
        }
    }

    /// Check if the run changed anything on disk or in the repository.
    pub fn did_work(&self) -> bool {
        match self {
            Self::NothingToDo { .. } => false,
            Self::Reconciled(reconciliation) => reconciliation.did_work(),
        }
    }
}

/// Record of what each step of the full sequence did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub day_dir: PathBuf,
    pub working: Linked,
    pub commit: Committed,
    pub pruned: Vec<PathBuf>,
    pub created_day_dir: bool,
    pub prev: Option<PrevLink>,
}

impl Reconciliation {
    pub fn did_work(&self) -> bool {
        self.working.did_work()
            || !matches!(self.commit, Committed::Clean)
            || !self.pruned.is_empty()
            || self.created_day_dir
            || self.prev.as_ref().is_some_and(|prev| prev.linked.did_work())
    }
}

/// Link from today's directory back to its predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrevLink {
    pub target: PathBuf,
    pub linked: Linked,
}

/// Reconciliation error types.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Symlink cannot be put in place.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Pending work cannot be committed.
    #[error(transparent)]
    Commit(#[from] CommitError),

    /// Empty day directories cannot be pruned.
    #[error(transparent)]
    Prune(#[from] PruneError),

    /// Day directories cannot be indexed.
    #[error(transparent)]
    Days(#[from] DayError),

    /// Today's directory cannot be created.
    #[error("failed to create day directory {:?}", path.display())]
    CreateDayDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
