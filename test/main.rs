// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod integration;

use anyhow::Result;
use chrono::NaiveDate;
use git2::Repository;
use std::{
    path::{Path, PathBuf},
    process::Command,
};
use tempfile::TempDir;
use today_tmp::{FixedClock, Reconciler, Vcs};

pub(crate) struct ScratchFixture {
    _root: TempDir,
    pub(crate) repo: PathBuf,
    pub(crate) working: PathBuf,
}

impl ScratchFixture {
    pub(crate) fn new() -> Result<Self> {
        let root = tempfile::tempdir()?;
        let repo = root.path().join("archive");
        let working = root.path().join("home").join("scratch");

        Ok(Self {
            _root: root,
            repo,
            working,
        })
    }

    pub(crate) fn day_dir(&self, day: u32) -> PathBuf {
        self.repo.join(format!("2024-06-{day:02}"))
    }

    pub(crate) fn reconciler<V: Vcs>(&self, vcs: V, day: u32) -> Reconciler<V, FixedClock> {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        Reconciler::new(&self.repo, &self.working, vcs, FixedClock::at_date(date))
    }

    /// Give the repository a committer identity.
    ///
    /// # Invariant
    ///
    /// - Git will complain if this is not set in CI/CD environments.
    pub(crate) fn set_identity(&self) -> Result<()> {
        let mut config = Repository::open(&self.repo)?.config()?;
        config.set_str("user.name", "John Doe")?;
        config.set_str("user.email", "john@doe.com")?;
        config.set_bool("commit.gpgsign", false)?;

        Ok(())
    }

    pub(crate) fn head_summary(&self) -> Result<Option<String>> {
        let repository = Repository::open(&self.repo)?;
        let summary = match repository.head() {
            Ok(head) => head.peel_to_commit()?.summary().map(ToString::to_string),
            Err(_) => None,
        };

        Ok(summary)
    }

    pub(crate) fn commit_count(&self) -> Result<usize> {
        let repository = Repository::open(&self.repo)?;
        if repository.head().is_err() {
            return Ok(0);
        }

        let mut walk = repository.revwalk()?;
        walk.push_head()?;
        Ok(walk.count())
    }

    pub(crate) fn is_tracked(&self, path: impl AsRef<Path>) -> Result<bool> {
        let repository = Repository::open(&self.repo)?;
        let tree = repository.head()?.peel_to_tree()?;
        Ok(tree.get_path(path.as_ref()).is_ok())
    }
}

pub(crate) fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
