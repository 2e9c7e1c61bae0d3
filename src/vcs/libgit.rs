// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version control through libgit2.

use crate::vcs::{Result, StatusEntry, Vcs, VcsError};

use git2::{IndexAddOption, Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Backend that drives libgit2 in process.
///
/// Commits are authored with the signature from the repository's Git
/// configuration, so `user.name` and `user.email` must be set somewhere
/// Git can see them.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Vcs;

impl Vcs for Git2Vcs {
    #[instrument(skip(self), level = "debug")]
    fn init(&self, repo: &Path) -> Result<()> {
        Repository::init(repo)?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn status(&self, repo: &Path) -> Result<Vec<StatusEntry>> {
        let repository = Repository::open(repo)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = repository.statuses(Some(&mut opts))?;
        let entries = statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .map(|entry| {
                StatusEntry::new(
                    porcelain_code(entry.status()),
                    bytes_to_path(entry.path_bytes()),
                )
            })
            .collect();

        Ok(entries)
    }

    #[instrument(skip(self), level = "debug")]
    fn add(&self, repo: &Path, pathspec: &str) -> Result<()> {
        let repository = Repository::open(repo)?;
        if repository.workdir().is_none() {
            return Err(VcsError::NoWorkTree(repo.to_path_buf()));
        }

        // INVARIANT: Whole tree means every path, libgit2 does not grok ".".
        let pathspec = if pathspec == "." { "*" } else { pathspec };
        let mut index = repository.index()?;
        index.add_all([pathspec], IndexAddOption::DEFAULT, None)?;

        // INVARIANT: Deleted files must be staged as removals too.
        index.update_all([pathspec], None)?;
        index.write()?;

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn commit(&self, repo: &Path, summary: &str, body: &str) -> Result<()> {
        let repository = Repository::open(repo)?;
        let mut index = repository.index()?;
        let tree_oid = index.write_tree()?;
        let tree = repository.find_tree(tree_oid)?;
        let signature = repository.signature()?;

        // INVARIANT: Unborn HEAD means this is the root commit.
        let parent = match repository.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents = parent.iter().collect::<Vec<_>>();

        let message = format!("{summary}\n\n{body}\n");
        let oid = repository.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &parents,
        )?;
        debug!("created commit {oid}");

        Ok(())
    }
}

/// Render libgit2 status flags the way `git status --porcelain` does.
fn porcelain_code(status: Status) -> String {
    if status.is_wt_new() && !status.intersects(index_flags()) {
        return "??".into();
    }

    if status.is_ignored() {
        return "!!".into();
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else if status.is_conflicted() {
        'U'
    } else {
        ' '
    };

    [index, worktree].iter().collect()
}

fn index_flags() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

// Thanks from:
//
// https://github.com/rust-lang/git2-rs/blob/5bc3baa9694a94db2ca9cc256b5bce8a215f9013/
// src/util.rs#L85
#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::{ffi::OsStr, os::unix::prelude::*};
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(windows)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;
    use std::fs::{create_dir, remove_file, write};

    fn init_repo(path: &Path) -> anyhow::Result<()> {
        Git2Vcs.init(path)?;

        // INVARIANT: Always provide valid name and email.
        //   - Git will complain if this is not set in CI/CD environments.
        let mut config = Repository::open(path)?.config()?;
        config.set_str("user.name", "John Doe")?;
        config.set_str("user.email", "john@doe.com")?;

        Ok(())
    }

    #[test_case(Status::WT_NEW, "??"; "untracked")]
    #[test_case(Status::INDEX_NEW, "A "; "staged addition")]
    #[test_case(Status::WT_MODIFIED, " M"; "unstaged modification")]
    #[test_case(Status::INDEX_MODIFIED | Status::WT_MODIFIED, "MM"; "staged and unstaged")]
    #[test_case(Status::INDEX_DELETED, "D "; "staged deletion")]
    #[test_case(Status::WT_DELETED, " D"; "unstaged deletion")]
    #[test_case(Status::IGNORED, "!!"; "ignored")]
    #[test]
    fn render_porcelain_codes(status: Status, expect: &str) {
        assert_eq!(porcelain_code(status), expect);
    }

    #[test]
    fn status_add_commit_cycle() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        init_repo(dir.path())?;
        create_dir(dir.path().join("2024-06-15"))?;
        write(dir.path().join("2024-06-15").join("notes.txt"), "hello")?;

        let status = Git2Vcs.status(dir.path())?;
        assert_eq!(status, vec![StatusEntry::new("??", "2024-06-15/notes.txt")]);

        Git2Vcs.add(dir.path(), ".")?;
        Git2Vcs.commit(dir.path(), "2024-06-15", "Temporary / scratch work until 2024-06-15")?;
        assert!(Git2Vcs.status(dir.path())?.is_empty());

        let repository = Repository::open(dir.path())?;
        let head = repository.head()?.peel_to_commit()?;
        assert_eq!(head.summary(), Some("2024-06-15"));
        assert_eq!(head.body(), Some("Temporary / scratch work until 2024-06-15"));
        assert_eq!(head.parent_count(), 0);

        Ok(())
    }

    #[test]
    fn deletions_are_staged() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        init_repo(dir.path())?;
        write(dir.path().join("notes.txt"), "hello")?;
        Git2Vcs.add(dir.path(), ".")?;
        Git2Vcs.commit(dir.path(), "first", "first")?;

        remove_file(dir.path().join("notes.txt"))?;
        assert_eq!(
            Git2Vcs.status(dir.path())?,
            vec![StatusEntry::new(" D", "notes.txt")]
        );

        Git2Vcs.add(dir.path(), ".")?;
        Git2Vcs.commit(dir.path(), "second", "second")?;
        assert!(Git2Vcs.status(dir.path())?.is_empty());

        let repository = Repository::open(dir.path())?;
        let head = repository.head()?.peel_to_commit()?;
        assert_eq!(head.parent_count(), 1);
        assert!(head.tree()?.is_empty());

        Ok(())
    }

    #[test]
    fn status_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Git2Vcs.status(dir.path());
        assert!(matches!(result, Err(VcsError::Git2(_))));
    }
}
