// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version control through the `git` binary.

use crate::vcs::{Result, StatusEntry, Vcs, VcsError};

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, instrument};

/// Backend that runs the `git` binary as a child process.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: OsString,
}

impl GitCommand {
    /// Construct backend running `program` instead of `git` from `$PATH`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run<'a>(&self, repo: &Path, args: impl IntoIterator<Item = &'a str>) -> Result<String> {
        let args = args.into_iter().collect::<Vec<_>>();
        syscall_non_interactive(repo, &self.program, args)
    }
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Vcs for GitCommand {
    #[instrument(skip(self), level = "debug")]
    fn init(&self, repo: &Path) -> Result<()> {
        let output = self.run(repo, ["init"])?;
        debug!("{output}");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn status(&self, repo: &Path) -> Result<Vec<StatusEntry>> {
        let output = self.run(
            repo,
            ["status", "--porcelain", "-z", "--untracked-files=all"],
        )?;
        Ok(parse_porcelain(&output))
    }

    #[instrument(skip(self), level = "debug")]
    fn add(&self, repo: &Path, pathspec: &str) -> Result<()> {
        self.run(repo, ["add", "--", pathspec])?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn commit(&self, repo: &Path, summary: &str, body: &str) -> Result<()> {
        let output = self.run(repo, ["commit", "-m", summary, "-m", body])?;
        debug!("{output}");
        Ok(())
    }
}

/// Parse NUL separated output of `git status --porcelain -z`.
///
/// Each record is `XY <path>`. Renames and copies are followed by an extra
/// record holding the original path, which gets skipped.
pub(crate) fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut records = output.split('\0').filter(|record| !record.is_empty());
    while let Some(record) = records.next() {
        let (Some(code), Some(path)) = (record.get(..2), record.get(3..)) else {
            continue;
        };

        if code.starts_with(['R', 'C']) {
            records.next();
        }

        entries.push(StatusEntry::new(code, PathBuf::from(path)));
    }

    entries
}

fn syscall_non_interactive(
    repo: &Path,
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let args = args
        .into_iter()
        .map(|arg| arg.as_ref().to_os_string())
        .collect::<Vec<_>>();
    let command = std::iter::once(cmd.as_ref())
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ");

    let output = Command::new(cmd.as_ref())
        .args(&args)
        .current_dir(repo)
        .output()
        .map_err(|err| VcsError::Spawn {
            source: err,
            command: command.clone(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();

    if !output.status.success() {
        let mut message = String::new();
        if !stdout.is_empty() {
            message.push_str(format!("stdout: {stdout}").as_str());
        }

        if !stderr.is_empty() {
            message.push_str(format!("stderr: {stderr}").as_str());
        }

        // INVARIANT: Chomp trailing newlines.
        let message = message.trim_end().to_string();
        return Err(VcsError::Failed { command, message });
    }

    Ok(stdout)
}
