// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symlink takeover.
//!
//! Make a path a symlink to a given target no matter what currently sits at
//! that path. Symlinks carry no data, so a wrong symlink is simply replaced.
//! Anything else is renamed to a timestamped backup next to it, never
//! deleted.

use crate::{clock::Clock, layout::backup_path};

use std::{
    fs::{create_dir_all, read_link, remove_file, rename, symlink_metadata},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// What [`ensure_symlink`] had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linked {
    /// Path already linked to target.
    Unchanged,

    /// Nothing occupied the path, so a fresh link was made.
    Created,

    /// A symlink to somewhere else was replaced.
    Replaced { previous: PathBuf },

    /// A real file or directory was moved to a backup before linking.
    Displaced { backup: PathBuf },
}

impl Linked {
    /// Check if anything on the filesystem changed.
    pub fn did_work(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Ensure `path` is a symlink to `target`.
///
/// The parent of `path` is created if missing. The current occupant of
/// `path` is handled as follows:
///
/// - Symlink to `target`: nothing happens.
/// - Symlink elsewhere: symlink is removed.
/// - File or directory: renamed to `<name>-<YYYY-MM-DDTHH_MM_SS>` using
///   `clock` for the timestamp.
///
/// Then `path` is linked to `target`. Target does not have to exist.
///
/// # Errors
///
/// - Return [`LinkError::BackupExists`] if the backup path is already taken.
///   Nothing gets renamed in that case.
/// - Return [`LinkError::NoFileName`] if `path` has no final component.
/// - Return other [`LinkError`] variants for underlying filesystem failures.
#[instrument(skip(clock), level = "debug")]
pub fn ensure_symlink(path: &Path, target: &Path, clock: impl Clock) -> Result<Linked> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if !parent.exists() {
            info!("creating {}", parent.display());
            create_dir_all(parent).map_err(|err| LinkError::CreateParent {
                source: err,
                path: parent.to_path_buf(),
            })?;
        }
    }

    let occupant = match symlink_metadata(path) {
        Ok(metadata) => Some(metadata),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(LinkError::Inspect {
                source: err,
                path: path.to_path_buf(),
            })
        }
    };

    let outcome = match occupant {
        Some(metadata) if metadata.file_type().is_symlink() => {
            let current = resolve_link(path)?;
            if current == target {
                info!("{} is already a link to {}", path.display(), target.display());
                return Ok(Linked::Unchanged);
            }

            info!(
                "{} is a link to {} instead of {}",
                path.display(),
                current.display(),
                target.display()
            );
            remove_file(path).map_err(|err| LinkError::RemoveLink {
                source: err,
                path: path.to_path_buf(),
            })?;

            Linked::Replaced { previous: current }
        }
        Some(_) => {
            let backup = backup_path(path, clock.now())
                .ok_or_else(|| LinkError::NoFileName(path.to_path_buf()))?;

            // INVARIANT: Never clobber an earlier backup.
            if symlink_metadata(&backup).is_ok() {
                return Err(LinkError::BackupExists { backup });
            }

            info!("renaming {} to {}", path.display(), backup.display());
            rename(path, &backup).map_err(|err| LinkError::Backup {
                source: err,
                path: path.to_path_buf(),
                backup: backup.clone(),
            })?;

            Linked::Displaced { backup }
        }
        None => Linked::Created,
    };

    info!("linking {} to {}", path.display(), target.display());
    symlink(target, path).map_err(|err| LinkError::Symlink {
        source: err,
        path: path.to_path_buf(),
        target: target.to_path_buf(),
    })?;

    Ok(outcome)
}

/// Destination of the symlink at `path`, relative links taken from its
/// parent directory.
fn resolve_link(path: &Path) -> Result<PathBuf> {
    let dest = read_link(path).map_err(|err| LinkError::ReadLink {
        source: err,
        path: path.to_path_buf(),
    })?;
    debug!("{} points at {}", path.display(), dest.display());

    Ok(match path.parent() {
        Some(parent) => parent.join(dest),
        None => dest,
    })
}

#[cfg(unix)]
fn symlink(target: &Path, path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, path)
}

#[cfg(windows)]
fn symlink(target: &Path, path: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, path)
}

/// Symlink takeover error types.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Backup destination is already occupied.
    #[error("backup path {:?} already exists", backup.display())]
    BackupExists { backup: PathBuf },

    /// Path has no final component to derive a backup name from.
    #[error("cannot derive backup name for {:?}", .0.display())]
    NoFileName(PathBuf),

    /// Parent directory of link cannot be created.
    #[error("failed to create parent directory {:?}", path.display())]
    CreateParent {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Occupant of link path cannot be inspected.
    #[error("failed to inspect {:?}", path.display())]
    Inspect {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Existing symlink cannot be read.
    #[error("failed to read symlink {:?}", path.display())]
    ReadLink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Stale symlink cannot be removed.
    #[error("failed to remove symlink {:?}", path.display())]
    RemoveLink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Occupant cannot be moved to its backup path.
    #[error("failed to rename {:?} to {:?}", path.display(), backup.display())]
    Backup {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        backup: PathBuf,
    },

    /// Symlink cannot be created.
    #[error("failed to link {:?} to {:?}", path.display(), target.display())]
    Symlink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        target: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LinkError> = std::result::Result<T, E>;
