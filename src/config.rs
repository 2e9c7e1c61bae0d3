// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Settings come from three layers, highest priority first: command-line
//! flags, the configuration file, and built-in defaults.
//!
//! # Configuration File
//!
//! The configuration file is TOML and every key is optional:
//!
//! ```toml
//! repo_path = "~/Documents/scratch-archive"
//! working_path = "$HOME/scratch"
//! vcs = "libgit2"
//! ```
//!
//! Paths undergo shell expansion. A missing file is treated as empty.

use crate::{
    path::{default_repo_dir, default_working_path, NoWayHome},
    vcs::Backend,
};

use serde::Deserialize;
use std::{
    fs::read_to_string,
    io::ErrorKind,
    path::{absolute, Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Repository holding the day directories.
    pub repo_path: Option<PathBuf>,

    /// Path that always links to today's directory.
    pub working_path: Option<PathBuf>,

    /// Version control backend.
    pub vcs: Backend,
}

impl ConfigFile {
    /// Load configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file exists but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is invalid.
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self> {
        match read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read {
                source: err,
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for ConfigFile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: ConfigFile = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on path fields.
        config.repo_path = config.repo_path.map(expand).transpose()?;
        config.working_path = config.working_path.map(expand).transpose()?;

        Ok(config)
    }
}

fn expand(path: PathBuf) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// Settings given on the command-line.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Overrides {
    pub repo_path: Option<PathBuf>,
    pub working_path: Option<PathBuf>,
    pub full: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Settings {
    /// Absolute path to repository.
    pub repo_path: PathBuf,

    /// Absolute working path.
    pub working_path: PathBuf,

    /// Run full reconciliation even if nothing looks stale.
    pub full: bool,

    /// Version control backend.
    pub vcs: Backend,
}

impl Settings {
    /// Layer command-line overrides over configuration file over defaults.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NoWayHome`] if a default is needed but the
    ///   home directory cannot be determined.
    /// - Return [`ConfigError::Absolute`] if a path cannot be made absolute.
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self> {
        let repo_path = match overrides.repo_path.or(file.repo_path) {
            Some(path) => path,
            None => default_repo_dir()?,
        };
        let working_path = match overrides.working_path.or(file.working_path) {
            Some(path) => path,
            None => default_working_path()?,
        };

        Ok(Self {
            repo_path: make_absolute(repo_path)?,
            working_path: make_absolute(working_path)?,
            full: overrides.full,
            vcs: file.vcs,
        })
    }
}

fn make_absolute(path: PathBuf) -> Result<PathBuf> {
    absolute(&path).map_err(|err| ConfigError::Absolute { source: err, path })
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Failed to determine a default path.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),

    /// Failed to make path absolute.
    #[error("failed to make {:?} absolute", path.display())]
    Absolute {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
