// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use today_tmp::{
    config::{ConfigFile, Overrides, Settings},
    path::default_config_file,
    Backend, Git2Vcs, GitCommand, Reconciler, SystemClock, Vcs,
};

use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Manage a daily scratch directory.
#[derive(Debug, Clone, Parser)]
#[command(about, version)]
struct Cli {
    /// Path to the main repository.
    #[arg(long, value_name = "path")]
    pub repo_path: Option<PathBuf>,

    /// Path to the daily temporary directory.
    #[arg(long, value_name = "path")]
    pub working_path: Option<PathBuf>,

    /// Perform a full check; this removes empty directories, makes a git
    /// commit if there's new work, etc. even if today's directory already
    /// exists.
    #[arg(long)]
    pub full: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = ConfigFile::load(&default_config_file()?)?;
        let settings = Settings::resolve(
            config,
            Overrides {
                repo_path: self.repo_path,
                working_path: self.working_path,
                full: self.full,
            },
        )?;
        debug!("{settings:?}");

        match settings.vcs {
            Backend::Command => reconcile(settings, GitCommand::default()),
            Backend::Libgit2 => reconcile(settings, Git2Vcs),
        }
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn reconcile(settings: Settings, vcs: impl Vcs) -> Result<()> {
    let report = Reconciler::new(settings.repo_path, settings.working_path, vcs, SystemClock)
        .full(settings.full)
        .run()?;
    debug!("{report:?}");

    Ok(())
}
