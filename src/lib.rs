// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Daily scratch directory manager.
//!
//! Keep a stable __working path__ linked to a fresh directory every day,
//! while each day's directory is archived into a Git repository partitioned
//! by date. Each day directory links back to the last day that had content
//! through a `prev` symlink.
//!
//! All state lives on the filesystem and in the repository, so running
//! [`Reconciler::run`] any number of times, from a timer or after an
//! interrupted run, always converges on the same layout.

pub mod clock;
pub mod commit;
pub mod config;
pub mod days;
pub mod layout;
pub mod link;
pub mod path;
pub mod prune;
pub mod reconcile;
pub mod vcs;

pub use clock::{Clock, FixedClock, SystemClock};
pub use reconcile::{Reconciler, Report};
pub use vcs::{Backend, Git2Vcs, GitCommand, Vcs};
