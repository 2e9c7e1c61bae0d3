// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{git_available, ScratchFixture};

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs::{read_link, read_to_string, write};
use today_tmp::{
    commit::Committed, layout::PREV_LINK, link::Linked, reconcile::Reconciliation, Git2Vcs,
    GitCommand, Report, Vcs,
};

/// Walk three days of usage through a real repository.
fn three_days_of_scratch(vcs: impl Vcs + Copy) -> Result<()> {
    let fixture = ScratchFixture::new()?;

    // Day one bootstraps everything.
    let report = fixture.reconciler(vcs, 15).run()?;
    let expect = Report::Reconciled(Reconciliation {
        day_dir: fixture.day_dir(15),
        working: Linked::Created,
        commit: Committed::Initialized,
        pruned: vec![],
        created_day_dir: true,
        prev: None,
    });
    assert_eq!(report, expect);
    assert!(fixture.repo.join(".git").is_dir());
    assert_eq!(read_link(&fixture.working)?, fixture.day_dir(15));
    assert!(!fixture.day_dir(15).join(PREV_LINK).exists());
    fixture.set_identity()?;

    // Same day again is a no-op.
    let report = fixture.reconciler(vcs, 15).run()?;
    assert_eq!(
        report,
        Report::NothingToDo {
            day_dir: fixture.day_dir(15)
        }
    );
    assert_eq!(fixture.commit_count()?, 0);

    // Work happens through the working path.
    write(fixture.working.join("notes.txt"), "remember the milk")?;

    // Next day archives yesterday and links back to it.
    let report = fixture.reconciler(vcs, 16).run()?;
    let Report::Reconciled(reconciliation) = report else {
        panic!("expected full reconciliation");
    };
    assert_eq!(reconciliation.commit, Committed::Committed { changes: 1 });
    assert!(reconciliation.created_day_dir);
    assert_eq!(read_link(&fixture.working)?, fixture.day_dir(16));
    assert_eq!(
        read_link(fixture.day_dir(16).join(PREV_LINK))?,
        fixture.day_dir(15)
    );
    assert_eq!(fixture.head_summary()?, Some("2024-06-16".into()));
    assert!(fixture.is_tracked("2024-06-15/notes.txt")?);
    assert_eq!(
        read_to_string(fixture.day_dir(15).join("notes.txt"))?,
        "remember the milk"
    );

    // A full check right after finds nothing, the new prev marker alone is
    // not worth a commit.
    let report = fixture.reconciler(vcs, 16).full(true).run()?;
    assert!(matches!(report, Report::Reconciled(_)));
    assert!(!report.did_work());
    assert_eq!(fixture.commit_count()?, 1);

    // Nothing was written on day two, so day three prunes it and links
    // straight back to day one.
    let report = fixture.reconciler(vcs, 17).run()?;
    let Report::Reconciled(reconciliation) = report else {
        panic!("expected full reconciliation");
    };
    assert_eq!(reconciliation.commit, Committed::Clean);
    assert_eq!(reconciliation.pruned, vec![fixture.day_dir(16)]);
    assert!(!fixture.day_dir(16).exists());
    assert_eq!(
        read_link(fixture.day_dir(17).join(PREV_LINK))?,
        fixture.day_dir(15)
    );
    assert_eq!(read_link(&fixture.working)?, fixture.day_dir(17));
    assert_eq!(fixture.commit_count()?, 1);

    // And converges.
    let report = fixture.reconciler(vcs, 17).run()?;
    assert!(!report.did_work());

    Ok(())
}

#[test]
fn three_days_with_libgit2() -> Result<()> {
    three_days_of_scratch(Git2Vcs)
}

#[test]
fn three_days_with_git_binary() -> Result<()> {
    if !git_available() {
        eprintln!("git binary not found, skipping");
        return Ok(());
    }

    three_days_of_scratch(&GitCommand::default())
}

#[test]
fn displaced_working_directory_is_preserved() -> Result<()> {
    let fixture = ScratchFixture::new()?;
    std::fs::create_dir_all(&fixture.working)?;
    write(fixture.working.join("draft.md"), "# draft")?;

    let report = fixture.reconciler(Git2Vcs, 15).run()?;
    let Report::Reconciled(reconciliation) = report else {
        panic!("expected full reconciliation");
    };
    let backup = fixture
        .working
        .with_file_name("scratch-2024-06-15T00_00_00");
    assert_eq!(
        reconciliation.working,
        Linked::Displaced {
            backup: backup.clone()
        }
    );
    assert_eq!(read_to_string(backup.join("draft.md"))?, "# draft");
    assert_eq!(read_link(&fixture.working)?, fixture.day_dir(15));

    Ok(())
}

#[test]
fn latest_date_wins_as_prev() -> Result<()> {
    let fixture = ScratchFixture::new()?;
    fixture.reconciler(Git2Vcs, 1).run()?;
    fixture.set_identity()?;
    for day in [2, 1] {
        std::fs::create_dir_all(fixture.day_dir(day))?;
        write(fixture.day_dir(day).join("notes.txt"), "content")?;
    }
    write(fixture.repo.join("notes.txt"), "not a day")?;
    std::fs::create_dir_all(fixture.repo.join("2024-13-40"))?;
    write(fixture.repo.join("2024-13-40").join("junk"), "not a day either")?;

    fixture.reconciler(Git2Vcs, 3).run()?;
    assert_eq!(
        read_link(fixture.day_dir(3).join(PREV_LINK))?,
        fixture.day_dir(2)
    );

    Ok(())
}
