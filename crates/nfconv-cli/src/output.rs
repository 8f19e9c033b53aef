//! Plain-text rendering of run events and plans.

use std::path::PathBuf;

use nfconv_core::{Outcome, RenamePlan, RunEvent, RunState, UnreadableDir};

/// Formats one processed entry as `[index/total] old -> new`.
pub fn progress_line(index: usize, total: usize, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Renamed { old, new } => {
            format!("[{index}/{total}] {} -> {}", old.display(), new.display())
        }
        Outcome::Unchanged(path) => format!("[{index}/{total}] {} (unchanged)", path.display()),
        Outcome::Failed { path, error } => {
            format!("[{index}/{total}] Failed to convert '{}': {error}", path.display())
        }
    }
}

/// Formats the collection warnings: unreadable directories and missing roots.
pub fn collection_warnings(unreadable: &[UnreadableDir], missing: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = missing
        .iter()
        .map(|path| format!("warning: {} does not exist, skipped", path.display()))
        .collect();
    lines.extend(unreadable.iter().map(|dir| {
        format!(
            "warning: could not read all of {} ({}), unreadable contents were skipped",
            dir.path.display(),
            dir.reason
        )
    }));
    lines
}

/// Formats a dry-run listing of `plan`.
pub fn plan_lines(plan: &RenamePlan) -> Vec<String> {
    let total = plan.len();
    let mut lines: Vec<String> = plan
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.is_noop())
        .map(|(i, item)| {
            format!(
                "[{}/{total}] {} -> {}",
                i + 1,
                item.old().display(),
                item.new_path().display()
            )
        })
        .collect();

    for collision in plan.collisions() {
        let sources: Vec<String> = collision
            .sources
            .iter()
            .map(|p| format!("'{}'", p.display()))
            .collect();
        lines.push(format!(
            "collision: {} would all become '{}'",
            sources.join(", "),
            collision.target.display()
        ));
    }

    let changes = plan.changes().count();
    lines.push(format!(
        "{changes} of {total} entries would be renamed to {}.",
        plan.form()
    ));
    lines
}

/// Prints a run event to stdout/stderr.
pub fn print_event(event: &RunEvent<'_>) {
    match event {
        RunEvent::Collected {
            unreadable,
            missing,
            ..
        } => {
            for line in collection_warnings(unreadable, missing) {
                eprintln!("{line}");
            }
        }
        RunEvent::Progress {
            index,
            total,
            outcome,
        } => {
            let line = progress_line(*index, *total, outcome);
            if outcome.is_failed() {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
        RunEvent::StateChanged(RunState::Completed) => println!("Done."),
        RunEvent::StateChanged(_) => {}
    }
}
