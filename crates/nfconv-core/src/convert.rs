//! One complete conversion run: collect, then rename.

use std::path::PathBuf;

use crate::event::RunEvent;
use crate::fs::collect::{collect_with, CollectOptions, UnreadableDir};
use crate::naming::NormalizationForm;
use crate::rename::{Outcome, RenamePlan, Renamer, RunState};
use crate::roots::DropRoots;

/// Everything a frontend needs after a run.
#[derive(Debug)]
pub struct RunReport {
    /// Form the entries were converted to.
    pub form: NormalizationForm,
    /// Outcomes in execution order, ending at the first failure.
    pub outcomes: Vec<Outcome>,
    /// Directories whose contents were not collected.
    pub unreadable: Vec<UnreadableDir>,
    /// Roots that could not be found.
    pub missing: Vec<PathBuf>,
    /// [`RunState::Completed`] or [`RunState::Aborted`].
    pub state: RunState,
    /// Roots rewritten to their post-run paths, ready for the next run.
    pub roots: DropRoots,
}

impl RunReport {
    /// Number of entries actually renamed.
    pub fn renamed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Renamed { .. }))
            .count()
    }

    /// The failure that aborted the run, if any.
    pub fn failure(&self) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.is_failed())
    }

    /// Returns `true` if the run processed every entry.
    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }
}

/// Converts everything under `roots` to `form`.
pub fn convert(roots: &DropRoots, form: NormalizationForm, options: CollectOptions) -> RunReport {
    convert_with(roots, form, options, |_| {})
}

/// Converts everything under `roots` to `form`, reporting each step to
/// `observer`.
///
/// The run goes `Idle → Collecting → Renaming → Completed | Aborted`; every
/// transition and every processed entry is reported. The input snapshot is
/// left untouched; the updated one is returned in [`RunReport::roots`].
pub fn convert_with<F>(
    roots: &DropRoots,
    form: NormalizationForm,
    options: CollectOptions,
    mut observer: F,
) -> RunReport
where
    F: FnMut(RunEvent<'_>),
{
    observer(RunEvent::StateChanged(RunState::Collecting));
    let collection = collect_with(roots.paths(), options);
    observer(RunEvent::Collected {
        entries: collection.len(),
        unreadable: &collection.unreadable,
        missing: &collection.missing,
    });

    observer(RunEvent::StateChanged(RunState::Renaming));
    let mut renamer = Renamer::new(RenamePlan::build(&collection.entries, form));
    let total = collection.len();
    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = renamer.next() {
        let (index, _) = renamer.progress();
        observer(RunEvent::Progress {
            index,
            total,
            outcome: &outcome,
        });
        outcomes.push(outcome);
    }

    let state = renamer.state();
    observer(RunEvent::StateChanged(state));
    tracing::info!(
        form = %form,
        processed = outcomes.len(),
        total,
        ?state,
        "conversion finished"
    );

    let roots = roots.apply(&outcomes);
    RunReport {
        form,
        outcomes,
        unreadable: collection.unreadable,
        missing: collection.missing,
        state,
        roots,
    }
}
