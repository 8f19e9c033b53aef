//! Events reported by a conversion run.
//!
//! The core never renders anything. [`crate::convert_with`] hands each
//! [`RunEvent`] to a caller-supplied observer, which a CLI prints as
//! progress lines and a GUI could map onto a progress bar. Events flow
//! **Core → UI** only.

use std::path::PathBuf;

use crate::fs::collect::UnreadableDir;
use crate::rename::{Outcome, RunState};

/// A notification emitted while a run progresses.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// The run moved to a new state.
    StateChanged(RunState),
    /// Collection finished.
    Collected {
        /// Number of entries that will be processed.
        entries: usize,
        /// Directories whose contents were skipped.
        unreadable: &'a [UnreadableDir],
        /// Roots that could not be found.
        missing: &'a [PathBuf],
    },
    /// One entry was processed.
    Progress {
        /// 1-based position of this entry in the run.
        index: usize,
        /// Total number of entries in the run.
        total: usize,
        /// What happened to the entry.
        outcome: &'a Outcome,
    },
}
