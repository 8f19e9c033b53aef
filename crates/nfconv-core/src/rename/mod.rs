//! Ordered renaming of a flattened entry set.
//!
//! A [`RenamePlan`] fixes the new name of every entry and the deepest-first
//! order. A [`Renamer`] then applies it lazily, yielding one [`Outcome`] per
//! entry and stopping after the first failure. Nothing is rolled back.

pub mod plan;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::PathEntry;
use crate::naming::NormalizationForm;

pub use plan::{PlannedCollision, RenamePlan, RenamePlanItem};

/// Result of processing a single entry.
#[derive(Debug)]
pub enum Outcome {
    /// The entry was renamed.
    Renamed {
        /// Path before the rename.
        old: PathBuf,
        /// Path after the rename.
        new: PathBuf,
    },
    /// The entry already had its converted name; the filesystem was not touched.
    Unchanged(PathBuf),
    /// The rename failed and the run stopped here.
    Failed {
        /// The entry that could not be renamed.
        path: PathBuf,
        /// Why the rename failed.
        error: CoreError,
    },
}

impl Outcome {
    /// Path of the entry before processing.
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Renamed { old, .. } => old,
            Outcome::Unchanged(path) => path,
            Outcome::Failed { path, .. } => path,
        }
    }

    /// Returns `true` for [`Outcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Renamed { old, new } => write!(f, "{} -> {}", old.display(), new.display()),
            Outcome::Unchanged(path) => write!(f, "{} (unchanged)", path.display()),
            Outcome::Failed { path, error } => {
                write!(f, "failed to convert '{}': {error}", path.display())
            }
        }
    }
}

/// Lifecycle of one conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has happened yet.
    Idle,
    /// Roots are being flattened into entries.
    Collecting,
    /// Entries are being renamed one by one.
    Renaming,
    /// Every entry was processed without failure.
    Completed,
    /// A rename failed; remaining entries were not attempted.
    Aborted,
}

impl RunState {
    /// Returns `true` once the run can make no further progress.
    pub fn is_finished(self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted)
    }
}

/// Lazily applies a [`RenamePlan`], one entry per call to `next`.
///
/// The iterator ends after the last item or right after the first
/// [`Outcome::Failed`].
#[derive(Debug)]
pub struct Renamer {
    items: std::vec::IntoIter<RenamePlanItem>,
    total: usize,
    processed: usize,
    state: RunState,
}

impl Renamer {
    /// Creates a renamer for `plan`. No filesystem call happens until the
    /// first item is pulled.
    pub fn new(plan: RenamePlan) -> Self {
        let items = plan.into_items();
        Self {
            total: items.len(),
            items: items.into_iter(),
            processed: 0,
            state: RunState::Idle,
        }
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// `(processed, total)` item counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.processed, self.total)
    }
}

impl Iterator for Renamer {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        if self.state.is_finished() {
            return None;
        }
        let Some(item) = self.items.next() else {
            self.state = RunState::Completed;
            return None;
        };

        self.state = RunState::Renaming;
        self.processed += 1;
        let outcome = apply(item);

        if outcome.is_failed() {
            self.state = RunState::Aborted;
        } else if self.items.len() == 0 {
            self.state = RunState::Completed;
        }
        Some(outcome)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_finished() {
            (0, Some(0))
        } else {
            (0, Some(self.items.len()))
        }
    }
}

/// Renames every entry into `form`, deepest first.
///
/// The returned outcomes follow the execution order and end at the first
/// [`Outcome::Failed`], if any.
///
/// # Examples
///
/// ```no_run
/// use nfconv_core::{collect, rename_all, NormalizationForm, Outcome};
///
/// let collection = collect(&["Fotos"]);
/// for outcome in rename_all(&collection.entries, NormalizationForm::Composed) {
///     if let Outcome::Failed { path, error } = outcome {
///         eprintln!("{}: {error}", path.display());
///     }
/// }
/// ```
pub fn rename_all(entries: &[PathEntry], form: NormalizationForm) -> Vec<Outcome> {
    Renamer::new(RenamePlan::build(entries, form)).collect()
}

fn apply(item: RenamePlanItem) -> Outcome {
    if item.is_noop() {
        return Outcome::Unchanged(item.old().to_path_buf());
    }
    match rename_entry(item.old(), item.new_path()) {
        Ok(()) => {
            tracing::debug!("renamed {} -> {}", item.old().display(), item.new_path().display());
            Outcome::Renamed {
                old: item.old().to_path_buf(),
                new: item.new_path().to_path_buf(),
            }
        }
        Err(error) => {
            tracing::warn!("failed to rename {}: {error}", item.old().display());
            Outcome::Failed {
                path: item.old().to_path_buf(),
                error,
            }
        }
    }
}

/// Renames `old` to `new` without ever replacing a different file.
///
/// A target that resolves to the same filesystem object as `old` (a
/// case-only or normalization-only change on an insensitive filesystem) is
/// not a collision.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `old` no longer exists.
/// - [`CoreError::Collision`] if `new` is occupied by another file.
/// - [`CoreError::PermissionDenied`] if the parent directory is not writable.
/// - [`CoreError::Io`] for any other I/O failure.
pub fn rename_entry(old: &Path, new: &Path) -> CoreResult<()> {
    std::fs::symlink_metadata(old).map_err(|e| CoreError::from_io(old, e))?;

    if std::fs::symlink_metadata(new).is_ok() && !same_file(old, new) {
        return Err(CoreError::Collision {
            path: old.to_path_buf(),
            target: new.to_path_buf(),
        });
    }

    std::fs::rename(old, new).map_err(|e| CoreError::from_io(old, e))
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::symlink_metadata(a), std::fs::symlink_metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
