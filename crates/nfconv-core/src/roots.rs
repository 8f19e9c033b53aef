//! The user-supplied roots of a conversion.
//!
//! [`DropRoots`] is an immutable snapshot: every change returns a new value,
//! so a frontend can hold on to the roots it displayed while a run produces
//! the snapshot for the next one.

use std::path::{Path, PathBuf};

use crate::rename::Outcome;

/// Ordered, duplicate-free list of dropped files and folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropRoots {
    roots: Vec<PathBuf>,
}

impl DropRoots {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a snapshot from `paths`, dropping repeats.
    #[must_use]
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .fold(Self::new(), |roots, path| roots.with_root(path))
    }

    /// Returns a new snapshot with `path` appended, unless it is already present.
    #[must_use]
    pub fn with_root(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut roots = self.roots.clone();
        if !roots.contains(&path) {
            roots.push(path);
        }
        Self { roots }
    }

    /// Returns a new snapshot without `path`.
    #[must_use]
    pub fn without_root(&self, path: &Path) -> Self {
        let roots = self
            .roots
            .iter()
            .filter(|root| root.as_path() != path)
            .cloned()
            .collect();
        Self { roots }
    }

    /// Returns the snapshot that reflects the renames in `outcomes`.
    ///
    /// A renamed root is replaced by its new path. A root lying below a
    /// renamed directory is re-parented, so nested roots stay valid too.
    /// `outcomes` must be in execution order (deepest first).
    #[must_use]
    pub fn apply(&self, outcomes: &[Outcome]) -> Self {
        let mut roots = self.roots.clone();
        for outcome in outcomes {
            let Outcome::Renamed { old, new } = outcome else {
                continue;
            };
            for root in roots.iter_mut() {
                if let Ok(rest) = root.strip_prefix(old) {
                    *root = if rest.as_os_str().is_empty() {
                        new.clone()
                    } else {
                        new.join(rest)
                    };
                }
            }
        }
        Self::from_paths(roots)
    }

    /// The roots in drop order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns `true` if `path` is one of the roots.
    pub fn contains(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| root == path)
    }

    /// Number of roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if no roots were dropped.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterates over the roots in drop order.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.roots.iter()
    }
}
