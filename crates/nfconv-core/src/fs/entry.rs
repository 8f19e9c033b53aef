//! Path entry representation.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::naming::split_name;

/// A single file or directory found while collecting.
///
/// `PathEntry` is immutable. The name is kept exactly as stored on disk
/// (never normalised) because the renamer compares it against the
/// converted name. Symlinks are described by their own metadata and are
/// never followed.
///
/// # Examples
///
/// ```no_run
/// use nfconv_core::PathEntry;
/// use std::path::Path;
///
/// let entry = PathEntry::from_path(Path::new("Music/Björk.flac")).unwrap();
/// assert_eq!(entry.extension(), ".flac");
/// assert_eq!(entry.depth(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    path: PathBuf,
    depth: usize,
    is_dir: bool,
    is_symlink: bool,
}

impl PathEntry {
    /// Creates a new `PathEntry` from a path and its (non-following) metadata.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let depth = path_depth(&path);
        Self {
            path,
            depth,
            is_dir: metadata.is_dir(),
            is_symlink: metadata.is_symlink(),
        }
    }

    /// Stats `path` without following symlinks and builds an entry from it.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if `path` does not exist.
    /// - [`CoreError::PermissionDenied`] if its metadata cannot be read.
    /// - [`CoreError::Io`] for any other I/O failure.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let metadata =
            std::fs::symlink_metadata(path).map_err(|e| CoreError::from_io(path, e))?;
        Ok(Self::new(path.to_path_buf(), &metadata))
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory containing this entry, if any.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Returns the base name, or `None` when the path has no final
    /// component (`/`, `..`) or the name is not valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Returns the extension including its dot, or `""` when there is none.
    pub fn extension(&self) -> &str {
        self.name().map(|n| split_name(n).1).unwrap_or("")
    }

    /// Number of components in the path. Descendants are always deeper
    /// than their ancestors.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` if this entry is a directory (symlinks excluded).
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` if this entry is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.name().is_some_and(|n| n.starts_with('.'))
    }
}

/// Counts the components of `path`, used as the rename ordering key.
pub fn path_depth(path: &Path) -> usize {
    path.components().count()
}
