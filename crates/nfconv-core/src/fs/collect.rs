//! Flattening of dropped roots into the full set of entries to rename.

use std::collections::HashSet;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::fs::entry::PathEntry;

/// Options controlling [`collect_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Include dot-prefixed descendants. Roots are always included.
    pub include_hidden: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
        }
    }
}

/// A directory whose contents could not be listed, in whole or in part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableDir {
    /// The directory path. The directory itself is still collected.
    pub path: PathBuf,
    /// Human-readable reason reported by the OS. When only some children
    /// were unreadable it names the child that was dropped.
    pub reason: String,
}

/// Result of flattening a set of roots.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Every reachable entry, deduplicated, in deterministic pre-order.
    pub entries: Vec<PathEntry>,
    /// Directories collected without their contents.
    pub unreadable: Vec<UnreadableDir>,
    /// Roots that did not exist (or could not be stat'ed).
    pub missing: Vec<PathBuf>,
}

impl Collection {
    /// Number of collected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if some directory contents were skipped.
    pub fn is_partial(&self) -> bool {
        !self.unreadable.is_empty()
    }

    /// Iterates over the collected paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathEntry::path)
    }
}

/// Flattens `roots` into every file and directory reachable from them,
/// with default [`CollectOptions`].
///
/// # Examples
///
/// ```no_run
/// use nfconv_core::collect;
/// use std::path::PathBuf;
///
/// let collection = collect(&[PathBuf::from("Downloads/Fotos")]);
/// for path in collection.paths() {
///     println!("{}", path.display());
/// }
/// ```
pub fn collect<P: AsRef<Path>>(roots: &[P]) -> Collection {
    collect_with(roots, CollectOptions::default())
}

/// Flattens `roots` into every file and directory reachable from them.
///
/// A file root contributes itself; a directory root contributes itself and
/// all of its descendants. Children are visited in name order. Duplicate or
/// overlapping roots contribute each path once. Symlinks are collected as
/// plain entries and never followed.
///
/// Roots are compared by location, not spelling: `A` and `./A/../A` are
/// the same root. The returned entries keep the first spelling seen.
///
/// Directories that cannot be listed are kept as entries and reported in
/// [`Collection::unreadable`], as are directories with individual children
/// that could not be stat'ed. Roots that cannot be stat'ed go to
/// [`Collection::missing`].
pub fn collect_with<P: AsRef<Path>>(roots: &[P], options: CollectOptions) -> Collection {
    let mut collection = Collection::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        let root = root.as_ref();
        let key = identity_key(root);
        if seen.contains(&key) {
            continue;
        }
        match PathEntry::from_path(root) {
            Ok(entry) => visit(entry, key, options, &mut seen, &mut collection),
            Err(err) => {
                tracing::warn!("skipping root {}: {err}", root.display());
                collection.missing.push(root.to_path_buf());
            }
        }
    }

    tracing::debug!(
        entries = collection.entries.len(),
        unreadable = collection.unreadable.len(),
        "collected entries"
    );
    collection
}

/// Spelling-independent location of `path`: its canonical parent joined
/// with its own name. The entry itself is not resolved, so a symlink keeps
/// its own identity instead of its target's.
fn identity_key(path: &Path) -> PathBuf {
    let resolved = match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            std::fs::canonicalize(parent).map(|p| p.join(name))
        }
        _ => std::fs::canonicalize(path),
    };
    resolved.unwrap_or_else(|_| path.to_path_buf())
}

fn visit(
    entry: PathEntry,
    key: PathBuf,
    options: CollectOptions,
    seen: &mut HashSet<PathBuf>,
    out: &mut Collection,
) {
    if seen.contains(&key) {
        return;
    }
    seen.insert(key.clone());

    let is_dir = entry.is_dir();
    let dir = entry.path().to_path_buf();
    out.entries.push(entry);

    if !is_dir {
        return;
    }

    let listing = match list_sorted(&dir) {
        Ok(listing) => listing,
        Err(err) => {
            tracing::warn!("cannot list {}: {err}", dir.display());
            out.unreadable.push(UnreadableDir {
                path: dir,
                reason: err.to_string(),
            });
            return;
        }
    };
    out.unreadable.extend(listing.skipped);

    for child in listing.children {
        if !options.include_hidden && child.is_hidden() {
            continue;
        }
        let child_key = match child.path().file_name() {
            Some(name) => key.join(name),
            None => identity_key(child.path()),
        };
        visit(child, child_key, options, seen, out);
    }
}

/// Children of one directory plus the ones that could not be read.
#[derive(Debug, Default)]
struct Listing {
    children: Vec<PathEntry>,
    skipped: Vec<UnreadableDir>,
}

fn list_sorted(dir: &Path) -> Result<Listing, CoreError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| CoreError::from_io(dir, e))?;
    // DirEntry::metadata does not traverse symlinks.
    let items = read_dir.map(|entry| entry.map(|e| (e.path(), e.metadata())));
    Ok(gather(dir, items))
}

fn gather<I>(dir: &Path, items: I) -> Listing
where
    I: IntoIterator<Item = io::Result<(PathBuf, io::Result<Metadata>)>>,
{
    let mut listing = Listing::default();
    for item in items {
        let reason = match item {
            Ok((path, Ok(metadata))) => {
                listing.children.push(PathEntry::new(path, &metadata));
                continue;
            }
            Ok((path, Err(err))) => CoreError::from_io(&path, err).to_string(),
            Err(err) => err.to_string(),
        };
        tracing::warn!("skipping an entry of {}: {reason}", dir.display());
        listing.skipped.push(UnreadableDir {
            path: dir.to_path_buf(),
            reason,
        });
    }

    listing
        .children
        .sort_by(|a, b| a.path().file_name().cmp(&b.path().file_name()));
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NormalizationForm;
    use crate::rename::rename_all;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn path_set(collection: &Collection) -> BTreeSet<PathBuf> {
        collection.paths().map(Path::to_path_buf).collect()
    }

    fn make_tree(root: &Path) {
        fs::create_dir_all(root.join("A").join("Sub Dir")).unwrap();
        fs::write(root.join("A").join("B file.TXT"), "").unwrap();
        fs::write(root.join("A").join("Sub Dir").join("Deep One.md"), "").unwrap();
        fs::write(root.join("Loose.txt"), "").unwrap();
    }

    #[test]
    fn collect_single_file_root() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Café Münster.txt");
        fs::write(&file, "").unwrap();

        let collection = collect(&[&file]);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.entries[0].path(), file);
        assert!(collection.missing.is_empty());
        assert!(!collection.is_partial());
    }

    #[test]
    fn collect_directory_includes_root_and_children() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("A");
        fs::create_dir(&a).unwrap();
        fs::write(a.join("B file.TXT"), "").unwrap();

        let collection = collect(&[&a]);

        let expected: BTreeSet<PathBuf> = [a.clone(), a.join("B file.TXT")].into();
        assert_eq!(path_set(&collection), expected);
    }

    #[test]
    fn collect_descends_every_level() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path());

        let collection = collect(&[tmp.path().join("A")]);

        let a = tmp.path().join("A");
        let expected: BTreeSet<PathBuf> = [
            a.clone(),
            a.join("B file.TXT"),
            a.join("Sub Dir"),
            a.join("Sub Dir").join("Deep One.md"),
        ]
        .into();
        assert_eq!(path_set(&collection), expected);
    }

    #[test]
    fn collect_is_preorder_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("r");
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("c.txt"), "").unwrap();
        fs::write(root.join("a.txt"), "").unwrap();
        fs::write(root.join("b").join("inner.txt"), "").unwrap();

        let collection = collect(&[&root]);

        let order: Vec<PathBuf> = collection.paths().map(Path::to_path_buf).collect();
        assert_eq!(
            order,
            vec![
                root.clone(),
                root.join("a.txt"),
                root.join("b"),
                root.join("b").join("inner.txt"),
                root.join("c.txt"),
            ]
        );
    }

    #[test]
    fn collect_duplicate_roots_yield_one_entry() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("same.txt");
        fs::write(&file, "").unwrap();

        let collection = collect(&[&file, &file]);

        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn collect_overlapping_roots_have_no_duplicates() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path());
        let a = tmp.path().join("A");
        let sub = a.join("Sub Dir");

        let nested_first = collect(&[&sub, &a]);
        let parent_first = collect(&[&a, &sub]);

        assert_eq!(nested_first.len(), 4);
        assert_eq!(parent_first.len(), 4);
        assert_eq!(path_set(&nested_first), path_set(&parent_first));
    }

    #[test]
    fn collect_aliased_overlapping_roots_have_no_duplicates() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path());
        let a = tmp.path().join("A");
        // The same directory, spelled through a `..` detour.
        let alias = a.join("Sub Dir").join("..").join("Sub Dir");

        let parent_first = collect(&[&a, &alias]);
        let alias_first = collect(&[&alias, &a]);

        assert_eq!(parent_first.len(), 4);
        assert_eq!(alias_first.len(), 4);
        assert!(parent_first.paths().all(|p| !p.starts_with(&alias)));
        assert_eq!(alias_first.entries[0].path(), alias);

        let outcomes = rename_all(&parent_first.entries, NormalizationForm::Composed);
        assert!(outcomes.iter().all(|o| !o.is_failed()));
        assert!(a.join("sub_dir").join("deep_one.md").exists());
    }

    #[cfg(unix)]
    #[test]
    fn collect_root_through_symlinked_parent_is_deduplicated() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path());
        let a = tmp.path().join("A");
        let link = tmp.path().join("Shortcut");
        std::os::unix::fs::symlink(&a, &link).unwrap();

        let collection = collect(&[&a, &link.join("Sub Dir")]);

        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn gather_records_unreadable_children() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("b.txt"), "").unwrap();
        let metadata = fs::symlink_metadata(dir.join("b.txt")).unwrap();
        let items = vec![
            Ok((dir.join("b.txt"), Ok(metadata))),
            Ok((
                dir.join("a.txt"),
                Err(io::Error::new(io::ErrorKind::NotFound, "vanished")),
            )),
            Err(io::Error::new(io::ErrorKind::Other, "bad entry")),
        ];

        let listing = gather(&dir, items);

        assert_eq!(listing.children.len(), 1);
        assert_eq!(listing.children[0].path(), dir.join("b.txt"));
        assert_eq!(listing.skipped.len(), 2);
        assert!(listing.skipped.iter().all(|s| s.path == dir));
        assert!(listing.skipped[0].reason.contains("a.txt"));
        assert!(listing.skipped[1].reason.contains("bad entry"));
    }

    #[test]
    fn collect_multiple_roots_union() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path());

        let collection = collect(&[tmp.path().join("A"), tmp.path().join("Loose.txt")]);

        assert_eq!(collection.len(), 5);
        assert!(path_set(&collection).contains(&tmp.path().join("Loose.txt")));
    }

    #[test]
    fn collect_missing_root_is_reported() {
        let tmp = TempDir::new().unwrap();
        let ghost = tmp.path().join("ghost");
        let real = tmp.path().join("real.txt");
        fs::write(&real, "").unwrap();

        let collection = collect(&[&ghost, &real]);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.missing, vec![ghost]);
    }

    #[test]
    fn collect_empty_roots() {
        let roots: [PathBuf; 0] = [];
        let collection = collect(&roots);
        assert!(collection.is_empty());
    }

    #[test]
    fn collect_skips_hidden_descendants_when_asked() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".Root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join(".DS_Store"), "").unwrap();
        fs::write(root.join("Visible.txt"), "").unwrap();

        let options = CollectOptions {
            include_hidden: false,
        };
        let collection = collect_with(&[&root], options);

        let expected: BTreeSet<PathBuf> = [root.clone(), root.join("Visible.txt")].into();
        assert_eq!(path_set(&collection), expected);
    }

    #[test]
    fn collect_includes_hidden_by_default() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".DS_Store"), "").unwrap();

        let collection = collect(&[tmp.path()]);

        assert_eq!(collection.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn collect_does_not_follow_symlinked_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("file.txt"), "").unwrap();
        // A link back to its own parent would loop forever if followed.
        std::os::unix::fs::symlink(&root, root.join("Loop")).unwrap();

        let collection = collect(&[&root]);

        let expected: BTreeSet<PathBuf> =
            [root.clone(), root.join("Loop"), root.join("file.txt")].into();
        assert_eq!(path_set(&collection), expected);
    }

    #[cfg(unix)]
    #[test]
    fn collect_unreadable_directory_keeps_entry() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        let locked = root.join("Locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("secret.txt"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root bypasses permission bits; nothing to observe then.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let collection = collect(&[&root]);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let expected: BTreeSet<PathBuf> = [root.clone(), locked.clone()].into();
        assert_eq!(path_set(&collection), expected);
        assert!(collection.is_partial());
        assert_eq!(collection.unreadable.len(), 1);
        assert_eq!(collection.unreadable[0].path, locked);
    }
}
