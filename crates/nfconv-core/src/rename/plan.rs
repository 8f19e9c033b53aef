//! Rename planning: computing new names and the deepest-first order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::fs::entry::PathEntry;
use crate::naming::{transform_os_name, NormalizationForm};

/// One planned rename. `old` and `new` always share the same parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlanItem {
    old: PathBuf,
    new: PathBuf,
    depth: usize,
}

impl RenamePlanItem {
    /// Plans the rename of a single entry.
    ///
    /// Entries without a final component (`/`, `..`) map to themselves.
    pub fn for_entry(entry: &PathEntry, form: NormalizationForm) -> Self {
        let new = match (entry.parent(), entry.path().file_name()) {
            (Some(parent), Some(name)) => parent.join(transform_os_name(name, form)),
            _ => entry.path().to_path_buf(),
        };
        Self {
            old: entry.path().to_path_buf(),
            new,
            depth: entry.depth(),
        }
    }

    /// Current path of the entry.
    pub fn old(&self) -> &Path {
        &self.old
    }

    /// Path after conversion.
    pub fn new_path(&self) -> &Path {
        &self.new
    }

    /// Depth of the entry, the ordering key.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` if the entry already has its converted name.
    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

/// Several entries that would end up at the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCollision {
    /// The shared destination.
    pub target: PathBuf,
    /// Current paths of the entries competing for it, in plan order.
    pub sources: Vec<PathBuf>,
}

/// Ordered list of renames for one conversion run.
///
/// Items are sorted by depth, deepest first, so every entry is renamed
/// while its recorded path is still valid: no ancestor is touched before
/// all of its descendants. Entries of equal depth keep their input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    form: NormalizationForm,
    items: Vec<RenamePlanItem>,
}

impl RenamePlan {
    /// Builds the plan for `entries` converted to `form`.
    pub fn build(entries: &[PathEntry], form: NormalizationForm) -> Self {
        let mut items: Vec<RenamePlanItem> = entries
            .iter()
            .map(|entry| RenamePlanItem::for_entry(entry, form))
            .collect();
        // Stable: ties keep the collector's order.
        items.sort_by(|a, b| b.depth.cmp(&a.depth));
        Self { form, items }
    }

    /// Target normalization form.
    pub fn form(&self) -> NormalizationForm {
        self.form
    }

    /// All items in execution order.
    pub fn items(&self) -> &[RenamePlanItem] {
        &self.items
    }

    /// Number of items, including no-ops.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the plan has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose name actually changes.
    pub fn changes(&self) -> impl Iterator<Item = &RenamePlanItem> {
        self.items.iter().filter(|item| !item.is_noop())
    }

    /// Destinations claimed by more than one entry of this plan.
    ///
    /// Only collisions visible within the plan are reported; targets that
    /// already exist outside the collected set are caught when renaming.
    pub fn collisions(&self) -> Vec<PlannedCollision> {
        let mut by_target: BTreeMap<&Path, Vec<PathBuf>> = BTreeMap::new();
        for item in &self.items {
            by_target
                .entry(item.new.as_path())
                .or_default()
                .push(item.old.clone());
        }
        by_target
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(target, sources)| PlannedCollision {
                target: target.to_path_buf(),
                sources,
            })
            .collect()
    }

    pub(crate) fn into_items(self) -> Vec<RenamePlanItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::collect::collect;
    use std::fs;
    use tempfile::TempDir;

    fn build_tree(root: &Path) {
        fs::create_dir_all(root.join("Top Dir").join("Mid Dir")).unwrap();
        fs::write(root.join("Top Dir").join("Mid Dir").join("Deep File.txt"), "").unwrap();
        fs::write(root.join("Top Dir").join("Side File.txt"), "").unwrap();
        fs::write(root.join("Top Dir").join("plain.txt"), "").unwrap();
    }

    #[test]
    fn plan_item_keeps_parent() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Café Münster.txt");
        fs::write(&file, "").unwrap();
        let entry = PathEntry::from_path(&file).unwrap();

        let item = RenamePlanItem::for_entry(&entry, NormalizationForm::Composed);

        assert_eq!(item.old(), file);
        assert_eq!(item.new_path().parent(), file.parent());
        assert_eq!(
            item.new_path().file_name().unwrap().to_str().unwrap(),
            "caf\u{e9}_m\u{fc}nster.txt"
        );
        assert!(!item.is_noop());
    }

    #[test]
    fn plan_item_noop_for_converted_name() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "").unwrap();
        let entry = PathEntry::from_path(&file).unwrap();

        let item = RenamePlanItem::for_entry(&entry, NormalizationForm::Decomposed);

        assert!(item.is_noop());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn plan_item_converts_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join(OsStr::from_bytes(b"My Bad\xff File.TXT"));
        fs::write(&file, "").unwrap();
        let entry = PathEntry::from_path(&file).unwrap();

        let item = RenamePlanItem::for_entry(&entry, NormalizationForm::Composed);

        assert!(!item.is_noop());
        assert_eq!(
            item.new_path(),
            tmp.path().join(OsStr::from_bytes(b"my_bad\xff_file.TXT"))
        );
    }

    #[test]
    fn plan_is_deepest_first() {
        let tmp = TempDir::new().unwrap();
        build_tree(tmp.path());
        let collection = collect(&[tmp.path().join("Top Dir")]);

        let plan = RenamePlan::build(&collection.entries, NormalizationForm::Composed);

        let depths: Vec<usize> = plan.items().iter().map(RenamePlanItem::depth).collect();
        let mut sorted = depths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(depths, sorted);
        assert_eq!(plan.items().last().unwrap().old(), tmp.path().join("Top Dir"));
    }

    #[test]
    fn plan_never_orders_ancestor_before_descendant() {
        let tmp = TempDir::new().unwrap();
        build_tree(tmp.path());
        let collection = collect(&[tmp.path().join("Top Dir")]);

        let plan = RenamePlan::build(&collection.entries, NormalizationForm::Composed);

        let items = plan.items();
        for (i, earlier) in items.iter().enumerate() {
            for later in &items[i + 1..] {
                assert!(
                    !later.old().starts_with(earlier.old()),
                    "{} planned after its ancestor {}",
                    later.old().display(),
                    earlier.old().display()
                );
            }
        }
    }

    #[test]
    fn plan_ties_keep_collector_order() {
        let tmp = TempDir::new().unwrap();
        build_tree(tmp.path());
        let top = tmp.path().join("Top Dir");
        let collection = collect(&[&top]);

        let plan = RenamePlan::build(&collection.entries, NormalizationForm::Composed);

        let siblings: Vec<PathBuf> = plan
            .items()
            .iter()
            .filter(|item| item.depth() == collection.entries[0].depth() + 1)
            .map(|item| item.old().to_path_buf())
            .collect();
        assert_eq!(
            siblings,
            vec![
                top.join("Mid Dir"),
                top.join("Side File.txt"),
                top.join("plain.txt"),
            ]
        );
    }

    #[test]
    fn plan_changes_skip_noops() {
        let tmp = TempDir::new().unwrap();
        build_tree(tmp.path());
        let collection = collect(&[tmp.path().join("Top Dir")]);

        let plan = RenamePlan::build(&collection.entries, NormalizationForm::Composed);

        assert_eq!(plan.len(), 5);
        assert_eq!(plan.changes().count(), 4);
        assert_eq!(plan.form(), NormalizationForm::Composed);
    }

    #[test]
    fn plan_reports_collisions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Read Me.txt"), "").unwrap();
        fs::write(tmp.path().join("read_me.txt"), "").unwrap();
        fs::write(tmp.path().join("Other.txt"), "").unwrap();
        let collection = collect(&[tmp.path()]);

        let plan = RenamePlan::build(&collection.entries, NormalizationForm::Composed);
        let collisions = plan.collisions();

        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].target, tmp.path().join("read_me.txt"));
        assert_eq!(collisions[0].sources.len(), 2);
    }

    #[test]
    fn plan_without_collisions() {
        let tmp = TempDir::new().unwrap();
        build_tree(tmp.path());
        let collection = collect(&[tmp.path().join("Top Dir")]);

        let plan = RenamePlan::build(&collection.entries, NormalizationForm::Decomposed);

        assert!(plan.collisions().is_empty());
    }

    #[test]
    fn empty_plan() {
        let plan = RenamePlan::build(&[], NormalizationForm::Composed);
        assert!(plan.is_empty());
        assert!(plan.collisions().is_empty());
    }
}
