use crate::areas::database::Database;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum TreeChangeType {
    Added(ObjectId),
    Deleted(ObjectId),
    Modified { old: ObjectId, new: ObjectId },
}

impl TreeChangeType {
    pub fn from_entries(old: Option<&ObjectId>, new: Option<&ObjectId>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChangeType::Added(new.clone())),
            (Some(old), None) => Some(TreeChangeType::Deleted(old.clone())),
            (Some(old), Some(new)) if old != new => Some(TreeChangeType::Modified {
                old: old.clone(),
                new: new.clone(),
            }),
            _ => None, // No change or both are None
        }
    }
}

pub type ChangeSet = BTreeMap<String, TreeChangeType>;
pub type TreeEntryMap = BTreeMap<String, ObjectId>;

/// Aggregate line-free change counts.
///
/// A modified path counts once as an insertion and once as a deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub insertions: usize,
    pub deletions: usize,
}

impl std::fmt::Display for DiffStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} insertions(+), {} deletions(-)",
            self.insertions, self.deletions
        )
    }
}

#[derive(Debug)]
pub struct TreeDiff<'r> {
    database: &'r Database,
    change_set: ChangeSet,
}

impl<'r> TreeDiff<'r> {
    pub fn new(database: &'r Database) -> Self {
        TreeDiff {
            database,
            change_set: BTreeMap::new(),
        }
    }

    /// Record the changes turning `old` into `new`.
    pub fn compare(&mut self, old: &TreeEntryMap, new: &TreeEntryMap) {
        self.change_set.extend(compare_entries(old, new));
    }

    pub fn stat(&self) -> DiffStat {
        summarize(&self.change_set)
    }

    /// Flat entries of a tree, or of the tree a commit records.
    pub fn tree_entries(&self, oid: &ObjectId) -> anyhow::Result<TreeEntryMap> {
        match self.database.parse_object(oid)? {
            ObjectBox::Tree(tree) => Ok(tree.path_map()),
            ObjectBox::Commit(commit) => self.tree_entries(commit.tree_oid()),
            ObjectBox::Blob(_) => Err(anyhow::anyhow!("object {} is not a tree", oid)),
        }
    }
}

/// Classify every path present on either side.
pub fn compare_entries(old: &TreeEntryMap, new: &TreeEntryMap) -> ChangeSet {
    old.keys()
        .chain(new.keys())
        .filter_map(|path| {
            TreeChangeType::from_entries(old.get(path), new.get(path))
                .map(|change| (path.clone(), change))
        })
        .collect()
}

pub fn summarize(change_set: &ChangeSet) -> DiffStat {
    change_set
        .values()
        .fold(DiffStat::default(), |mut stat, change| {
            match change {
                TreeChangeType::Added(_) => stat.insertions += 1,
                TreeChangeType::Deleted(_) => stat.deletions += 1,
                TreeChangeType::Modified { .. } => {
                    stat.insertions += 1;
                    stat.deletions += 1;
                }
            }
            stat
        })
}
