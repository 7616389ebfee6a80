use crate::areas::repository::Repository;
use crate::artifacts::diff::tree_diff::{DiffStat, TreeDiff, TreeEntryMap};
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    /// Record the staged snapshot on top of HEAD and empty the index.
    ///
    /// Prints `[<branch> (root-commit)? <short id>] <subject>`, the change
    /// summary and the full commit id.
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<ObjectId> {
        let head = self.refs().resolve_head()?;
        let parent = head.parent().cloned();

        if let Some(parent) = &parent {
            if !self.database().contains(parent) {
                return Err(TwigError::ObjectNotFound(parent.to_string()).into());
            }
        }

        let index = self.index();
        let mut index = index.lock().await;

        // Hold index.lock until the emptied index is written back
        let lock = index.load_for_update()?;

        if index.is_empty() {
            return Err(TwigError::NothingToCommit.into());
        }

        let author = Author::load(&self.config()?)?;
        let tree_id = self.store_tree(index.entries())?;

        let commit = Commit::new(parent.clone(), tree_id.clone(), author, message.to_string());
        let commit_id = self.database().store(&commit)?;

        let stat = match &parent {
            Some(parent) => self.diff_against_parent(parent, &tree_id)?,
            None => DiffStat {
                insertions: index.len(),
                deletions: 0,
            },
        };

        self.refs().update_ref(&head.target_ref(), &commit_id)?;

        index.clear();
        index.write_updates(lock)?;

        tracing::info!(%commit_id, parent = ?parent, %tree_id, "commit created");

        let is_root = match parent {
            Some(_) => "",
            None => "(root-commit) ",
        };
        writeln!(
            self.writer(),
            "[{} {}{}] {}",
            head.label(),
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;
        if commit.parent().is_some() {
            writeln!(self.writer(), "{stat}")?;
        } else {
            writeln!(self.writer(), "{} insertions(+)", stat.insertions)?;
        }
        writeln!(self.writer(), "{commit_id}")?;

        Ok(commit_id)
    }

    /// Change counts between the parent's tree and `tree_id`.
    ///
    /// An unreadable parent commit or parent tree only degrades the summary:
    /// the diff falls back to an empty old tree.
    fn diff_against_parent(&self, parent: &ObjectId, tree_id: &ObjectId) -> anyhow::Result<DiffStat> {
        let mut diff = TreeDiff::new(self.database());

        let old_entries = match self.parent_tree_entries(&diff, parent) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(%parent, error = %e, "cannot read parent tree, diffing against an empty tree");
                TreeEntryMap::new()
            }
        };
        let new_entries = diff.tree_entries(tree_id)?;

        diff.compare(&old_entries, &new_entries);
        Ok(diff.stat())
    }

    fn parent_tree_entries(&self, diff: &TreeDiff, parent: &ObjectId) -> anyhow::Result<TreeEntryMap> {
        let (_, body) = self.database().get(parent)?;
        let tree_oid = Commit::extract_tree_oid(&body)
            .ok_or_else(|| anyhow::anyhow!("commit {parent} has no tree line"))?;

        diff.tree_entries(&tree_oid)
    }
}
