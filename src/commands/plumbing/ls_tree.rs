use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::tree::TreeEntry;
use std::io::Write;

impl Repository {
    /// List a tree's entries. A commit lists the tree it points at.
    pub fn ls_tree(&mut self, object_name: &str, name_only: bool) -> anyhow::Result<Vec<TreeEntry>> {
        let oid = self.resolve_object(object_name)?;

        let tree = match self.database().parse_object(&oid)? {
            ObjectBox::Tree(tree) => *tree,
            ObjectBox::Commit(commit) => self
                .database()
                .parse_object_as_tree(commit.tree_oid())?
                .ok_or_else(|| anyhow::anyhow!("commit {oid} does not point at a tree"))?,
            ObjectBox::Blob(_) => anyhow::bail!("{object_name} is not a tree object"),
        };

        if name_only {
            for entry in tree.entries() {
                writeln!(self.writer(), "{}", entry.path)?;
            }
        } else if !tree.is_empty() {
            writeln!(self.writer(), "{}", tree.display())?;
        }

        Ok(tree.into_entries().collect())
    }
}
