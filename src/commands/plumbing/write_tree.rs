use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::collections::BTreeMap;
use std::io::Write;

impl Repository {
    /// Snapshot the files of the working tree as blobs plus one flat tree.
    pub fn write_tree(&mut self) -> anyhow::Result<ObjectId> {
        let mut entries = BTreeMap::new();

        for path in self.workspace().list_files(None)? {
            let blob = self.workspace().parse_blob(&path)?;
            let blob_id = self.database().store(&blob)?;
            entries.insert(path, blob_id);
        }

        let tree_id = self.store_tree(&entries)?;
        writeln!(self.writer(), "{tree_id}")?;

        Ok(tree_id)
    }

    /// Build the tree of the currently staged entries.
    pub async fn write_tree_from_index(&mut self) -> anyhow::Result<ObjectId> {
        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        let tree_id = self.store_tree(index.entries())?;
        writeln!(self.writer(), "{tree_id}")?;

        Ok(tree_id)
    }

    pub(crate) fn store_tree(&self, entries: &BTreeMap<String, ObjectId>) -> anyhow::Result<ObjectId> {
        let tree = Tree::build(entries)?;
        let tree_id = self.database().store(&tree)?;

        tracing::debug!(%tree_id, entries = tree.len(), "tree stored");
        Ok(tree_id)
    }
}
