use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use std::io::Write;

impl Repository {
    /// Stage files. Directories expand to every file below them; relative
    /// paths are taken from the repository root.
    ///
    /// All paths are resolved before anything is written, so a missing
    /// path leaves the index untouched. A concurrent writer holding
    /// `index.lock` makes this fail with `Locked`.
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        // Hold index.lock across the whole read-modify-write
        let lock = index.load_for_update()?;

        // Iterate over each provided file path and expand it if it's a directory
        let paths = paths
            .iter()
            .map(|path| {
                let path = self.workspace().path().join(path);
                self.workspace().list_files(Some(&path))
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten();

        for path in paths {
            let blob = self.workspace().parse_blob(&path)?;
            let blob_id = self.database().store(&blob)?;

            tracing::debug!(%path, %blob_id, "staged");
            writeln!(self.writer(), "Added {path}")?;
            index.add(IndexEntry::new(path, blob_id));
        }

        index.write_updates(lock)?;

        Ok(())
    }
}
