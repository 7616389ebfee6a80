use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::io::Write;

impl Repository {
    pub fn hash_object(&mut self, object_path: &str, write: bool) -> anyhow::Result<ObjectId> {
        let data = self.workspace().read_file(object_path)?;

        let object_id = self.hash_blob(data, write)?;
        writeln!(self.writer(), "{object_id}")?;

        Ok(object_id)
    }

    /// Id of `data` as a blob; the blob is persisted only when `write` is set.
    pub fn hash_blob(&self, data: Bytes, write: bool) -> anyhow::Result<ObjectId> {
        let blob = Blob::new(data);

        if write {
            self.database().store(&blob)
        } else {
            blob.object_id()
        }
    }
}
