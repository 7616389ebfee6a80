use crate::areas::repository::Repository;
use bytes::Bytes;
use std::io::Write;

impl Repository {
    /// Write the raw body of the named object, whatever its kind.
    pub fn cat_file(&mut self, object_name: &str) -> anyhow::Result<Bytes> {
        let oid = self.resolve_object(object_name)?;
        let (object_type, body) = self.database().get(&oid)?;

        tracing::debug!(%oid, %object_type, size = body.len(), "cat-file");
        self.writer().write_all(&body)?;

        Ok(body)
    }
}
