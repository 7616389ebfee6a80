//! Index entry representation
//!
//! Each record ties a repository-relative path (always `/`-separated) to
//! the blob holding its staged content.

use crate::artifacts::core::codec::DIGEST_SIZE;
use crate::artifacts::index::{MODE_SIZE, REGULAR_FILE_MODE};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: String,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
}

impl IndexEntry {
    /// Decode one record starting at `offset`.
    ///
    /// Returns the entry and the offset just past it, or `None` if the
    /// remaining bytes do not hold a complete record.
    pub fn parse_at(data: &[u8], offset: usize) -> Option<(Self, usize)> {
        let path_start = offset + MODE_SIZE + 1;
        if path_start > data.len() {
            return None;
        }

        let path_len = data[path_start..].iter().position(|&b| b == 0)?;
        let oid_start = path_start + path_len + 1;
        let oid_end = oid_start + DIGEST_SIZE;
        if oid_end > data.len() {
            return None;
        }

        let name = String::from_utf8_lossy(&data[path_start..path_start + path_len]).to_string();
        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&data[oid_start..oid_end]);

        Some((IndexEntry::new(name, ObjectId::from_digest(&digest)), oid_end))
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        if self.name.is_empty() || self.name.contains('\0') {
            anyhow::bail!("Invalid entry name {:?}", self.name);
        }

        let mut entry_bytes = Vec::new();
        write!(entry_bytes, "{} {}", REGULAR_FILE_MODE, self.name)?;
        entry_bytes.push(0);
        self.oid.write_h40_to(&mut entry_bytes)?;

        Ok(Bytes::from(entry_bytes))
    }
}
