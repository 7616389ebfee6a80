//! Staging index
//!
//! The index maps repository-relative paths to the blob ids staged for the
//! next commit. It is the only mutable state besides the refs: it grows
//! with every `add` and is emptied after a successful commit.
//!
//! Reading is tolerant. Parsing stops at the first truncated record and
//! keeps every complete record before it.

use crate::areas::lockfile::Lockfile;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::collections::BTreeMap;
use std::io::Read;
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Staged blob ids keyed by path
    entries: BTreeMap<String, ObjectId>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop every staged entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load the index from disk, replacing the in-memory entries.
    ///
    /// A missing index file loads as an empty index.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file =
            std::fs::File::open(&self.path).map_err(|e| TwigError::file_read(self.path(), e))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)
            .map_err(|e| TwigError::file_read(self.path(), e))?;

        let mut data = Vec::new();
        lock.deref_mut()
            .read_to_end(&mut data)
            .map_err(|e| TwigError::file_read(self.path(), e))?;

        self.entries = Self::parse(&data);
        tracing::debug!(entries = self.entries.len(), "index loaded");

        Ok(())
    }

    /// Decode index bytes, stopping quietly at a truncated trailing record.
    pub fn parse(data: &[u8]) -> BTreeMap<String, ObjectId> {
        let mut entries = BTreeMap::new();
        let mut offset = 0;

        while offset < data.len() {
            match IndexEntry::parse_at(data, offset) {
                Some((entry, next)) => {
                    entries.insert(entry.name, entry.oid);
                    offset = next;
                }
                None => {
                    tracing::debug!(offset, "ignoring truncated index record");
                    break;
                }
            }
        }

        entries
    }

    /// Encode entries in path order.
    pub fn serialize(entries: &BTreeMap<String, ObjectId>) -> anyhow::Result<Vec<u8>> {
        let mut data = Vec::new();

        for (name, oid) in entries {
            let entry = IndexEntry::new(name.clone(), oid.clone());
            data.extend_from_slice(&entry.serialize()?);
        }

        Ok(data)
    }

    /// Stage `entry`, replacing any earlier entry for the same path.
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.name, entry.oid);
    }

    /// Take `index.lock`, then load the index.
    ///
    /// The returned lock must be handed to [`Index::write_updates`]; dropping
    /// it releases the index unchanged. A second writer fails with `Locked`
    /// until then.
    pub fn load_for_update(&mut self) -> anyhow::Result<Lockfile> {
        let lock = Lockfile::hold_for_update(&self.path)?;
        self.rehydrate()?;

        Ok(lock)
    }

    /// Overwrite the index file with the in-memory entries through `lock`.
    pub fn write_updates(&mut self, mut lock: Lockfile) -> anyhow::Result<()> {
        let data = Self::serialize(&self.entries)?;

        lock.write(&data)?;
        lock.commit()?;

        tracing::debug!(entries = self.entries.len(), "index written");
        Ok(())
    }

    pub fn entries(&self) -> &BTreeMap<String, ObjectId> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
