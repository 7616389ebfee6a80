//! Tree object
//!
//! A tree is one flat snapshot of the staged path set: nested paths such
//! as `a/b.txt` are kept as literal entry names and no intermediate
//! subtree objects are materialised.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <path>\0<20-byte-sha1>`
//!
//! Entries are ordered by comparing their rendered records as raw bytes,
//! so the same path set always hashes to the same tree.

use crate::artifacts::index::REGULAR_FILE_MODE;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Mode used by directory entries written by other tools
const DIRECTORY_MODE: &str = "40000";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: String,
    pub path: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Render the entry as `<mode> <path>\0<20-byte hash>`.
    pub fn to_record(&self) -> anyhow::Result<Vec<u8>> {
        let mut record = Vec::new();
        write!(record, "{} {}", self.mode, self.path)?;
        record.push(0);
        self.oid.write_h40_to(&mut record)?;

        Ok(record)
    }

    pub fn object_type(&self) -> ObjectType {
        if self.mode == DIRECTORY_MODE {
            ObjectType::Tree
        } else {
            ObjectType::Blob
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a flat tree from `path -> blob id` pairs.
    ///
    /// Every entry gets the regular file mode. Insertion order does not
    /// matter; the records are sorted as raw bytes.
    pub fn build<'e>(
        entries: impl IntoIterator<Item = (&'e String, &'e ObjectId)>,
    ) -> anyhow::Result<Self> {
        let mut records = entries
            .into_iter()
            .map(|(path, oid)| {
                if path.is_empty() || path.contains('\0') {
                    anyhow::bail!("invalid tree entry path {path:?}");
                }

                let entry = TreeEntry::new(REGULAR_FILE_MODE.to_string(), path.clone(), oid.clone());
                Ok((entry.to_record()?, entry))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        records.sort_by(|(left, _), (right, _)| left.cmp(right));

        Ok(Tree {
            entries: records.into_iter().map(|(_, entry)| entry).collect(),
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flat `path -> object id` view used when comparing trees
    pub fn path_map(&self) -> BTreeMap<String, ObjectId> {
        self.entries
            .iter()
            .map(|entry| (entry.path.clone(), entry.oid.clone()))
            .collect()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = Vec::new();

        for entry in &self.entries {
            content.extend(entry.to_record()?);
        }

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut path_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(anyhow::anyhow!("unexpected EOF in mode"));
            }
            let mode = std::str::from_utf8(&mode_bytes)?.to_owned();

            // Read "path\0"
            path_bytes.clear();
            let n = reader.read_until(b'\0', &mut path_bytes)?;
            if n == 0 || path_bytes.pop() != Some(b'\0') {
                return Err(anyhow::anyhow!("unexpected EOF in path"));
            }
            let path = std::str::from_utf8(&path_bytes)?.to_owned();

            let oid =
                ObjectId::read_h40_from(&mut reader).context("unexpected EOF in object id")?;

            entries.push(TreeEntry::new(mode, path, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

impl Tree {
    /// One `<mode> <kind> <id>\t<path>` line per entry.
    pub fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode,
                    entry.object_type(),
                    entry.oid,
                    entry.path
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn oid(hex: &str) -> ObjectId {
        ObjectId::try_parse(hex.to_string()).unwrap()
    }

    #[test]
    fn single_entry_tree_matches_git() {
        let entries = BTreeMap::from([(
            "a.txt".to_string(),
            oid("32f95c0d1244a78b2be1bab8de17906fabb2c4a8"),
        )]);

        let tree = Tree::build(&entries).unwrap();

        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "959186c87f11cedbc03fb0aa728575ce3dbf3335"
        );
    }

    #[test]
    fn empty_tree_is_the_well_known_empty_tree() {
        let tree = Tree::build(&BTreeMap::<String, ObjectId>::new()).unwrap();

        assert!(tree.is_empty());
        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn nested_paths_stay_flat_and_sorted() {
        let entries = vec![
            (
                "b/c.txt".to_string(),
                oid("64c5e5885a4b06010b3a0c20edb7900dd0311025"),
            ),
            (
                "a.txt".to_string(),
                oid("43dd47ea691c90a5fa7827892c70241913351963"),
            ),
        ];

        let tree = Tree::build(entries.iter().map(|(path, oid)| (path, oid))).unwrap();

        let paths = tree.entries().map(|entry| entry.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, vec!["a.txt", "b/c.txt"]);
        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "c202ee985fd147eb1575c2860c4d17a8ca574bb0"
        );
    }

    #[test]
    fn body_parses_back_into_the_same_entries() {
        let entries = BTreeMap::from([
            ("x".to_string(), oid("43dd47ea691c90a5fa7827892c70241913351963")),
            ("x.y".to_string(), oid("64c5e5885a4b06010b3a0c20edb7900dd0311025")),
        ]);
        let tree = Tree::build(&entries).unwrap();

        let body = tree.serialize().unwrap();
        let parsed = Tree::deserialize(std::io::Cursor::new(body)).unwrap();

        assert_eq!(parsed, tree);
        assert_eq!(parsed.path_map(), entries);
    }

    #[test]
    fn truncated_body_is_rejected() {
        let entries = BTreeMap::from([(
            "a.txt".to_string(),
            oid("32f95c0d1244a78b2be1bab8de17906fabb2c4a8"),
        )]);
        let body = Tree::build(&entries).unwrap().serialize().unwrap();

        let truncated = body.slice(..body.len() - 3);
        assert!(Tree::deserialize(std::io::Cursor::new(truncated)).is_err());
    }

    #[test]
    fn display_lists_mode_kind_id_and_path() {
        let entries = BTreeMap::from([(
            "a.txt".to_string(),
            oid("32f95c0d1244a78b2be1bab8de17906fabb2c4a8"),
        )]);

        assert_eq!(
            Tree::build(&entries).unwrap().display(),
            "100644 blob 32f95c0d1244a78b2be1bab8de17906fabb2c4a8\ta.txt"
        );
    }

    proptest! {
        #[test]
        fn tree_id_ignores_insertion_order(
            entries in proptest::collection::btree_map("[a-z]{1,4}(/[a-z.]{1,4})?", "[0-9a-f]{40}", 0..12)
        ) {
            let entries = entries
                .into_iter()
                .map(|(path, hex)| (path, oid(&hex)))
                .collect::<Vec<_>>();
            let mut reversed = entries.clone();
            reversed.reverse();

            let forward = Tree::build(entries.iter().map(|(p, o)| (p, o))).unwrap();
            let backward = Tree::build(reversed.iter().map(|(p, o)| (p, o))).unwrap();

            prop_assert_eq!(forward.object_id().unwrap(), backward.object_id().unwrap());
        }
    }
}
