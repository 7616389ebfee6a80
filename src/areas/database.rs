//! Object database
//!
//! Loose objects live under `.git/objects/<first 2 hex>/<remaining 38 hex>`
//! as zlib-compressed frames `<kind> <len>\0<body>`. Writes are
//! idempotent: an object whose path already exists is never rewritten.

use crate::artifacts::core::codec;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

// TODO: implement packfiles for better performance and storage efficiency
impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Compute the id `body` would have as an object of `object_type`,
    /// without touching the disk.
    pub fn hash(object_type: ObjectType, body: &[u8]) -> ObjectId {
        ObjectId::from_digest(&codec::digest(&frame(object_type, body)))
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Frame, hash and persist a body, returning its id.
    ///
    /// Nothing is written if the object already exists.
    pub fn put(&self, object_type: ObjectType, body: &[u8]) -> anyhow::Result<ObjectId> {
        let framed = frame(object_type, body);
        let object_id = ObjectId::from_digest(&codec::digest(&framed));
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::debug!(oid = %object_id, kind = %object_type, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir)
            .map_err(|e| TwigError::file_write(object_dir, e))?;

        self.write_object(&object_path, &framed)?;
        tracing::debug!(oid = %object_id, kind = %object_type, size = body.len(), "object written");

        Ok(object_id)
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        self.put(object.object_type(), &object.serialize()?)
    }

    /// Load an object, returning its kind and body.
    pub fn get(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = self.read_object(object_id, object_path)?;
        let mut object_reader = Cursor::new(object_content.clone());

        let (object_type, declared_size) = ObjectType::parse_header(&mut object_reader)
            .map_err(|e| TwigError::corrupt(object_id, e.to_string()))?;
        let body = object_content.slice(object_reader.position() as usize..);

        if body.len() != declared_size {
            return Err(TwigError::corrupt(
                object_id,
                format!(
                    "declared length {} does not match body length {}",
                    declared_size,
                    body.len()
                ),
            )
            .into());
        }

        Ok((object_type, body))
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, body) = self.get(object_id)?;
        let reader = Cursor::new(body);

        let object = match object_type {
            ObjectType::Blob => Blob::deserialize(reader).map(|blob| ObjectBox::Blob(Box::new(blob))),
            ObjectType::Tree => Tree::deserialize(reader).map(|tree| ObjectBox::Tree(Box::new(tree))),
            ObjectType::Commit => {
                Commit::deserialize(reader).map(|commit| ObjectBox::Commit(Box::new(commit)))
            }
        };

        object.map_err(|e| TwigError::corrupt(object_id, e.to_string()).into())
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    fn read_object(&self, object_id: &ObjectId, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TwigError::ObjectNotFound(object_id.to_string()).into());
            }
            Err(e) => return Err(TwigError::file_read(object_path, e).into()),
        };

        codec::decompress(&object_content, object_id.as_ref())
    }

    fn write_object(&self, object_path: &Path, object_content: &[u8]) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = codec::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .map_err(|e| TwigError::file_write(&temp_object_path, e))?;

        file.write_all(&object_content)
            .map_err(|e| TwigError::file_write(&temp_object_path, e))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path)
            .map_err(|e| TwigError::file_write(object_path, e))?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with `prefix`.
    ///
    /// Only the fan-out directory named by the first two characters is
    /// listed, so `prefix` must be at least two characters long.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        if prefix.len() < 2 {
            return Ok(matches);
        }

        let dir_name = &prefix[..2];
        let file_prefix = &prefix[2..];
        let dir_path = self.path.join(dir_name);

        if !dir_path.is_dir() {
            return Ok(matches);
        }

        let dir_entries =
            std::fs::read_dir(&dir_path).map_err(|e| TwigError::file_read(&dir_path, e))?;
        for entry in dir_entries {
            let entry = entry.map_err(|e| TwigError::file_read(&dir_path, e))?;
            let file_name = entry.file_name();
            let file_name_str = file_name.to_string_lossy();

            if file_name_str.starts_with(file_prefix) {
                // temp files and other strays never parse as ids
                if let Ok(oid) = ObjectId::try_parse(format!("{}{}", dir_name, file_name_str)) {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }

    /// Expand an abbreviated id to the unique stored object it names.
    ///
    /// Fails with `ObjectNotFound` when the prefix is shorter than seven
    /// characters, is not hexadecimal or matches nothing, and with
    /// `AmbiguousHash` when it matches more than one object.
    pub fn resolve_abbrev(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if !ObjectId::is_valid_abbrev(prefix) {
            return Err(TwigError::ObjectNotFound(prefix.to_string()).into());
        }

        let prefix = prefix.to_ascii_lowercase();
        let mut candidates = self.find_objects_by_prefix(&prefix)?;

        match candidates.len() {
            0 => Err(TwigError::ObjectNotFound(prefix).into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(TwigError::AmbiguousHash { prefix, candidates }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    fn twig_error(err: &anyhow::Error) -> &TwigError {
        err.downcast_ref::<TwigError>()
            .expect("expected a TwigError")
    }

    #[rstest]
    fn put_writes_compressed_frame_at_fan_out_path(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let oid = database.put(ObjectType::Blob, b"hi").unwrap();

        let object_path = database.objects_path().join(oid.to_path());
        let raw = std::fs::read(object_path).unwrap();
        assert_eq!(oid.as_ref(), "32f95c0d1244a78b2be1bab8de17906fabb2c4a8");
        assert_eq!(
            codec::decompress(&raw, "test").unwrap().as_ref(),
            b"blob 2\0hi"
        );
    }

    #[rstest]
    fn put_is_idempotent(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let first = database.put(ObjectType::Blob, b"same").unwrap();
        let second = database.put(ObjectType::Blob, b"same").unwrap();

        let fan_out = database.objects_path().join(&first.as_ref()[..2]);
        let files = std::fs::read_dir(fan_out).unwrap().count();
        assert_eq!(first, second);
        assert_eq!(files, 1);
    }

    #[rstest]
    #[case(ObjectType::Blob, b"".as_slice())]
    #[case(ObjectType::Blob, b"\0binary\xff".as_slice())]
    #[case(ObjectType::Tree, b"".as_slice())]
    #[case(ObjectType::Commit, b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\nmsg".as_slice())]
    fn get_returns_what_put_stored(
        objects_dir: TempDir,
        #[case] object_type: ObjectType,
        #[case] body: &[u8],
    ) {
        let database = database(&objects_dir);

        let oid = database.put(object_type, body).unwrap();

        assert_eq!(database.get(&oid).unwrap(), (object_type, Bytes::copy_from_slice(body)));
    }

    #[rstest]
    fn get_missing_object_is_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = Database::hash(ObjectType::Blob, b"never stored");

        let err = database.get(&oid).unwrap_err();

        assert!(matches!(twig_error(&err), TwigError::ObjectNotFound(_)));
    }

    #[rstest]
    #[case(b"blob 5\0hi".as_slice())]
    #[case(b"blob 2 hi".as_slice())]
    #[case(b"tag 2\0hi".as_slice())]
    fn malformed_frames_are_corrupt(objects_dir: TempDir, #[case] frame_bytes: &[u8]) {
        let database = database(&objects_dir);
        let oid = Database::hash(ObjectType::Blob, b"placeholder");
        let object_path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        std::fs::write(&object_path, codec::compress(frame_bytes).unwrap()).unwrap();

        let err = database.get(&oid).unwrap_err();

        assert!(matches!(twig_error(&err), TwigError::CorruptObject { .. }));
    }

    #[rstest]
    fn undecompressable_object_is_corrupt(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = Database::hash(ObjectType::Blob, b"placeholder");
        let object_path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        std::fs::write(&object_path, b"not zlib at all").unwrap();

        let err = database.get(&oid).unwrap_err();

        assert!(matches!(twig_error(&err), TwigError::CorruptObject { .. }));
    }

    #[rstest]
    fn seven_char_prefix_resolves_unique_object(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put(ObjectType::Blob, b"hi").unwrap();
        database.put(ObjectType::Blob, b"other").unwrap();

        assert_eq!(database.resolve_abbrev(&oid.to_short_oid()).unwrap(), oid);
        assert_eq!(
            database.resolve_abbrev(&oid.to_short_oid().to_uppercase()).unwrap(),
            oid
        );
    }

    #[rstest]
    fn short_prefix_is_rejected(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put(ObjectType::Blob, b"hi").unwrap();

        let err = database.resolve_abbrev(&oid.as_ref()[..6]).unwrap_err();

        assert!(matches!(twig_error(&err), TwigError::ObjectNotFound(_)));
    }

    #[rstest]
    fn unknown_prefix_is_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        database.put(ObjectType::Blob, b"hi").unwrap();

        let err = database.resolve_abbrev("0000000").unwrap_err();

        assert!(matches!(twig_error(&err), TwigError::ObjectNotFound(_)));
    }

    #[rstest]
    fn shared_prefix_is_ambiguous(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let fan_out = database.objects_path().join("ab");
        std::fs::create_dir_all(&fan_out).unwrap();
        std::fs::write(fan_out.join(format!("cdef0{}", "1".repeat(33))), b"").unwrap();
        std::fs::write(fan_out.join(format!("cdef0{}", "2".repeat(33))), b"").unwrap();

        let err = database.resolve_abbrev("abcdef0").unwrap_err();

        match twig_error(&err) {
            TwigError::AmbiguousHash { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn stored_bodies_round_trip(body in proptest::collection::vec(any::<u8>(), 0..256)) {
            let dir = TempDir::new().unwrap();
            let database = database(&dir);

            let first = database.put(ObjectType::Blob, &body).unwrap();
            let second = database.put(ObjectType::Blob, &body).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(database.get(&first).unwrap(), (ObjectType::Blob, Bytes::from(body)));
        }
    }
}
