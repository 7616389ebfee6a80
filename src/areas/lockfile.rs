//! Exclusive writers for mutable repository files
//!
//! The index and ref files are rewritten wholesale. A writer first creates
//! `<file>.lock` with exclusive-create semantics, writes the new content
//! there and renames it over the target. A concurrent writer fails fast
//! with `Locked` instead of interleaving a read-modify-write cycle.

use crate::errors::TwigError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const LOCK_SUFFIX: &str = "lock";

#[derive(Debug)]
pub struct Lockfile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
}

impl Lockfile {
    /// Take the lock for `target`, creating its parent directory if needed.
    pub fn hold_for_update(target: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TwigError::file_write(parent, e))?;
        }

        let lock_path = target.with_extension(match target.extension() {
            Some(ext) => format!("{}.{LOCK_SUFFIX}", ext.to_string_lossy()),
            None => LOCK_SUFFIX.to_string(),
        });

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => TwigError::Locked(lock_path.clone()),
                _ => TwigError::file_write(&lock_path, e),
            })?;

        Ok(Lockfile {
            target: target.to_path_buf(),
            lock_path,
            file: Some(file),
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("lock on {} is not held", self.target.display()))?;

        file.write_all(data)
            .map_err(|e| TwigError::file_write(&self.lock_path, e))?;

        Ok(())
    }

    /// Flush the new content and atomically move it over the target.
    pub fn commit(mut self) -> anyhow::Result<()> {
        let file = self
            .file
            .take()
            .ok_or_else(|| anyhow::anyhow!("lock on {} is not held", self.target.display()))?;

        file.sync_all()
            .map_err(|e| TwigError::file_write(&self.lock_path, e))?;
        drop(file);

        std::fs::rename(&self.lock_path, &self.target)
            .map_err(|e| TwigError::file_write(&self.target, e))?;

        Ok(())
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        // an uncommitted lock leaves the target untouched
        if self.file.take().is_some() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[rstest]
    fn commit_replaces_target_and_releases_lock(dir: TempDir) {
        let target = dir.path().join("index");
        std::fs::write(&target, b"old").unwrap();

        let mut lock = Lockfile::hold_for_update(&target).unwrap();
        let lock_path = lock.lock_path().to_path_buf();
        lock.write(b"new").unwrap();
        lock.commit().unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert!(!lock_path.exists());
    }

    #[rstest]
    fn second_writer_is_refused(dir: TempDir) {
        let target = dir.path().join("refs").join("heads").join("main");

        let _held = Lockfile::hold_for_update(&target).unwrap();
        let err = Lockfile::hold_for_update(&target).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TwigError>(),
            Some(TwigError::Locked(_))
        ));
    }

    #[rstest]
    fn dropped_lock_leaves_target_untouched(dir: TempDir) {
        let target = dir.path().join("HEAD");
        std::fs::write(&target, b"ref: refs/heads/main\n").unwrap();

        {
            let mut lock = Lockfile::hold_for_update(&target).unwrap();
            lock.write(b"garbage").unwrap();
        }

        assert_eq!(std::fs::read(&target).unwrap(), b"ref: refs/heads/main\n");
        assert!(Lockfile::hold_for_update(&target).is_ok());
    }
}
