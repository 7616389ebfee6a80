use crate::artifacts::objects::blob::Blob;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

/// The working tree rooted at the repository directory
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_blob(&self, file_path: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Repository-relative, `/`-separated paths of every file below
    /// `root_file_path` (the whole working tree when `None`), sorted.
    ///
    /// A file argument yields just that file. `.git` is never listed.
    pub fn list_files(&self, root_file_path: Option<&Path>) -> anyhow::Result<Vec<String>> {
        let root_file_path = match root_file_path {
            Some(p) => std::fs::canonicalize(p).map_err(|e| TwigError::file_read(p, e))?,
            None => self.path.to_path_buf(),
        };

        if root_file_path.is_file() {
            return Ok(vec![self.relative_path(&root_file_path)?]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root_file_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let path = entry.path();
                !Self::is_ignored(path.strip_prefix(&root_file_path).unwrap_or(path))
            })
        {
            let entry = entry.with_context(|| {
                format!("failed to walk working tree at {}", root_file_path.display())
            })?;

            if entry.file_type().is_file() {
                files.push(self.relative_path(entry.path())?);
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn read_file(&self, file_path: &str) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = std::fs::read(&file_path).map_err(|e| TwigError::file_read(&file_path, e))?;

        Ok(Bytes::from(content))
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()),
            _ => false,
        })
    }

    fn relative_path(&self, path: &Path) -> anyhow::Result<String> {
        let relative: PathBuf = path
            .strip_prefix(self.path.as_ref())
            .with_context(|| {
                format!(
                    "{} is outside the repository at {}",
                    path.display(),
                    self.path.display()
                )
            })?
            .to_path_buf();

        if Self::is_ignored(&relative) {
            anyhow::bail!("{} is inside the git directory", path.display());
        }

        let parts = relative
            .components()
            .map(|component| {
                component
                    .as_os_str()
                    .to_str()
                    .with_context(|| format!("path is not valid UTF-8: {}", relative.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        if parts.is_empty() {
            anyhow::bail!("{} is not a file", path.display());
        }

        Ok(parts.join("/"))
    }
}
