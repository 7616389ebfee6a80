//! References (HEAD and branches)
//!
//! A ref is a small text file naming a commit. HEAD is either symbolic,
//! `ref: refs/heads/<branch>`, or detached and holding a commit id directly.
//!
//! ## File Format
//!
//! - Branch refs hold a 40-character hex id followed by a newline
//! - HEAD holds `ref: <path>\n` or a raw id
//!
//! Writes go through a [`Lockfile`], so a ref is never observed half-written.

use crate::areas::lockfile::Lockfile;
use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Upper bound on `ref:` indirections followed before giving up
const MAX_SYMREF_DEPTH: usize = 5;

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef { sym_ref_name: SymRefName },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TwigError::file_read(path, e).into()),
        };
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }))
        } else {
            let oid = ObjectId::try_parse(content.to_string())
                .map_err(|e| TwigError::corrupt(path.display(), e.to_string()))?;
            Ok(Some(SymRefOrOid::Oid(oid)))
        }
    }
}

/// Where HEAD currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD redirects to a branch ref; `oid` is `None` until its first commit
    Branch {
        ref_name: SymRefName,
        oid: Option<ObjectId>,
    },
    /// HEAD holds a commit id directly
    Detached(ObjectId),
}

impl HeadState {
    /// The ref file a new commit is written to.
    pub fn target_ref(&self) -> SymRefName {
        match self {
            HeadState::Branch { ref_name, .. } => ref_name.clone(),
            HeadState::Detached(_) => SymRefName::head(),
        }
    }

    /// The commit the next commit builds on.
    pub fn parent(&self) -> Option<&ObjectId> {
        match self {
            HeadState::Branch { oid, .. } => oid.as_ref(),
            HeadState::Detached(oid) => Some(oid),
        }
    }

    /// Human-readable label used in commit output
    pub fn label(&self) -> String {
        match self {
            HeadState::Branch { ref_name, .. } => ref_name
                .branch_name()
                .unwrap_or(ref_name.as_ref_path())
                .to_string(),
            HeadState::Detached(_) => "detached HEAD".to_string(),
        }
    }
}

impl Refs {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(SymRefName::head().as_ref_path())
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    /// Point HEAD at `branch` without touching the branch ref itself.
    pub fn set_head(&self, branch: &BranchName) -> anyhow::Result<()> {
        let target = branch.to_sym_ref_name();
        self.write_ref_file(&self.head_path(), &format!("ref: {target}\n"))?;

        tracing::debug!(head = %target, "HEAD set");
        Ok(())
    }

    /// Resolve HEAD to the ref that will receive the next commit and its
    /// current commit id.
    ///
    /// Symbolic refs are followed until a ref holding an id, or a ref file
    /// that does not exist yet (an unborn branch), is reached.
    pub fn resolve_head(&self) -> anyhow::Result<HeadState> {
        let head_path = self.head_path();
        let mut current = match SymRefOrOid::read_symref_or_oid(&head_path)? {
            Some(SymRefOrOid::Oid(oid)) => return Ok(HeadState::Detached(oid)),
            Some(SymRefOrOid::SymRef { sym_ref_name }) => sym_ref_name,
            None => {
                return Err(TwigError::file_read(
                    head_path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "HEAD is missing or empty"),
                )
                .into());
            }
        };

        for _ in 0..MAX_SYMREF_DEPTH {
            let ref_path = self.path.join(current.as_ref_path());

            match SymRefOrOid::read_symref_or_oid(&ref_path)? {
                Some(SymRefOrOid::SymRef { sym_ref_name }) => current = sym_ref_name,
                Some(SymRefOrOid::Oid(oid)) => {
                    tracing::debug!(ref_name = %current, %oid, "HEAD resolved");
                    return Ok(HeadState::Branch {
                        ref_name: current,
                        oid: Some(oid),
                    });
                }
                None => {
                    tracing::debug!(ref_name = %current, "HEAD points at an unborn branch");
                    return Ok(HeadState::Branch {
                        ref_name: current,
                        oid: None,
                    });
                }
            }
        }

        anyhow::bail!("too many levels of symbolic refs starting at HEAD")
    }

    /// Commit id HEAD ultimately points at, if any.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        Ok(self.resolve_head()?.parent().cloned())
    }

    /// Overwrite `ref_name` with `oid`, creating missing directories.
    pub fn update_ref(&self, ref_name: &SymRefName, oid: &ObjectId) -> anyhow::Result<()> {
        let ref_path = self.path.join(ref_name.as_ref_path());
        self.write_ref_file(&ref_path, &format!("{oid}\n"))?;

        tracing::info!(ref_name = %ref_name, %oid, "ref updated");
        Ok(())
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let mut lock = Lockfile::hold_for_update(path)?;
        lock.write(content.as_bytes())?;
        lock.commit()
    }
}
