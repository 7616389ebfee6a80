//! Error taxonomy
//!
//! Every operation returns `anyhow::Result`; the variants below are raised
//! into `anyhow::Error` and can be recovered with
//! `error.downcast_ref::<TwigError>()`, even beneath `.context(...)` layers.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TwigError {
    #[error("unable to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("object {0} not found")]
    ObjectNotFound(String),

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("short object ID {prefix} is ambiguous, candidates: {}", .candidates.iter().map(ObjectId::to_string).collect::<Vec<_>>().join(", "))]
    AmbiguousHash {
        prefix: String,
        candidates: Vec<ObjectId>,
    },

    #[error("nothing to commit, the index is empty")]
    NothingToCommit,

    #[error("user identity is not configured: {0}")]
    ConfigMissing(String),

    #[error("unable to create {0}: lock file already exists")]
    Locked(PathBuf),
}

impl TwigError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TwigError::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TwigError::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(oid: impl ToString, reason: impl Into<String>) -> Self {
        TwigError::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }
}
