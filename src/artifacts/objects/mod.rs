//! Object types and framing
//!
//! All content is stored as objects identified by the SHA-1 hash of their
//! framed byte form `<type> <size>\0<body>`:
//!
//! - **Blob**: raw file content
//! - **Tree**: flat listing of `(mode, path, object id)` records
//! - **Commit**: tree reference, optional parent, author/committer, message

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest accepted object ID abbreviation
pub const MIN_ABBREV_LENGTH: usize = 7;
