//! Index file format
//!
//! The index (staging area) is a bare sequence of records with no header,
//! record count or trailing checksum:
//!
//! ```text
//! <6-char mode> <path>\0<20-byte raw sha1>
//! <6-char mode> <path>\0<20-byte raw sha1>
//! ...
//! ```
//!
//! The mode is always `100644`.

pub mod index_entry;

/// Mode of every staged path: a regular, non-executable file
pub const REGULAR_FILE_MODE: &str = "100644";

/// Width of the mode field in an index record
pub const MODE_SIZE: usize = 6;
