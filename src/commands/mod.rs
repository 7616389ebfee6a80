//! Command implementations
//!
//! Every command is an `impl Repository` block writing its output to the
//! repository's writer:
//!
//! - `plumbing`: object-level commands (hash-object, cat-file, ls-tree, write-tree)
//! - `porcelain`: user-facing workflow (init, add, commit)

pub mod plumbing;
pub mod porcelain;
