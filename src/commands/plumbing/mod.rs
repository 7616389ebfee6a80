//! Plumbing commands (low-level Git operations)
//!
//! Direct access to the object store, used for scripting and as building
//! blocks for the porcelain commands.
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob id and optionally store the blob
//! - `cat-file`: Print the body of any object
//! - `ls-tree`: List the entries of a tree (or of a commit's tree)
//! - `write-tree`: Snapshot the working tree or the index as a tree

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
pub mod write_tree;
