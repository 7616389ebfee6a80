//! Git data structures and algorithms
//!
//! - `branch`: ref and branch names
//! - `core`: hashing and zlib codec
//! - `diff`: flat tree diff and change counts
//! - `index`: index record layout
//! - `objects`: object ids, framing and the blob, tree and commit kinds

pub mod branch;
pub mod core;
pub mod diff;
pub mod index;
pub mod objects;
