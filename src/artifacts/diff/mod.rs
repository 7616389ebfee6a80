//! Tree comparison
//!
//! - `tree_diff`: compares two flat trees and tallies insertions/deletions

pub mod tree_diff;
