//! A minimal content-addressable object store and commit pipeline
//!
//! `twig` stores blobs, trees and commits in a Git-compatible loose object
//! format, stages file content in a compact index and chains commits into
//! history through a single current-branch reference.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
