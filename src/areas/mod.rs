//! Stateful repository areas
//!
//! Everything here owns a piece of on-disk state below the repository root:
//!
//! - `config`: `.git/config`, source of the user identity
//! - `database`: content-addressed object store under `.git/objects`
//! - `index`: staging area at `.git/index`
//! - `lockfile`: exclusive-create plus rename writes for index and refs
//! - `refs`: HEAD and branch refs
//! - `repository`: wires the areas together for the commands
//! - `workspace`: the working tree

pub mod config;
pub mod database;
pub mod index;
pub mod lockfile;
pub mod refs;
pub mod repository;
pub mod workspace;
