//! Porcelain commands (user-facing Git operations)
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files for commit
//! - `commit`: Record the staged snapshot on the current branch

pub mod add;
pub mod commit;
pub mod init;
