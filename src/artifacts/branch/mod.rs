//! Reference names
//!
//! - `branch_name`: symbolic ref paths (`HEAD`, `refs/heads/<name>`) and
//!   validated branch names

pub mod branch_name;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
