#![allow(dead_code)]

pub mod command;
pub mod file;

/// Commit fixture identity and date shared by the commit tests
pub const AUTHOR_NAME: &str = "A U Thor";
pub const AUTHOR_EMAIL: &str = "author@example.com";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000"; // %Y-%m-%d %H:%M:%S %z

/// blob "hi"
pub const HI_BLOB: &str = "32f95c0d1244a78b2be1bab8de17906fabb2c4a8";
/// flat tree {a.txt -> blob "hi"}
pub const HI_TREE: &str = "959186c87f11cedbc03fb0aa728575ce3dbf3335";
/// root commit of `HI_TREE` with message "first" by the fixture identity
pub const FIRST_COMMIT: &str = "e0a4f0a6014f557e200a3393f93a29240edf084f";
/// second commit of `HI_TREE` on top of `FIRST_COMMIT`, message "second"
pub const SECOND_COMMIT: &str = "021e37e12df290dd6414b5ae91dcb9941b902a99";

pub fn read_ref(dir: &std::path::Path, ref_path: &str) -> String {
    std::fs::read_to_string(dir.join(".git").join(ref_path))
        .unwrap_or_else(|e| panic!("Failed to read ref {ref_path}: {e}"))
}
