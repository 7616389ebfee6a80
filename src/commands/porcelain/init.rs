use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::TwigError;
use std::fs;
use std::io::Write;

pub const DEFAULT_BRANCH: &str = "main";

impl Repository {
    /// Create the git directory layout and point HEAD at `initial_branch`.
    ///
    /// Running it again on an existing repository only rewrites HEAD.
    pub fn init(&mut self, initial_branch: Option<&str>) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(initial_branch.unwrap_or(DEFAULT_BRANCH).to_string())?;

        for dir in [
            self.git_path().to_path_buf(),
            self.database().objects_path().to_path_buf(),
            self.refs().heads_path(),
        ] {
            fs::create_dir_all(&dir).map_err(|e| TwigError::file_write(&dir, e))?;
        }

        self.refs().set_head(&branch)?;

        tracing::info!(path = %self.git_path().display(), %branch, "repository initialized");
        writeln!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.git_path().display()
        )?;

        Ok(())
    }
}
