//! Working tree state: status, staging, stash, merge

use super::GitRepository;
use crate::error::{FlowError, Result};
use crate::git::runner::CommandRunner;

impl<R: CommandRunner> GitRepository<R> {
    /// Any porcelain status output counts as dirty, untracked files included.
    pub fn has_working_changes(&self) -> Result<bool> {
        Ok(!self.git(&["status", "--porcelain"])?.is_empty())
    }

    pub fn stage(&self, path: &str) -> Result<()> {
        self.git(&["add", "--", path])?;
        Ok(())
    }

    pub fn stash(&self, message: &str) -> Result<()> {
        self.git(&["stash", "push", "-m", message])?;
        Ok(())
    }

    pub fn pop_stash(&self) -> Result<()> {
        self.git(&["stash", "pop"])?;
        Ok(())
    }

    /// Merge `name` into the current branch.
    ///
    /// Conflicts surface as [`FlowError::GitCommandFailed`] and the working
    /// tree is left exactly as git left it.
    pub fn merge_branch(&self, name: &str) -> Result<()> {
        self.git(&["merge", "--no-edit", name])?;
        Ok(())
    }

    /// Number of commits on `compare` that are not on `base`.
    ///
    /// Zero means `compare` is fully merged into `base`.
    pub fn commits_ahead_of_branch(&self, base: &str, compare: &str) -> Result<u32> {
        let range = format!("{base}...{compare}");
        let stdout = self.git(&["rev-list", "--count", "--right-only", &range])?;
        stdout
            .parse()
            .map_err(|_| FlowError::GitCommandFailed {
                command: format!("git rev-list --count --right-only {range}"),
                stderr: format!("unexpected output: {stdout}"),
                code: None,
            })
    }

    pub fn is_branch_merged(&self, branch: &str, base: &str) -> Result<bool> {
        Ok(self.commits_ahead_of_branch(base, branch)? == 0)
    }
}
