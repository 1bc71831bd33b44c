//! Remote synchronisation: fetch, pull, push, tracking
//!
//! Each operation succeeds as a no-op in local mode or when the configured
//! remote does not exist, so workflows run unchanged offline.

use tracing::debug;

use super::GitRepository;
use crate::error::Result;
use crate::git::runner::CommandRunner;

impl<R: CommandRunner> GitRepository<R> {
    /// Names of all configured remotes. Empty in local mode.
    pub fn remotes(&self) -> Result<Vec<String>> {
        if self.mode.is_local() {
            return Ok(Vec::new());
        }
        let stdout = self.git(&["remote"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Whether the configured remote exists.
    pub fn has_remote(&self) -> Result<bool> {
        Ok(self.remotes()?.iter().any(|r| *r == self.remote))
    }

    /// Whether remote operations actually run: normal mode and a remote.
    pub fn remote_enabled(&self) -> Result<bool> {
        if self.mode.is_local() {
            debug!("local mode: skipping remote operation");
            return Ok(false);
        }
        let enabled = self.has_remote()?;
        if !enabled {
            debug!(remote = %self.remote, "remote not configured: skipping remote operation");
        }
        Ok(enabled)
    }

    /// Fetch, pruning deleted branches and tags.
    pub fn fetch(&self) -> Result<()> {
        if !self.remote_enabled()? {
            return Ok(());
        }
        self.git(&["fetch", &self.remote, "--prune", "--prune-tags"])?;
        Ok(())
    }

    /// Pull the current branch from its remote counterpart.
    ///
    /// A no-op when the remote has no such branch yet.
    pub fn pull(&self) -> Result<()> {
        if !self.remote_enabled()? {
            return Ok(());
        }
        let current = self.current_branch()?;
        if !self.has_remote_branch(&current)? {
            debug!(branch = %current, "no remote counterpart: skipping pull");
            return Ok(());
        }
        self.git(&["pull", "--no-rebase", "--no-edit", &self.remote, &current])?;
        Ok(())
    }

    /// Push the current branch to the configured remote.
    pub fn push(&self) -> Result<()> {
        if !self.remote_enabled()? {
            return Ok(());
        }
        let current = self.current_branch()?;
        self.git(&["push", &self.remote, &current])?;
        Ok(())
    }

    pub fn push_tags(&self) -> Result<()> {
        if !self.remote_enabled()? {
            return Ok(());
        }
        self.git(&["push", &self.remote, "--tags"])?;
        Ok(())
    }

    /// Publish the current branch to `remote` (default: the configured one)
    /// and make it the upstream.
    pub fn setup_tracking_and_push(&self, remote: Option<&str>) -> Result<()> {
        if self.mode.is_local() {
            debug!("local mode: skipping publish");
            return Ok(());
        }
        let remote = remote.unwrap_or(&self.remote);
        if !self.remotes()?.iter().any(|r| r == remote) {
            debug!(remote, "remote not configured: skipping publish");
            return Ok(());
        }
        let current = self.current_branch()?;
        self.git(&["push", "--set-upstream", remote, &current])?;
        Ok(())
    }
}
