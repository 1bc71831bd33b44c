//! Git repository gateway
//!
//! [`GitRepository`] is the single point of contact with git for the
//! workflows. It is bound to one working tree and one [`GitMode`] for its
//! whole lifetime, and caches the main branch name once [`initialize`] ran.
//!
//! Operations are grouped by concern:
//!
//! - `branches`: listing, classification filters, checkout, deletion
//! - `tags`: production / release candidate tags
//! - `remote`: fetch, pull, push, tracking
//! - `working_tree`: status, stage, stash, merge, ahead counts
//!
//! [`initialize`]: GitRepository::initialize

mod branches;
mod remote;
mod tags;
mod working_tree;

use std::path::{Path, PathBuf};

use tracing::debug;

use super::classify::{classify, BranchKind};
use super::mode::GitMode;
use super::runner::{CommandRunner, SystemGit};
use crate::error::{FlowError, Result};

/// Top-level directory of the working tree containing `path`.
///
/// Fails with [`FlowError::NotAGitRepository`] for paths outside a working
/// tree, including bare repositories.
pub fn discover_root<R: CommandRunner>(runner: &R, path: &Path) -> Result<PathBuf> {
    let not_a_repo = || FlowError::NotAGitRepository(path.to_path_buf());

    let inside = runner
        .run(&["rev-parse", "--is-inside-work-tree"], path)
        .map_err(|_| not_a_repo())?;
    if inside.stdout != "true" {
        return Err(not_a_repo());
    }

    let toplevel = runner
        .run(&["rev-parse", "--show-toplevel"], path)
        .map_err(|_| not_a_repo())?;
    Ok(PathBuf::from(toplevel.stdout))
}

/// Remote used when none is configured.
pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug)]
pub struct GitRepository<R = SystemGit> {
    root: PathBuf,
    mode: GitMode,
    remote: String,
    runner: R,
    main_branch: Option<String>,
}

impl GitRepository<SystemGit> {
    /// Open the working tree containing `path`, using the system git.
    pub fn open(path: impl AsRef<Path>, mode: GitMode) -> Result<Self> {
        Self::with_runner(path, mode, SystemGit)
    }
}

impl<R: CommandRunner> GitRepository<R> {
    /// Open the working tree containing `path` with a custom runner.
    ///
    /// The working tree check runs here, not lazily; see [`discover_root`].
    pub fn with_runner(path: impl AsRef<Path>, mode: GitMode, runner: R) -> Result<Self> {
        let root = discover_root(&runner, path.as_ref())?;
        debug!(root = %root.display(), %mode, "opened repository");

        Ok(Self {
            root,
            mode,
            remote: DEFAULT_REMOTE.to_string(),
            runner,
            main_branch: None,
        })
    }

    /// Use `remote` instead of `origin` for push, delete and tracking.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> GitMode {
        self.mode
    }

    pub fn remote_name(&self) -> &str {
        &self.remote
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Resolve and cache the main branch name: `main` if it exists locally,
    /// otherwise `master`.
    pub fn initialize(&mut self) -> Result<&str> {
        let local = self.local_branches()?;
        let main = if local.iter().any(|b| b.name == "main") {
            "main"
        } else {
            "master"
        };
        debug!(main, "resolved main branch");
        Ok(self.main_branch.insert(main.to_string()).as_str())
    }

    pub fn is_initialized(&self) -> bool {
        self.main_branch.is_some()
    }

    pub fn main_branch_name(&self) -> Result<&str> {
        self.main_branch
            .as_deref()
            .ok_or(FlowError::NotInitialized("git repository"))
    }

    /// Classify `name` against this repository's main branch.
    pub fn branch_kind(&self, name: &str) -> Result<BranchKind> {
        Ok(classify(name, self.main_branch_name()?))
    }

    pub fn current_branch(&self) -> Result<String> {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Run git in the repository root and return trimmed stdout.
    fn git(&self, args: &[&str]) -> Result<String> {
        Ok(self.runner.run(args, &self.root)?.stdout)
    }

    fn git_bool(&self, args: &[&str]) -> bool {
        self.runner.succeeds(args, &self.root)
    }
}
