//! CLI command handlers
//!
//! Each handler opens a [`Context`] for the target repository, runs the
//! matching workflow and prints the outcome.

pub mod branch;
pub mod link;
pub mod mode;
pub mod release;
pub mod status;
pub mod sync;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::git::{discover_root, GitMode, GitRepository, SystemGit};
use crate::relationships::RelationshipStore;
use crate::state::FileStateStore;

/// Options shared by every repository command.
#[derive(Debug, Clone)]
pub struct RepoArgs {
    pub path: PathBuf,
    pub force_local: bool,
    pub config: Config,
}

/// An initialized repository gateway plus its relationship store.
#[derive(Debug)]
pub struct Context {
    pub repo: GitRepository,
    pub store: RelationshipStore<FileStateStore>,
    pub config: Config,
}

impl Context {
    pub fn open(args: &RepoArgs) -> Result<Self> {
        let root = discover_root(&SystemGit, &args.path)?;
        let config = Config::load_for_repo(args.config.clone(), &root)?;
        let state = open_state(&config, &root)?;

        let mode = if args.force_local {
            GitMode::Local
        } else {
            GitMode::load(&state, config.default_mode())?
        };
        debug!(root = %root.display(), %mode, state = %state.path().display(), "opening workspace");

        let mut repo = GitRepository::open(&root, mode)?.with_remote(config.remote());
        repo.initialize()?;

        Ok(Self {
            repo,
            store: RelationshipStore::new(state),
            config,
        })
    }
}

pub(crate) fn open_state(config: &Config, root: &Path) -> Result<FileStateStore> {
    let path = config
        .state_path()
        .context("Failed to locate the state file")?;
    Ok(FileStateStore::for_workspace(path, root))
}
