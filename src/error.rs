//! Error taxonomy for branch workflow operations

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("not a git repository: {}", .0.display())]
    NotAGitRepository(PathBuf),

    #[error("{0} used before initialization")]
    NotInitialized(&'static str),

    #[error("not a production release branch: {0}")]
    NotAProductionReleaseBranch(String),

    #[error("tag already exists: {0}")]
    TagAlreadyExists(String),

    #[error("`{command}` failed: {stderr}")]
    GitCommandFailed {
        command: String,
        stderr: String,
        code: Option<i32>,
    },

    #[error("cancelled")]
    UserCancelled,

    #[error("branch '{branch}' has {ahead} commit(s) not merged into '{base}'")]
    BranchNotMerged {
        branch: String,
        base: String,
        ahead: u32,
    },

    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("invalid version '{0}': expected <major>.<minor>.<patch>")]
    InvalidVersion(String),

    #[error("failed to execute `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {}: {source}", path.display())]
    StateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {} is not valid JSON", path.display())]
    StateFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("state entry '{key}' could not be serialized")]
    StateSerialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FlowError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FlowError::UserCancelled)
    }

    pub(crate) fn invalid_branch(name: &str, reason: impl Into<String>) -> Self {
        FlowError::InvalidBranchName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
