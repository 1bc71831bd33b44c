//! Git operating mode

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::state::StateStore;

/// State key holding the persisted mode of a workspace.
pub const GIT_MODE_KEY: &str = "gitMode";

/// Whether remote-touching operations run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitMode {
    /// Fetch, pull, push and remote deletes run against the remote
    #[default]
    Normal,
    /// Every remote operation is a successful no-op
    Local,
}

impl GitMode {
    pub fn is_local(self) -> bool {
        self == GitMode::Local
    }

    /// Load the workspace's persisted mode, or `fallback` if none was saved.
    pub fn load<S: StateStore>(state: &S, fallback: GitMode) -> Result<GitMode> {
        state.get_or(GIT_MODE_KEY, fallback)
    }

    pub fn save<S: StateStore>(self, state: &mut S) -> Result<()> {
        state.update(GIT_MODE_KEY, Value::String(self.to_string()))
    }
}

impl fmt::Display for GitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitMode::Normal => write!(f, "normal"),
            GitMode::Local => write!(f, "local"),
        }
    }
}

impl FromStr for GitMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(GitMode::Normal),
            "local" => Ok(GitMode::Local),
            _ => anyhow::bail!("Invalid git mode: {s}. Use: normal, local"),
        }
    }
}
