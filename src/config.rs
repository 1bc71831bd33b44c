//! Layered TOML configuration
//!
//! Read from the user file (`$BRANCHWISE_CONFIG`, or `branchwise/config.toml`
//! under the platform config dir) and then `.branchwise.toml` at the
//! repository root. Later layers win field by field. Missing files are fine;
//! malformed ones are errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::git::{GitMode, DEFAULT_REMOTE};

pub const CONFIG_ENV: &str = "BRANCHWISE_CONFIG";
pub const STATE_FILE_ENV: &str = "BRANCHWISE_STATE_FILE";
pub const REPO_CONFIG_FILE: &str = ".branchwise.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub git: GitConfig,
    pub state: StateConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Remote used for push, delete and tracking
    pub remote: Option<String>,
    /// Mode used when the workspace has none persisted
    pub default_mode: Option<GitMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<String>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Load one file; a missing file is an empty configuration.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn user_config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("branchwise").join("config.toml"))
    }

    pub fn load_user() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) => Self::load_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// User configuration overlaid with the repository's `.branchwise.toml`.
    pub fn load_for_repo(user: Self, repo_root: &Path) -> Result<Self> {
        let repo = Self::load_file(&repo_root.join(REPO_CONFIG_FILE))?;
        Ok(user.overlay(repo))
    }

    /// Fields set in `other` replace those in `self`.
    pub fn overlay(self, other: Self) -> Self {
        Self {
            git: GitConfig {
                remote: other.git.remote.or(self.git.remote),
                default_mode: other.git.default_mode.or(self.git.default_mode),
            },
            state: StateConfig {
                path: other.state.path.or(self.state.path),
            },
            log: LogConfig {
                level: other.log.level.or(self.log.level),
            },
        }
    }

    pub fn remote(&self) -> &str {
        self.git.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    pub fn default_mode(&self) -> GitMode {
        self.git.default_mode.unwrap_or_default()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log.level.as_deref()
    }

    /// `$BRANCHWISE_STATE_FILE`, then `[state].path`, then
    /// `branchwise/state.json` under the platform data dir.
    pub fn state_path(&self) -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(STATE_FILE_ENV) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.state.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("branchwise").join("state.json"))
            .context("No data directory available; set BRANCHWISE_STATE_FILE")
    }
}
