//! Persisted per-workspace key-value state
//!
//! Holds the non-git metadata the workflows need between runs: branch
//! relationships and the workspace's git mode. The file store keeps every
//! workspace in one JSON document keyed by the canonical repository root:
//!
//! ```json
//! {"workspaces": {"/src/app": {"branchRelationships": [], "gitMode": "local"}}}
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FlowError, Result};

/// Key-value state scoped to one workspace.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`.
    fn update(&mut self, key: &str, value: Value) -> Result<()>;

    /// Read a typed value, falling back to `default` when the key is absent
    /// or holds something that does not deserialize as `T`.
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(value) => match serde_json::from_value(value) {
                Ok(typed) => Ok(typed),
                Err(e) => {
                    warn!(key, error = %e, "ignoring malformed state entry");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

/// Serialize `value` for storage under `key`.
pub fn to_state_value<T: Serialize>(key: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| FlowError::StateSerialize {
        key: key.to_string(),
        source,
    })
}

/// In-memory state, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    entries: HashMap<String, Value>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn update(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    workspaces: BTreeMap<String, BTreeMap<String, Value>>,
}

/// JSON-file-backed state shared by all workspaces on the machine.
///
/// Reads take a shared `fs2` lock and writes an exclusive one, so two
/// invocations against different repositories do not clobber each other.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
    workspace: String,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>, workspace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            workspace: workspace.into(),
        }
    }

    /// Store scoped to the workspace rooted at `repo_root`.
    pub fn for_workspace(path: impl Into<PathBuf>, repo_root: &Path) -> Self {
        let key = repo_root
            .canonicalize()
            .unwrap_or_else(|_| repo_root.to_path_buf());
        Self::new(path, key.display().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    fn io_err(&self, source: std::io::Error) -> FlowError {
        FlowError::StateIo {
            path: self.path.clone(),
            source,
        }
    }

    fn parse(&self, content: &str) -> Result<StateDocument> {
        if content.trim().is_empty() {
            return Ok(StateDocument::default());
        }
        serde_json::from_str(content).map_err(|source| FlowError::StateFormat {
            path: self.path.clone(),
            source,
        })
    }

    fn read_document(&self) -> Result<StateDocument> {
        if !self.path.exists() {
            return Ok(StateDocument::default());
        }
        let file = File::open(&self.path).map_err(|e| self.io_err(e))?;
        file.lock_shared().map_err(|e| self.io_err(e))?;
        let mut content = String::new();
        BufReader::new(&file)
            .read_to_string(&mut content)
            .map_err(|e| self.io_err(e))?;
        self.parse(&content)
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document()?;
        Ok(document
            .workspaces
            .get_mut(&self.workspace)
            .and_then(|entries| entries.remove(key)))
    }

    fn update(&mut self, key: &str, value: Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        // Lock before reading so the read-modify-write is one critical section.
        #[allow(clippy::suspicious_open_options)]
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.lock_exclusive().map_err(|e| self.io_err(e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| self.io_err(e))?;
        let mut document = self.parse(&content)?;
        document
            .workspaces
            .entry(self.workspace.clone())
            .or_default()
            .insert(key.to_string(), value);

        let serialized =
            serde_json::to_string_pretty(&document).map_err(|source| FlowError::StateFormat {
                path: self.path.clone(),
                source,
            })?;
        file.set_len(0).map_err(|e| self.io_err(e))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| self.io_err(e))?;
        file.write_all(serialized.as_bytes())
            .map_err(|e| self.io_err(e))?;
        file.flush().map_err(|e| self.io_err(e))?;

        debug!(path = %self.path.display(), workspace = %self.workspace, key, "state updated");
        Ok(())
    }
}
