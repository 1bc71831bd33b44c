//! Feature branch -> production release branch relationships
//!
//! A relationship says "sync feature branch X against production release
//! branch Y instead of main". At most one relationship exists per feature
//! branch; the list is persisted as a whole under one state key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FlowError, Result};
use crate::state::{to_state_value, StateStore};

/// State key holding the relationship list.
pub const BRANCH_RELATIONSHIPS_KEY: &str = "branchRelationships";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRelationship {
    pub feature_branch: String,
    pub production_release_branch: String,
    /// When the relationship was recorded; absent in older state files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl BranchRelationship {
    pub fn new(feature_branch: impl Into<String>, production_release_branch: impl Into<String>) -> Self {
        Self {
            feature_branch: feature_branch.into(),
            production_release_branch: production_release_branch.into(),
            recorded_at: Some(Utc::now()),
        }
    }
}

/// CRUD over the persisted relationship list of one workspace.
#[derive(Debug, Clone)]
pub struct RelationshipStore<S> {
    state: Option<S>,
}

impl<S: StateStore> RelationshipStore<S> {
    /// Store bound to `state`.
    pub fn new(state: S) -> Self {
        Self { state: Some(state) }
    }

    /// Store with no persistence scope yet; see [`RelationshipStore::bind`].
    pub fn unbound() -> Self {
        Self { state: None }
    }

    pub fn bind(&mut self, state: S) {
        self.state = Some(state);
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut S> {
        self.state.as_mut()
    }

    fn bound(&self) -> Result<&S> {
        self.state
            .as_ref()
            .ok_or(FlowError::NotInitialized("relationship store"))
    }

    /// Read the persisted list record by record. Malformed records are
    /// skipped so the rest survive the next write.
    fn load(&self) -> Result<Vec<BranchRelationship>> {
        let records = match self.bound()?.get(BRANCH_RELATIONSHIPS_KEY)? {
            None => return Ok(Vec::new()),
            Some(Value::Array(records)) => records,
            Some(other) => {
                warn!(value = %other, "branch relationships are not a list, ignoring them");
                return Ok(Vec::new());
            }
        };

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record.clone()) {
                Ok(relationship) => Some(relationship),
                Err(e) => {
                    warn!(%record, error = %e, "skipping malformed branch relationship");
                    None
                }
            })
            .collect())
    }

    fn persist(&mut self, relationships: Vec<BranchRelationship>) -> Result<()> {
        let state = self
            .state
            .as_mut()
            .ok_or(FlowError::NotInitialized("relationship store"))?;
        let value = to_state_value(BRANCH_RELATIONSHIPS_KEY, &relationships)?;
        state.update(BRANCH_RELATIONSHIPS_KEY, value)
    }

    /// Every persisted relationship. An unbound store or unreadable state
    /// yields an empty list.
    pub fn get_all_relationships(&self) -> Vec<BranchRelationship> {
        if self.state.is_none() {
            return Vec::new();
        }
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read branch relationships");
            Vec::new()
        })
    }

    pub fn get_relationship(&self, feature_branch: &str) -> Result<Option<BranchRelationship>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|r| r.feature_branch == feature_branch))
    }

    pub fn get_relationships_for_production_release_branch(
        &self,
        production_release_branch: &str,
    ) -> Result<Vec<BranchRelationship>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.production_release_branch == production_release_branch)
            .collect())
    }

    /// Record `feature_branch -> production_release_branch`, replacing any
    /// existing relationship for the feature branch.
    pub fn set_relationship(
        &mut self,
        feature_branch: &str,
        production_release_branch: &str,
    ) -> Result<()> {
        let mut relationships = self.load()?;
        relationships.retain(|r| r.feature_branch != feature_branch);
        relationships.push(BranchRelationship::new(
            feature_branch,
            production_release_branch,
        ));
        debug!(feature_branch, production_release_branch, "relationship set");
        self.persist(relationships)
    }

    pub fn clear_relationship_for_feature_branch(&mut self, feature_branch: &str) -> Result<()> {
        let mut relationships = self.load()?;
        relationships.retain(|r| r.feature_branch != feature_branch);
        debug!(feature_branch, "relationship cleared");
        self.persist(relationships)
    }

    pub fn clear_relationships_for_production_release_branch(
        &mut self,
        production_release_branch: &str,
    ) -> Result<()> {
        let mut relationships = self.load()?;
        relationships.retain(|r| r.production_release_branch != production_release_branch);
        debug!(production_release_branch, "relationships cleared");
        self.persist(relationships)
    }
}
