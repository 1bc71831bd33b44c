//! Sync main, production release branches and feature branches
//!
//! Order matters: main first, because everything else merges from it; then
//! production release branches, because feature branches may be based on
//! them; then feature branches. Branches are handled one at a time since
//! they all share the same working tree.
//!
//! Any git failure aborts the sync where it happened. The repository is not
//! unwound and a stash taken at the start is not popped; the operator
//! resolves the state by hand.

use tracing::{info, warn};

use crate::error::{FlowError, Result};
use crate::git::{CommandRunner, GitRepository};
use crate::prompt::Prompter;
use crate::relationships::RelationshipStore;
use crate::state::StateStore;

pub const DEFAULT_STASH_MESSAGE: &str = "branchwise sync";

// What `rev-parse --abbrev-ref HEAD` reports when no branch is checked out.
const DETACHED_HEAD: &str = "HEAD";

/// What happened to uncommitted changes found at the start of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StashOutcome {
    /// The working tree was clean
    NotNeeded,
    /// The operator chose not to stash
    Declined,
    /// Changes were stashed and popped again
    Restored,
    /// Changes were stashed and left in the stash
    LeftInStash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSync {
    pub branch: String,
    pub base: String,
    pub merged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub main: String,
    pub production_release_branches: Vec<String>,
    pub feature_branches: Vec<FeatureSync>,
    pub published: Vec<String>,
    pub stale_relationships: Vec<String>,
    pub stash: StashOutcome,
    pub restored_branch: String,
}

struct Sync<'a, R, S, P> {
    repo: &'a GitRepository<R>,
    store: &'a mut RelationshipStore<S>,
    prompter: &'a mut P,
    main: String,
    production_release_branches: Vec<String>,
    published: Vec<String>,
    stale_relationships: Vec<String>,
}

pub fn sync<R, S, P>(
    repo: &GitRepository<R>,
    store: &mut RelationshipStore<S>,
    prompter: &mut P,
) -> Result<SyncSummary>
where
    R: CommandRunner,
    S: StateStore,
    P: Prompter,
{
    repo.fetch()?;
    let feature_branches: Vec<String> = repo
        .local_feature_branches()?
        .into_iter()
        .map(|b| b.name)
        .collect();
    let production_release_branches: Vec<String> = repo
        .local_production_release_branches()?
        .into_iter()
        .map(|b| b.name)
        .collect();
    let main = repo.main_branch_name()?.to_string();
    let has_changes = repo.has_working_changes()?;
    let original = repo.current_branch()?;

    let mut sync = Sync {
        repo,
        store,
        prompter,
        main,
        production_release_branches,
        published: Vec::new(),
        stale_relationships: Vec::new(),
    };

    let stashed = if has_changes { sync.stash()? } else { false };

    sync.update_main(&original)?;

    for branch in sync.production_release_branches.clone() {
        sync.update_production_release_branch(&branch)?;
    }

    let mut features = Vec::new();
    for branch in &feature_branches {
        features.push(sync.update_feature_branch(branch)?);
    }

    let (restored_branch, stash) = sync.restore(&original, stashed)?;
    let stash = match (has_changes, stashed) {
        (false, _) => StashOutcome::NotNeeded,
        (true, false) => StashOutcome::Declined,
        (true, true) => stash,
    };

    Ok(SyncSummary {
        main: sync.main,
        production_release_branches: sync.production_release_branches,
        feature_branches: features,
        published: sync.published,
        stale_relationships: sync.stale_relationships,
        stash,
        restored_branch,
    })
}

impl<R, S, P> Sync<'_, R, S, P>
where
    R: CommandRunner,
    S: StateStore,
    P: Prompter,
{
    fn stash(&mut self) -> Result<bool> {
        if !self
            .prompter
            .ask_yes_no("You have uncommitted changes. Stash them before syncing?", false)?
        {
            return Ok(false);
        }
        let message = self
            .prompter
            .ask_text("Stash message", Some(DEFAULT_STASH_MESSAGE), true)?
            .ok_or(FlowError::UserCancelled)?;

        self.repo.stage(".")?;
        self.repo.stash(&message)?;
        info!(%message, "stashed working changes");
        Ok(true)
    }

    fn update_main(&mut self, current: &str) -> Result<()> {
        let main = self.main.clone();
        info!(branch = %main, "updating main");
        if current != main {
            self.repo.checkout_branch(&main)?;
        }
        let on_remote = self.repo.has_remote_branch(&main)?;
        if on_remote {
            self.repo.pull()?;
        }
        self.publish_or_push(&main, on_remote)
    }

    fn update_production_release_branch(&mut self, branch: &str) -> Result<()> {
        info!(branch, "updating production release branch");
        self.repo.checkout_branch(branch)?;
        let on_remote = self.repo.has_remote_branch(branch)?;
        if on_remote {
            self.repo.pull()?;
        }
        self.repo.merge_branch(&self.main)?;
        self.publish_or_push(branch, on_remote)
    }

    fn update_feature_branch(&mut self, branch: &str) -> Result<FeatureSync> {
        info!(branch, "updating feature branch");
        self.repo.checkout_branch(branch)?;
        let on_remote = self.repo.has_remote_branch(branch)?;
        if on_remote {
            self.repo.pull()?;
        }

        let base = self.resolve_base(branch)?;
        let merged = self
            .prompter
            .ask_yes_no(&format!("Merge '{base}' into '{branch}'?"), false)?;
        if merged {
            self.repo.merge_branch(&base)?;
        }

        self.publish_or_push(branch, on_remote)?;
        Ok(FeatureSync {
            branch: branch.to_string(),
            base,
            merged,
        })
    }

    /// The branch a feature branch syncs against: its saved production
    /// release branch if that still exists, otherwise main, or the operator's
    /// pick when there is more than one production release branch.
    fn resolve_base(&mut self, branch: &str) -> Result<String> {
        if let Some(relationship) = self.store.get_relationship(branch)? {
            let target = relationship.production_release_branch;
            if self.production_release_branches.contains(&target) {
                return Ok(target);
            }

            warn!(branch, %target, "relationship points at a missing branch, clearing it");
            self.store
                .clear_relationships_for_production_release_branch(&target)?;
            self.store.clear_relationship_for_feature_branch(branch)?;
            self.stale_relationships.push(target);
        }

        if self.production_release_branches.len() <= 1 {
            return Ok(self.main.clone());
        }

        let mut options = vec![self.main.clone()];
        options.extend(self.production_release_branches.iter().cloned());
        let base = self
            .prompter
            .ask_choice(&format!("Which branch should '{branch}' sync with?"), &options)?
            .ok_or(FlowError::UserCancelled)?;

        if base != self.main
            && self.prompter.ask_yes_no(
                &format!("Remember '{base}' as the base of '{branch}' for future syncs?"),
                false,
            )?
        {
            self.store.set_relationship(branch, &base)?;
        }
        Ok(base)
    }

    fn publish_or_push(&mut self, branch: &str, on_remote: bool) -> Result<()> {
        if on_remote {
            return self.repo.push();
        }
        if !self.repo.remote_enabled()? {
            return Ok(());
        }
        let question = format!(
            "'{branch}' is not on {}. Publish it?",
            self.repo.remote_name()
        );
        if self.prompter.ask_yes_no(&question, true)? {
            self.repo.setup_tracking_and_push(None)?;
            self.published.push(branch.to_string());
        }
        Ok(())
    }

    /// Return to the starting branch, or main if it disappeared, and pop the
    /// stash. Popping onto main needs the operator's consent.
    fn restore(&mut self, original: &str, stashed: bool) -> Result<(String, StashOutcome)> {
        if self.repo.has_local_branch(original) {
            self.repo.checkout_branch(original)?;
            if stashed {
                self.repo.pop_stash()?;
                return Ok((original.to_string(), StashOutcome::Restored));
            }
            return Ok((original.to_string(), StashOutcome::NotNeeded));
        }

        let main = self.main.clone();
        let detached = original == DETACHED_HEAD;
        if detached {
            warn!("sync started from a detached HEAD, returning to main");
        } else {
            warn!(branch = original, "starting branch no longer exists, returning to main");
        }
        self.repo.checkout_branch(&main)?;
        if !stashed {
            return Ok((main, StashOutcome::NotNeeded));
        }
        let question = if detached {
            format!("Sync started from a detached HEAD. Pop your stashed changes onto '{main}'?")
        } else {
            format!("'{original}' no longer exists. Pop your stashed changes onto '{main}'?")
        };
        if self.prompter.ask_yes_no(&question, true)? {
            self.repo.pop_stash()?;
            Ok((main, StashOutcome::Restored))
        } else {
            Ok((main, StashOutcome::LeftInStash))
        }
    }
}
