//! Release a production release branch into main
//!
//! Steps, each depending on the previous one:
//! 1. checkout the production release branch
//! 2. create the production tag
//! 3. checkout main and merge the branch into it
//! 4. push main and tags
//! 5. force-delete the branch locally and on the remote
//! 6. clear relationships pointing at the branch
//!
//! A failure aborts the remaining steps; nothing is rolled back. Step 6 runs
//! whenever step 5 was attempted, so no relationship outlives its branch.

use tracing::info;

use crate::error::Result;
use crate::git::{CommandRunner, GitRepository};
use crate::relationships::RelationshipStore;
use crate::state::StateStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub branch: String,
    pub tag: String,
    pub main: String,
}

pub fn release_production_branch<R, S>(
    repo: &GitRepository<R>,
    store: &mut RelationshipStore<S>,
    branch: &str,
    message: Option<&str>,
) -> Result<ReleaseSummary>
where
    R: CommandRunner,
    S: StateStore,
{
    let main = repo.main_branch_name()?.to_string();

    info!(branch, "checking out production release branch");
    repo.checkout_branch(branch)?;
    let tag = repo.create_production_tag(message)?;

    info!(branch, %main, "merging into main");
    repo.checkout_branch(&main)?;
    repo.merge_branch(branch)?;
    repo.push()?;
    repo.push_tags()?;

    info!(branch, "deleting released branch");
    let deleted = repo
        .delete_branch_force(branch)
        .and_then(|()| repo.delete_remote_branch_force(branch));
    let cleared = store.clear_relationships_for_production_release_branch(branch);
    deleted?;
    cleared?;

    Ok(ReleaseSummary {
        branch: branch.to_string(),
        tag,
        main,
    })
}

/// Tag a production release branch as a release candidate and push the tag,
/// leaving the branch in place for CI to pick up.
pub fn release_candidate<R: CommandRunner>(
    repo: &GitRepository<R>,
    branch: &str,
    message: Option<&str>,
) -> Result<String> {
    repo.checkout_branch(branch)?;
    let tag = repo.create_release_candidate_tag(message)?;
    repo.push_tags()?;
    info!(branch, %tag, "release candidate tagged");
    Ok(tag)
}
