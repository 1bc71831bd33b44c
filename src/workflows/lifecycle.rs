//! Creating, deleting and relating feature and production release branches

use tracing::info;

use crate::error::{FlowError, Result};
use crate::git::{BranchKind, CommandRunner, GitRepository, ProductionTag};
use crate::relationships::RelationshipStore;
use crate::state::StateStore;

fn require_kind<R: CommandRunner>(
    repo: &GitRepository<R>,
    name: &str,
    expected: BranchKind,
) -> Result<()> {
    let kind = repo.branch_kind(name)?;
    if kind == expected {
        return Ok(());
    }
    if expected == BranchKind::ProductionRelease {
        return Err(FlowError::NotAProductionReleaseBranch(name.to_string()));
    }
    Err(FlowError::invalid_branch(
        name,
        format!("is a {kind} branch, expected a {expected} branch"),
    ))
}

fn require_local<R: CommandRunner>(repo: &GitRepository<R>, name: &str) -> Result<()> {
    if repo.has_local_branch(name) {
        Ok(())
    } else {
        Err(FlowError::invalid_branch(name, "does not exist locally"))
    }
}

fn require_new<R: CommandRunner>(repo: &GitRepository<R>, name: &str) -> Result<()> {
    if !repo.is_valid_branch_name(name) {
        return Err(FlowError::invalid_branch(name, "not a valid git branch name"));
    }
    if repo.has_local_branch(name) {
        return Err(FlowError::invalid_branch(name, "already exists"));
    }
    Ok(())
}

/// Leave `name` if it is checked out, so it can be deleted.
fn step_off<R: CommandRunner>(repo: &GitRepository<R>, name: &str) -> Result<()> {
    if repo.current_branch()? == name {
        repo.checkout_branch(repo.main_branch_name()?)?;
    }
    Ok(())
}

/// Create feature branch `name` from `base` (default: main) and switch to it.
///
/// When the base is a production release branch the relationship is recorded
/// so later syncs merge from it instead of main. Returns the base used.
pub fn create_feature_branch<R, S>(
    repo: &GitRepository<R>,
    store: &mut RelationshipStore<S>,
    name: &str,
    base: Option<&str>,
) -> Result<String>
where
    R: CommandRunner,
    S: StateStore,
{
    require_kind(repo, name, BranchKind::Feature)?;
    require_new(repo, name)?;

    let base = match base {
        Some(b) => b.to_string(),
        None => repo.main_branch_name()?.to_string(),
    };
    require_local(repo, &base)?;

    repo.checkout_branch(&base)?;
    repo.pull()?;
    repo.checkout_new_branch(name, None)?;

    if repo.branch_kind(&base)? == BranchKind::ProductionRelease {
        store.set_relationship(name, &base)?;
    }
    info!(branch = name, %base, "feature branch created");
    Ok(base)
}

/// Delete feature branch `name` locally and on the remote, and forget its
/// relationship.
///
/// Unless `force`, the branch must have no commits that are not in main.
pub fn delete_feature_branch<R, S>(
    repo: &GitRepository<R>,
    store: &mut RelationshipStore<S>,
    name: &str,
    force: bool,
) -> Result<()>
where
    R: CommandRunner,
    S: StateStore,
{
    require_kind(repo, name, BranchKind::Feature)?;
    require_local(repo, name)?;

    let main = repo.main_branch_name()?;
    if !force {
        let ahead = repo.commits_ahead_of_branch(main, name)?;
        if ahead > 0 {
            return Err(FlowError::BranchNotMerged {
                branch: name.to_string(),
                base: main.to_string(),
                ahead,
            });
        }
    }

    step_off(repo, name)?;
    // Merge state was checked against main above; `-d` would check HEAD.
    repo.delete_branch_force(name)?;
    if force {
        repo.delete_remote_branch_force(name)?;
    } else {
        repo.delete_remote_branch(name)?;
    }
    store.clear_relationship_for_feature_branch(name)?;
    info!(branch = name, "feature branch deleted");
    Ok(())
}

/// Build the production release branch name for `version` and `prefix`.
pub fn production_release_branch_name(version: &str, prefix: Option<&str>) -> Result<String> {
    let parsed =
        semver::Version::parse(version).map_err(|_| FlowError::InvalidVersion(version.to_string()))?;
    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return Err(FlowError::InvalidVersion(version.to_string()));
    }
    if let Some(p) = prefix {
        if p.is_empty() || p.chars().any(char::is_whitespace) {
            return Err(FlowError::invalid_branch(p, "prefix must be a non-empty word"));
        }
    }

    let tag = ProductionTag {
        prefix: prefix.map(String::from),
        version: parsed.to_string(),
    };
    Ok(tag.branch_name())
}

/// Name of the production release branch for `version` and `prefix`,
/// checked to be creatable in `repo`.
pub fn new_production_release_branch_name<R: CommandRunner>(
    repo: &GitRepository<R>,
    version: &str,
    prefix: Option<&str>,
) -> Result<String> {
    let name = production_release_branch_name(version, prefix)?;
    require_new(repo, &name)?;
    Ok(name)
}

/// Create a production release branch from main and switch to it,
/// publishing it when `publish` is set.
pub fn create_production_release_branch<R: CommandRunner>(
    repo: &GitRepository<R>,
    version: &str,
    prefix: Option<&str>,
    publish: bool,
) -> Result<String> {
    let name = new_production_release_branch_name(repo, version, prefix)?;

    let main = repo.main_branch_name()?;
    repo.checkout_branch(main)?;
    repo.pull()?;
    repo.checkout_new_branch(&name, None)?;
    if publish {
        repo.setup_tracking_and_push(None)?;
    }
    info!(branch = %name, "production release branch created");
    Ok(name)
}

/// Force-delete a production release branch locally and on the remote.
///
/// Relationships pointing at it are cleared once deletion was attempted,
/// even if it failed.
pub fn delete_production_release_branch<R, S>(
    repo: &GitRepository<R>,
    store: &mut RelationshipStore<S>,
    name: &str,
) -> Result<()>
where
    R: CommandRunner,
    S: StateStore,
{
    require_kind(repo, name, BranchKind::ProductionRelease)?;
    if !repo.has_local_branch(name) && repo.remote_branch_head(name)?.is_none() {
        return Err(FlowError::invalid_branch(name, "does not exist"));
    }

    let deleted = delete_everywhere(repo, name);
    let cleared = store.clear_relationships_for_production_release_branch(name);
    deleted?;
    cleared?;
    info!(branch = name, "production release branch deleted");
    Ok(())
}

fn delete_everywhere<R: CommandRunner>(repo: &GitRepository<R>, name: &str) -> Result<()> {
    if repo.has_local_branch(name) {
        step_off(repo, name)?;
        repo.delete_branch_force(name)?;
    }
    repo.delete_remote_branch_force(name)
}

/// Record that `feature` syncs against `production_release`.
pub fn link<R, S>(
    repo: &GitRepository<R>,
    store: &mut RelationshipStore<S>,
    feature: &str,
    production_release: &str,
) -> Result<()>
where
    R: CommandRunner,
    S: StateStore,
{
    require_kind(repo, feature, BranchKind::Feature)?;
    require_kind(repo, production_release, BranchKind::ProductionRelease)?;
    require_local(repo, production_release)?;
    store.set_relationship(feature, production_release)
}

pub fn unlink<S: StateStore>(store: &mut RelationshipStore<S>, feature: &str) -> Result<()> {
    store.clear_relationship_for_feature_branch(feature)
}
