//! `branchwise feature ...` and `branchwise prep ...`

use anyhow::Result;
use colored::Colorize;

use super::{Context, RepoArgs};
use crate::prompt::{Prompter, TerminalPrompter};
use crate::workflows::lifecycle;

/// Create a feature branch off main or a production release branch
pub fn feature_new(args: &RepoArgs, name: &str, base: Option<&str>) -> Result<()> {
    let mut ctx = Context::open(args)?;
    let base = lifecycle::create_feature_branch(&ctx.repo, &mut ctx.store, name, base)?;
    println!("{} Created {} from {}", "✓".green(), name.bold(), base);
    if base != ctx.repo.main_branch_name()? {
        println!("  {}", format!("syncs against {base}").dimmed());
    }
    Ok(())
}

/// Delete a feature branch locally and remotely
pub fn feature_delete(args: &RepoArgs, name: &str, force: bool) -> Result<()> {
    let mut ctx = Context::open(args)?;
    lifecycle::delete_feature_branch(&ctx.repo, &mut ctx.store, name, force)?;
    println!("{} Deleted {}", "✓".green(), name.bold());
    Ok(())
}

/// Create a production release branch from main
pub fn prep_new(args: &RepoArgs, version: &str, prefix: Option<&str>) -> Result<()> {
    let ctx = Context::open(args)?;
    let name = lifecycle::new_production_release_branch_name(&ctx.repo, version, prefix)?;

    let publish = ctx.repo.remote_enabled()?
        && TerminalPrompter::stdio().ask_yes_no(
            &format!("Publish '{name}' to {}?", ctx.repo.remote_name()),
            false,
        )?;

    let name = lifecycle::create_production_release_branch(&ctx.repo, version, prefix, publish)?;
    println!("{} Created {}", "✓".green(), name.cyan().bold());
    Ok(())
}

/// Delete a production release branch and the relationships pointing at it
pub fn prep_delete(args: &RepoArgs, name: &str) -> Result<()> {
    let mut ctx = Context::open(args)?;
    let dependents = ctx
        .store
        .get_relationships_for_production_release_branch(name)?;

    lifecycle::delete_production_release_branch(&ctx.repo, &mut ctx.store, name)?;
    println!("{} Deleted {}", "✓".green(), name.cyan().bold());
    for relationship in dependents {
        println!(
            "  {}",
            format!("{} now syncs against main", relationship.feature_branch).dimmed()
        );
    }
    Ok(())
}
