//! `branchwise link`, `unlink`, `links`

use anyhow::Result;
use colored::Colorize;

use super::{Context, RepoArgs};
use crate::workflows::lifecycle;

pub fn link(args: &RepoArgs, feature: &str, production_release: &str) -> Result<()> {
    let mut ctx = Context::open(args)?;
    lifecycle::link(&ctx.repo, &mut ctx.store, feature, production_release)?;
    println!(
        "{} {} now syncs against {}",
        "✓".green(),
        feature.bold(),
        production_release.cyan()
    );
    Ok(())
}

pub fn unlink(args: &RepoArgs, feature: &str) -> Result<()> {
    let mut ctx = Context::open(args)?;
    lifecycle::unlink(&mut ctx.store, feature)?;
    println!(
        "{} {} now syncs against {}",
        "✓".green(),
        feature.bold(),
        ctx.repo.main_branch_name()?
    );
    Ok(())
}

/// List every recorded relationship
pub fn list(args: &RepoArgs) -> Result<()> {
    let ctx = Context::open(args)?;
    let relationships = ctx.store.get_all_relationships();

    if relationships.is_empty() {
        println!("No branch relationships recorded");
        return Ok(());
    }

    println!("{}", "Branch relationships".bold());
    for relationship in relationships {
        let recorded = relationship
            .recorded_at
            .map(|at| format!(" (since {})", at.format("%Y-%m-%d")))
            .unwrap_or_default();
        let missing = if ctx.repo.has_local_branch(&relationship.production_release_branch) {
            String::new()
        } else {
            format!(" {}", "[missing]".red())
        };
        println!(
            "  {} {} {}{missing}{}",
            relationship.feature_branch,
            "->".dimmed(),
            relationship.production_release_branch.cyan(),
            recorded.dimmed()
        );
    }
    Ok(())
}
