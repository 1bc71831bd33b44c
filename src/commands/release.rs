//! `branchwise release`

use anyhow::Result;
use colored::Colorize;

use super::{Context, RepoArgs};
use crate::workflows::{release_candidate, release_production_branch};

/// Release a production release branch into main, or tag a release candidate
pub fn execute(
    args: &RepoArgs,
    branch: Option<String>,
    message: Option<String>,
    candidate: bool,
) -> Result<()> {
    let mut ctx = Context::open(args)?;
    let branch = match branch {
        Some(b) => b,
        None => ctx.repo.current_branch()?,
    };

    if candidate {
        let tag = release_candidate(&ctx.repo, &branch, message.as_deref())?;
        println!("{} Tagged {} as {}", "✓".green(), branch.cyan(), tag.bold());
        return Ok(());
    }

    let summary = release_production_branch(&ctx.repo, &mut ctx.store, &branch, message.as_deref())?;
    println!(
        "{} Released {} as {} into {}",
        "✓".green(),
        summary.branch.cyan(),
        summary.tag.bold(),
        summary.main
    );
    println!("  {}", format!("{} deleted", summary.branch).dimmed());
    Ok(())
}
