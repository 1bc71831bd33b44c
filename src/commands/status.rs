//! `branchwise status`

use anyhow::Result;
use colored::Colorize;

use super::{Context, RepoArgs};
use crate::git::Branch;

fn remote_note(branch: &Branch) -> String {
    if branch.is_remote() {
        " (remote only)".dimmed().to_string()
    } else {
        String::new()
    }
}

/// Show branches by class, their relationships and the workspace mode
pub fn execute(args: &RepoArgs) -> Result<()> {
    let ctx = Context::open(args)?;
    let repo = &ctx.repo;

    let main = repo.main_branch_name()?;
    let current = repo.current_branch()?;
    let relationships = ctx.store.get_all_relationships();

    println!("{}", "Branch Status".bold().blue());
    println!("{}", "=".repeat(50));
    println!("  Repository: {}", repo.root().display());
    println!("  Mode:       {}", repo.mode());
    if repo.has_working_changes()? {
        println!("  Working tree: {}", "uncommitted changes".yellow());
    } else {
        println!("  Working tree: {}", "clean".green());
    }

    let marker = |name: &str| if name == current { "*" } else { " " };

    println!("\n{}", "Main".bold());
    println!("  {} {main}", marker(main));

    println!("\n{}", "Production release branches".bold());
    let releases = repo.production_release_branches_favor_local()?;
    if releases.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for branch in &releases {
        let location = remote_note(branch);
        println!("  {} {}{location}", marker(&branch.name), branch.name.cyan());
    }

    println!("\n{}", "Feature branches".bold());
    let features = repo.feature_branches_favor_local()?;
    if features.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for branch in &features {
        let base = relationships
            .iter()
            .find(|r| r.feature_branch == branch.name)
            .map_or_else(|| main.to_string(), |r| r.production_release_branch.clone());
        let location = remote_note(branch);
        println!(
            "  {} {} {} {base}{location}",
            marker(&branch.name),
            branch.name,
            "->".dimmed()
        );
    }

    println!();
    Ok(())
}
