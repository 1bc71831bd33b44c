//! `branchwise sync`

use anyhow::Result;
use colored::Colorize;

use super::{Context, RepoArgs};
use crate::prompt::TerminalPrompter;
use crate::workflows::{sync, StashOutcome};

/// Sync main, production release branches and feature branches
pub fn execute(args: &RepoArgs) -> Result<()> {
    let mut ctx = Context::open(args)?;
    let mut prompter = TerminalPrompter::stdio();

    println!("{}", "Syncing branches...".bold());
    let summary = sync(&ctx.repo, &mut ctx.store, &mut prompter)?;

    println!("  {} {}", "✓".green(), summary.main);
    for branch in &summary.production_release_branches {
        println!("  {} {} {}", "✓".green(), branch.cyan(), format!("<- {}", summary.main).dimmed());
    }
    for feature in &summary.feature_branches {
        let note = if feature.merged {
            format!("<- {}", feature.base)
        } else {
            format!("(did not merge {})", feature.base)
        };
        println!("  {} {} {}", "✓".green(), feature.branch, note.dimmed());
    }
    for branch in &summary.published {
        println!("  {} published {branch}", "↑".blue());
    }
    for target in &summary.stale_relationships {
        println!(
            "  {} cleared relationships to missing branch {target}",
            "!".yellow()
        );
    }

    match summary.stash {
        StashOutcome::Restored => println!("\nRestored your stashed changes on {}", summary.restored_branch),
        StashOutcome::LeftInStash => println!(
            "\n{} Your changes are still stashed; run `git stash pop` when ready",
            "Note:".yellow().bold()
        ),
        StashOutcome::NotNeeded | StashOutcome::Declined => {
            println!("\nBack on {}", summary.restored_branch)
        }
    }
    Ok(())
}
