//! `branchwise mode [normal|local]`

use anyhow::Result;
use colored::Colorize;

use super::{open_state, RepoArgs};
use crate::config::Config;
use crate::git::{discover_root, GitMode, SystemGit};

/// Show the workspace mode, or persist a new one
pub fn execute(args: &RepoArgs, new_mode: Option<GitMode>) -> Result<()> {
    let root = discover_root(&SystemGit, &args.path)?;
    let config = Config::load_for_repo(args.config.clone(), &root)?;
    let mut state = open_state(&config, &root)?;

    match new_mode {
        Some(mode) => {
            mode.save(&mut state)?;
            println!("{} Mode set to {}", "✓".green(), mode.to_string().bold());
            if mode.is_local() {
                println!(
                    "  {}",
                    "fetch, pull, push and remote deletes are skipped".dimmed()
                );
            }
        }
        None => {
            let mode = GitMode::load(&state, config.default_mode())?;
            println!("{mode}");
        }
    }
    Ok(())
}
