use anyhow::Result;
use branchwise::commands::{branch, link, mode, release, status, sync, RepoArgs};
use branchwise::config::Config;
use branchwise::git::check_git_available;
use clap::CommandFactory;
use std::path::PathBuf;

use super::types::{Cli, Commands, FeatureCommands, PrepCommands};

pub fn dispatch(command: Commands, repo: Option<PathBuf>, local: bool, config: Config) -> Result<()> {
    if !matches!(command, Commands::Completions { .. }) {
        check_git_available()?;
    }

    let path = match repo {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let args = RepoArgs {
        path,
        force_local: local,
        config,
    };

    match command {
        Commands::Status => status::execute(&args),
        Commands::Sync => sync::execute(&args),
        Commands::Release {
            branch,
            message,
            candidate,
        } => release::execute(&args, branch, message, candidate),
        Commands::Feature { command } => match command {
            FeatureCommands::New { name, base } => branch::feature_new(&args, &name, base.as_deref()),
            FeatureCommands::Delete { name, force } => branch::feature_delete(&args, &name, force),
        },
        Commands::Prep { command } => match command {
            PrepCommands::New { version, prefix } => {
                branch::prep_new(&args, &version, prefix.as_deref())
            }
            PrepCommands::Delete { name } => branch::prep_delete(&args, &name),
        },
        Commands::Link {
            feature,
            production_release,
        } => link::link(&args, &feature, &production_release),
        Commands::Unlink { feature } => link::unlink(&args, &feature),
        Commands::Links => link::list(&args),
        Commands::Mode { mode: new_mode } => mode::execute(&args, new_mode),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "branchwise", &mut std::io::stdout());
            Ok(())
        }
    }
}
