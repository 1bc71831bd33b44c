use branchwise::git::GitMode;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "branchwise")]
#[command(about = "Feature / production-release branching workflow on top of git", long_about = None)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Repository to operate on (default: current directory)
    #[arg(short = 'C', long = "repo", global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Skip every remote operation for this invocation
    #[arg(long, global = true)]
    pub local: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show main, production release and feature branches
    Status,

    /// Bring main, production release branches and feature branches up to date
    ///
    /// Main is updated first, then every production release branch merges
    /// main, then every feature branch merges its base (main or the
    /// production release branch it is related to). Stops at the first
    /// conflict and leaves the repository for you to resolve.
    Sync,

    /// Tag a production release branch, merge it into main and delete it
    Release {
        /// Production release branch (default: current branch)
        branch: Option<String>,

        /// Tag message (default: "Release <tag>")
        #[arg(short, long)]
        message: Option<String>,

        /// Only create and push a release candidate tag (<tag>-rc)
        #[arg(long)]
        candidate: bool,
    },

    /// Manage feature branches
    Feature {
        #[command(subcommand)]
        command: FeatureCommands,
    },

    /// Manage production release branches ([<prefix>-]v<version>-prep)
    Prep {
        #[command(subcommand)]
        command: PrepCommands,
    },

    /// Make a feature branch sync against a production release branch
    Link {
        /// Feature branch
        feature: String,

        /// Production release branch
        production_release: String,
    },

    /// Make a feature branch sync against main again
    Unlink {
        /// Feature branch
        feature: String,
    },

    /// List branch relationships
    Links,

    /// Show or set the workspace mode
    Mode {
        /// normal or local
        mode: Option<GitMode>,
    },

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum FeatureCommands {
    /// Create a feature branch and switch to it
    New {
        /// Branch name
        name: String,

        /// Branch to start from (default: main)
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Delete a feature branch locally and on the remote
    Delete {
        /// Branch name
        name: String,

        /// Delete even if not merged into main
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum PrepCommands {
    /// Create a production release branch from main
    New {
        /// Version as <major>.<minor>.<patch>
        version: String,

        /// Optional prefix, e.g. `web` for web-v1.2.0-prep
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Delete a production release branch locally and on the remote
    Delete {
        /// Branch name
        name: String,
    },
}
