mod cli;

use anyhow::Result;
use branchwise::config::Config;
use branchwise::error::FlowError;
use branchwise::logging;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use cli::dispatch::dispatch;
use cli::types::Cli;

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_user()?;
    logging::init(cli.verbose, config.log_level());
    dispatch(cli.command, cli.repo, cli.local, config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<FlowError>().is_some_and(FlowError::is_cancelled) => {
            println!("{}", "Cancelled.".dimmed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
