//! treesync CLI
//!
//! Plans the copies and deletions that bring a target tree in line with a
//! source tree, and applies a plan's delete step once its copies commit.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: cannot initialise logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Plan(args) => commands::run_plan(&args),
        Commands::ApplyDeletes {
            plan,
            dry_run,
            json,
        } => commands::run_apply_deletes(&plan, dry_run, json),
    }
}
