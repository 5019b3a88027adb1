//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// treesync - Plan the copies and deletions that make a target tree mirror a source tree
#[derive(Parser, Debug)]
#[command(name = "treesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compute the plan that brings the target in line with the source
    ///
    /// Examples:
    ///   treesync plan --source /data/2024 --publish-dir /mirror
    ///   treesync plan --config sync.toml --update --delete --json
    ///   treesync plan --source /data/2024 --glob '/data/*' --publish-dir /mirror -o plan.json
    Plan(PlanArgs),

    /// Execute the delete step of a saved plan on the local filesystem
    ///
    /// Run this only once every copy in the plan has been committed.
    ApplyDeletes {
        /// Plan file written by `treesync plan --output`
        #[arg(long)]
        plan: PathBuf,

        /// List what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Arguments of the `plan` command. Flags override the config file.
#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanArgs {
    /// Sync configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "TREESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the source tree
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Glob the dataset was discovered with (defaults to the source root)
    #[arg(short, long)]
    pub glob: Option<String>,

    /// Directory the dataset is published under
    #[arg(short, long)]
    pub publish_dir: Option<PathBuf>,

    /// Overwrite target files that differ from the source
    #[arg(long)]
    pub update: bool,

    /// Delete target files missing from the source
    #[arg(long)]
    pub delete: bool,

    /// Remove directories left empty by deletions
    #[arg(long)]
    pub prune_empty_dirs: bool,

    /// Skip files whose name starts with `.` or `_`
    #[arg(long)]
    pub skip_hidden: bool,

    /// Never copy onto a destination that already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Only consider paths matching this regex (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Ignore paths matching this regex (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Stop admitting copies beyond this many bytes
    #[arg(long)]
    pub max_total_bytes: Option<u64>,

    /// Stop admitting copies beyond this many files
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Record owner and mode of ancestor directories on each copy
    #[arg(long)]
    pub preserve_permissions: bool,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Write the JSON plan to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
