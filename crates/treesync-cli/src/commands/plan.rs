//! Plan command implementation

use std::path::Path;

use colored::Colorize;
use treesync_core::{ReconciliationPlan, SyncConfig, WorkUnit};
use treesync_fs::{LocalFileSystem, NormalizedPath, io};

use super::absolute;
use crate::cli::PlanArgs;
use crate::error::{CliError, Result};

/// Run the plan command
pub fn run_plan(args: &PlanArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let publish_dir = config.require_publish_dir()?.clone();

    let fs = LocalFileSystem::new();
    let mut dataset = config.dataset(&fs)?;
    let plan = dataset.plan(&fs, &publish_dir)?;

    if let Some(output) = &args.output {
        let output = absolute(output)?;
        io::write_atomic(&output, serde_json::to_string_pretty(&plan)?.as_bytes())?;
        tracing::info!(path = %output, "Wrote plan");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan, &publish_dir);
    }
    Ok(())
}

/// Start from the config file, if any, and let flags override it.
pub(crate) fn resolve_config(args: &PlanArgs) -> Result<SyncConfig> {
    let mut config = match &args.config {
        Some(path) => SyncConfig::load(&absolute(path)?)?,
        None => SyncConfig::default(),
    };

    if let Some(source) = &args.source {
        config.dataset_root = Some(absolute(source)?);
    }
    if let Some(glob) = &args.glob {
        config.glob = Some(absolute(Path::new(glob))?);
    }
    if let Some(publish_dir) = &args.publish_dir {
        config.publish_dir = Some(absolute(publish_dir)?);
    }

    config.policy.update |= args.update;
    config.policy.delete |= args.delete;
    config.policy.delete_empty_directories |= args.prune_empty_dirs;
    config.selection.skip_hidden |= args.skip_hidden;
    config.selection.skip_existing_destinations |= args.skip_existing;
    config.selection.include.extend(args.include.iter().cloned());
    config.selection.exclude.extend(args.exclude.iter().cloned());
    config.preserve_ancestor_permissions |= args.preserve_permissions;
    if args.max_total_bytes.is_some() {
        config.limits.max_total_bytes = args.max_total_bytes;
    }
    if args.max_files.is_some() {
        config.limits.max_files = args.max_files;
    }

    if config.dataset_root.is_none() {
        return Err(CliError::user(
            "no source tree given; pass --source or set dataset_root in the config file",
        ));
    }
    if config.publish_dir.is_none() {
        return Err(CliError::user(
            "no publish directory given; pass --publish-dir or set publish_dir in the config file",
        ));
    }
    Ok(config)
}

fn print_plan(plan: &ReconciliationPlan, publish_dir: &NormalizedPath) {
    println!("{} {}", "Plan for".bold(), plan.tag().cyan());
    println!("{}: {}", "Publish dir".dimmed(), publish_dir);
    println!();

    if plan.is_empty() {
        println!("{}", "Target is up to date".green());
        return;
    }

    for planned in plan.units() {
        match &planned.unit {
            WorkUnit::Copy(intent) => {
                println!(
                    "  {} {} {}",
                    "+".green(),
                    intent.destination_path,
                    format!("({} bytes)", intent.source_entry.size_bytes).dimmed()
                );
            }
            WorkUnit::DeleteStep(step) => {
                let after = if planned.depends_on.is_empty() {
                    String::new()
                } else {
                    format!(" after {} copies", planned.depends_on.len())
                };
                println!("  {}{}:", "Delete step".yellow(), after.dimmed());
                for intent in &step.entries {
                    let path = &intent.target_entry.absolute_path;
                    if intent.replaced_by_copy {
                        println!("    {} {} {}", "=".cyan(), path, "(replaced by copy)".dimmed());
                    } else {
                        println!("    {} {}", "-".red(), path);
                    }
                }
                if step.prune_empty_directories {
                    println!("    {} empty directories under {}", "prune".dimmed(), step.target_root);
                }
            }
        }
    }

    println!();
    println!(
        "{} copies ({} bytes), {} deletions",
        plan.copy_count(),
        plan.total_copy_bytes(),
        plan.delete_step().map_or(0, |step| step.len())
    );
}
