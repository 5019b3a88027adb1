//! Apply-deletes command implementation

use std::path::Path;

use colored::Colorize;
use treesync_core::{DeleteStep, ReconciliationPlan};
use treesync_fs::{FileSystem, LocalFileSystem, io};

use super::absolute;
use crate::error::Result;

/// Run the apply-deletes command
pub fn run_apply_deletes(plan_path: &Path, dry_run: bool, json: bool) -> Result<()> {
    let plan = load_plan(plan_path)?;

    let Some(step) = plan.delete_step() else {
        if json {
            println!("null");
        } else {
            println!("{} Plan {} has no delete step", "ok".green(), plan.tag().cyan());
        }
        return Ok(());
    };

    let fs = LocalFileSystem::new();
    if dry_run {
        print_dry_run(step, &fs);
        return Ok(());
    }

    let outcome = step.execute(&fs)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for path in &outcome.deleted {
        println!("  {} {}", "-".red(), path);
    }
    for path in &outcome.already_absent {
        println!("  {} {} {}", "~".yellow(), path, "(already gone)".dimmed());
    }
    for path in &outcome.replaced {
        println!("  {} {} {}", "=".cyan(), path, "(replaced by copy)".dimmed());
    }
    for dir in &outcome.pruned_directories {
        println!("  {} {}/", "-".red(), dir);
    }
    println!(
        "{} Deleted {} files, pruned {} directories",
        "ok".green(),
        outcome.deleted.len(),
        outcome.pruned_directories.len()
    );
    Ok(())
}

fn load_plan(path: &Path) -> Result<ReconciliationPlan> {
    let content = io::read_text(&absolute(path)?)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_dry_run(step: &DeleteStep, fs: &dyn FileSystem) {
    println!("{}", "Dry run: nothing will be deleted".yellow());
    for intent in &step.entries {
        let path = &intent.target_entry.absolute_path;
        if intent.replaced_by_copy {
            println!("  {} {} {}", "=".cyan(), path, "(replaced by copy)".dimmed());
        } else if fs.exists(path) {
            println!("  {} {}", "-".red(), path);
        } else {
            println!("  {} {} {}", "~".yellow(), path, "(already gone)".dimmed());
        }
    }
    if step.prune_empty_directories {
        println!("  {} empty directories under {}", "prune".dimmed(), step.target_root);
    }
}
