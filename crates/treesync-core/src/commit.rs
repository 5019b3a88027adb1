//! Applying a plan's delete step
//!
//! Engines call this once every copy the step depends on has committed.
//! Files overwritten by those copies stay in place. Running it twice is
//! harmless: files that are already gone are skipped.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};
use treesync_fs::{FileSystem, NormalizedPath};

use crate::{DeleteStep, Result};

/// What a delete step did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: Vec<NormalizedPath>,
    pub already_absent: Vec<NormalizedPath>,
    /// Stale files a copy of the same plan overwrote
    pub replaced: Vec<NormalizedPath>,
    pub pruned_directories: Vec<NormalizedPath>,
}

impl DeleteStep {
    /// True when none of the files the step removes exist any more.
    pub fn is_completed(&self, fs: &dyn FileSystem) -> bool {
        self.removed_paths().all(|path| !fs.exists(path))
    }

    /// Delete every entry not replaced by a copy, then prune emptied
    /// directories if requested.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPath` error, before touching anything, if an entry
    /// lies outside the target root. Filesystem failures other than a
    /// missing file abort the step.
    pub fn execute(&self, fs: &dyn FileSystem) -> Result<DeleteOutcome> {
        for path in self.paths() {
            path.relativize(&self.target_root)?;
        }

        let mut outcome = DeleteOutcome::default();
        for intent in &self.entries {
            let path = &intent.target_entry.absolute_path;
            if intent.replaced_by_copy {
                debug!(path = %path, "Keeping file overwritten by its copy");
                outcome.replaced.push(path.clone());
                continue;
            }
            match fs.delete_file(path) {
                Ok(()) => {
                    debug!(path = %path, "Deleted file");
                    outcome.deleted.push(path.clone());
                }
                Err(e) if e.is_not_found() => {
                    warn!(path = %path, "File scheduled for deletion is already gone");
                    outcome.already_absent.push(path.clone());
                }
                Err(e) => return Err(e.into()),
            }
        }

        if self.prune_empty_directories {
            outcome.pruned_directories = self.prune(fs)?;
        }

        info!(
            target_root = %self.target_root,
            deleted = outcome.deleted.len(),
            already_absent = outcome.already_absent.len(),
            replaced = outcome.replaced.len(),
            pruned = outcome.pruned_directories.len(),
            "Delete step committed"
        );
        Ok(outcome)
    }

    /// Remove directories left empty, deepest first, stopping below the
    /// target root.
    fn prune(&self, fs: &dyn FileSystem) -> Result<Vec<NormalizedPath>> {
        let mut candidates: BTreeSet<NormalizedPath> = BTreeSet::new();
        for path in self.removed_paths() {
            let mut current = path.parent();
            while let Some(dir) = current {
                if dir == self.target_root || !dir.is_descendant_of(&self.target_root) {
                    break;
                }
                current = dir.parent();
                candidates.insert(dir);
            }
        }

        // Deeper directories have more components and must go first.
        let mut ordered: Vec<NormalizedPath> = candidates.into_iter().collect();
        ordered.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

        let mut pruned = Vec::new();
        for dir in ordered {
            let children = match fs.read_dir(&dir) {
                Ok(children) => children,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };
            if children.is_empty() {
                fs.remove_dir(&dir)?;
                debug!(dir = %dir, "Pruned empty directory");
                pruned.push(dir);
            }
        }
        Ok(pruned)
    }
}
