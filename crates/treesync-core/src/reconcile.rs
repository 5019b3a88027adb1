//! Tree-diff classification
//!
//! Compares a source snapshot with a target snapshot and decides, per
//! relative path, whether it must be copied, deleted, or left alone.
//! The result depends only on the two key sets and their metadata, never on
//! listing order.

use std::collections::BTreeSet;

use tracing::debug;
use treesync_fs::{FileEntry, NormalizedPath, TreeSnapshot};

use crate::{Error, ReconciliationPolicy, Result};

/// Paths to copy from the source and paths to delete from the target.
///
/// A changed file appears in both sets: the stale target copy is removed
/// and the source copy lands at the same relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub copy: BTreeSet<NormalizedPath>,
    pub delete: BTreeSet<NormalizedPath>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.copy.is_empty() && self.delete.is_empty()
    }

    /// Paths that are overwritten: present in both the copy and delete sets.
    pub fn updated(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.copy.intersection(&self.delete)
    }
}

/// Whether the target entry is considered an up-to-date copy of the source.
///
/// Sizes must match and the target must be at least as new as the source.
/// A target newer than its source is trusted even if contents differ.
pub fn same_file(source: &FileEntry, target: &FileEntry) -> bool {
    target.size_bytes == source.size_bytes
        && source.modification_time_millis <= target.modification_time_millis
}

/// Classify every path of the two snapshots.
///
/// # Errors
///
/// Returns [`Error::UpdateNotAllowed`] when a path present on both sides
/// fails [`same_file`] and `policy.allow_update` is false. No partial result
/// is returned in that case.
pub fn reconcile(
    source: &TreeSnapshot,
    target: &TreeSnapshot,
    policy: &ReconciliationPolicy,
) -> Result<Reconciliation> {
    let mut result = Reconciliation::default();

    let mut changed = Vec::new();
    for source_entry in source.iter() {
        let path = &source_entry.relative_path;
        if let Some(target_entry) = target.get(path)
            && !same_file(source_entry, target_entry)
        {
            changed.push(path.clone());
        }
    }

    if !changed.is_empty() && !policy.allow_update {
        debug!(changed = changed.len(), "Update required but not allowed");
        return Err(Error::UpdateNotAllowed { paths: changed });
    }

    let updated = changed.len();
    for path in changed {
        result.copy.insert(path.clone());
        result.delete.insert(path);
    }

    let mut added = 0usize;
    for path in source.paths().filter(|path| !target.contains(path)) {
        result.copy.insert(path.clone());
        added += 1;
    }

    let stale: Vec<&NormalizedPath> = target.paths().filter(|path| !source.contains(path)).collect();
    if policy.allow_delete {
        result.delete.extend(stale.iter().map(|path| (*path).clone()));
    }

    debug!(
        added,
        updated,
        stale = stale.len(),
        deleting_stale = policy.allow_delete,
        "Reconciled snapshots"
    );
    Ok(result)
}
