//! Turning classified paths into a [`ReconciliationPlan`]

use std::collections::BTreeSet;

use tracing::{debug, info};
use treesync_fs::{FileEntry, FileSystem, NormalizedPath, TreeSnapshot};

use crate::{
    AncestorMetadataResolver, CopyIntent, DeleteIntent, DeleteStep, Reconciliation,
    ReconciliationPlan, ReconciliationPolicy, Result,
};

/// Builds copy and delete intents for one dataset.
///
/// Destinations are computed relative to the search root, the deepest
/// concrete directory of the glob the dataset was discovered with, and
/// re-rooted under the publish directory.
pub struct PlanAssembler<'a> {
    search_root: NormalizedPath,
    publish_dir: NormalizedPath,
    resolver: &'a dyn AncestorMetadataResolver,
}

impl<'a> PlanAssembler<'a> {
    pub fn new(
        search_root: NormalizedPath,
        publish_dir: NormalizedPath,
        resolver: &'a dyn AncestorMetadataResolver,
    ) -> Self {
        Self {
            search_root,
            publish_dir,
            resolver,
        }
    }

    pub fn search_root(&self) -> &NormalizedPath {
        &self.search_root
    }

    pub fn publish_dir(&self) -> &NormalizedPath {
        &self.publish_dir
    }

    /// Where a source file lands on the target.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPath` error if the file is not under the search
    /// root.
    pub fn destination_for(&self, entry: &FileEntry) -> Result<NormalizedPath> {
        let relative = entry.absolute_path.relativize(&self.search_root)?;
        Ok(self.publish_dir.join_path(&relative))
    }

    /// One copy intent per path, in path order.
    ///
    /// Paths missing from `source` are skipped; they cannot come out of a
    /// reconciliation of the same snapshot.
    pub fn copy_intents(
        &self,
        paths: &BTreeSet<NormalizedPath>,
        source: &TreeSnapshot,
        source_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>> {
        paths
            .iter()
            .filter_map(|path| source.get(path))
            .map(|entry| {
                let parent = entry
                    .absolute_path
                    .parent()
                    .unwrap_or_else(|| entry.absolute_path.clone());
                Ok(CopyIntent {
                    destination_path: self.destination_for(entry)?,
                    ancestor_metadata: self.resolver.resolve(source_fs, &parent, &self.search_root)?,
                    source_entry: entry.clone(),
                })
            })
            .collect()
    }
}

/// One delete intent per path present in `target`, in path order.
pub fn delete_intents(paths: &BTreeSet<NormalizedPath>, target: &TreeSnapshot) -> Vec<DeleteIntent> {
    paths
        .iter()
        .filter_map(|path| target.get(path))
        .map(|entry| DeleteIntent::new(entry.clone()))
        .collect()
}

/// Delete intents for a reconciliation whose copies went through filters.
///
/// An updated path whose copy survived is marked replaced by that copy. An
/// updated path whose copy was dropped keeps its stale target file and gets
/// no delete intent.
pub fn settled_delete_intents(
    classified: &Reconciliation,
    copies: &[CopyIntent],
    target: &TreeSnapshot,
) -> Vec<DeleteIntent> {
    let copied: BTreeSet<&NormalizedPath> = copies
        .iter()
        .map(|intent| &intent.source_entry.relative_path)
        .collect();
    let dropped: BTreeSet<&NormalizedPath> = classified
        .updated()
        .filter(|path| !copied.contains(path))
        .collect();
    if !dropped.is_empty() {
        debug!(kept = dropped.len(), "Keeping stale files whose update was filtered out");
    }

    classified
        .delete
        .iter()
        .filter(|path| !dropped.contains(path))
        .filter_map(|path| {
            let intent = DeleteIntent::new(target.get(path)?.clone());
            Some(if copied.contains(path) { intent.replaced() } else { intent })
        })
        .collect()
}

/// Package filtered copies and deletions into a plan.
///
/// Deletions, if any, become a single delete step that depends on every
/// copy. No delete step is emitted when there is nothing to delete.
pub fn assemble(
    tag: impl Into<String>,
    copies: Vec<CopyIntent>,
    deletes: Vec<DeleteIntent>,
    policy: &ReconciliationPolicy,
    target_root: &NormalizedPath,
) -> ReconciliationPlan {
    let delete_step = (!deletes.is_empty())
        .then(|| DeleteStep::new(deletes, policy.prune_empty_directories, target_root.clone()));

    let plan = ReconciliationPlan::new(tag, copies, delete_step);
    info!(
        tag = plan.tag(),
        copies = plan.copy_count(),
        bytes = plan.total_copy_bytes(),
        deletes = plan.delete_step().map_or(0, DeleteStep::len),
        "Assembled reconciliation plan"
    );
    plan
}
