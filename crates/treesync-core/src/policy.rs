//! Reconciliation policy flags

use serde::{Deserialize, Serialize};

/// How far a sync may go beyond adding new files.
///
/// Every flag defaults to `false`: new files are always copied, but nothing
/// in the target is overwritten or removed unless explicitly allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPolicy {
    /// Overwrite target files that differ from the source
    pub allow_update: bool,
    /// Delete target files that no longer exist in the source
    pub allow_delete: bool,
    /// Remove directories left empty by deletions, up to the target root
    pub prune_empty_directories: bool,
}

impl ReconciliationPolicy {
    pub fn new(allow_update: bool, allow_delete: bool, prune_empty_directories: bool) -> Self {
        Self {
            allow_update,
            allow_delete,
            prune_empty_directories,
        }
    }

    pub fn with_update(mut self, allow: bool) -> Self {
        self.allow_update = allow;
        self
    }

    pub fn with_delete(mut self, allow: bool) -> Self {
        self.allow_delete = allow;
        self
    }

    pub fn with_prune_empty_directories(mut self, prune: bool) -> Self {
        self.prune_empty_directories = prune;
        self
    }
}
