//! Tree listing into point-in-time snapshots

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filesystem::{FileStatus, FileSystem};
use crate::{NormalizedPath, Result, Selector};

/// A listed file, keyed by its path relative to the tree root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub relative_path: NormalizedPath,
    pub absolute_path: NormalizedPath,
    pub size_bytes: u64,
    /// Milliseconds since the Unix epoch
    pub modification_time_millis: u64,
}

impl FileEntry {
    /// Build an entry for `relative_path` under `root`.
    pub fn new(
        root: &NormalizedPath,
        relative_path: impl Into<NormalizedPath>,
        size_bytes: u64,
        modification_time_millis: u64,
    ) -> Self {
        let relative_path = relative_path.into();
        Self {
            absolute_path: root.join_path(&relative_path),
            relative_path,
            size_bytes,
            modification_time_millis,
        }
    }

    /// Build an entry from a listed status, relativized against `root`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPath`] if the status is not under `root`.
    pub fn from_status(status: &FileStatus, root: &NormalizedPath) -> Result<Self> {
        Ok(Self {
            relative_path: status.path.relativize(root)?,
            absolute_path: status.path.clone(),
            size_bytes: status.size_bytes,
            modification_time_millis: status.modification_time_millis,
        })
    }
}

/// Relative path to [`FileEntry`] mapping for one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    root: NormalizedPath,
    entries: BTreeMap<NormalizedPath, FileEntry>,
}

impl TreeSnapshot {
    /// A snapshot with no files.
    pub fn empty(root: NormalizedPath) -> Self {
        Self {
            root,
            entries: BTreeMap::new(),
        }
    }

    /// Build a snapshot from already relativized entries.
    pub fn from_entries(root: NormalizedPath, entries: impl IntoIterator<Item = FileEntry>) -> Self {
        Self {
            root,
            entries: entries
                .into_iter()
                .map(|entry| (entry.relative_path.clone(), entry))
                .collect(),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn get(&self, relative_path: &NormalizedPath) -> Option<&FileEntry> {
        self.entries.get(relative_path)
    }

    pub fn contains(&self, relative_path: &NormalizedPath) -> bool {
        self.entries.contains_key(relative_path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every entry's size.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|entry| entry.size_bytes).sum()
    }
}

/// List every selected regular file under `root`.
///
/// A missing root is a normal condition (a target that was never synced)
/// and yields an empty snapshot. Any other failure is returned unchanged.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] when listing fails and
/// [`crate::Error::InvalidPath`] when the filesystem reports a file outside
/// `root`.
pub fn list_tree(fs: &dyn FileSystem, root: &NormalizedPath, selector: &dyn Selector) -> Result<TreeSnapshot> {
    let statuses = match fs.list_recursive(root, selector) {
        Ok(statuses) => statuses,
        Err(e) if e.is_not_found() => {
            debug!(scheme = fs.scheme(), root = %root, "Root does not exist, using empty snapshot");
            return Ok(TreeSnapshot::empty(root.clone()));
        }
        Err(e) => return Err(e),
    };

    let entries = statuses
        .iter()
        .filter(|status| status.is_file())
        .map(|status| FileEntry::from_status(status, root))
        .collect::<Result<Vec<_>>>()?;

    let snapshot = TreeSnapshot::from_entries(root.clone(), entries);
    debug!(
        scheme = fs.scheme(),
        root = %root,
        files = snapshot.len(),
        bytes = snapshot.total_bytes(),
        "Listed tree"
    );
    Ok(snapshot)
}
