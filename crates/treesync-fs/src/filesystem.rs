//! The filesystem capability consumed by tree listing and delete commits
//!
//! Callers hand a `&dyn FileSystem` to whatever needs I/O. There is no
//! global filesystem handle; source and target trees may live on entirely
//! different implementations.

use serde::{Deserialize, Serialize};

use crate::{NormalizedPath, Result, Selector};

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata for a single filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Absolute path of the entry
    pub path: NormalizedPath,
    pub kind: EntryKind,
    pub size_bytes: u64,
    /// Milliseconds since the Unix epoch
    pub modification_time_millis: u64,
    /// Permission bits, when the filesystem exposes them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
}

impl FileStatus {
    /// Status of a regular file with no ownership information.
    pub fn file(path: impl Into<NormalizedPath>, size_bytes: u64, modification_time_millis: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size_bytes,
            modification_time_millis,
            mode: None,
            owner: None,
            group: None,
        }
    }

    /// Status of a directory with no ownership information.
    pub fn directory(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size_bytes: 0,
            modification_time_millis: 0,
            mode: None,
            owner: None,
            group: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Filesystem operations needed to list trees and commit deletions.
///
/// Implementations report a missing path as [`crate::Error::NotFound`] and
/// every other failure as [`crate::Error::Io`]. Retry policy, if any,
/// belongs to the implementation.
pub trait FileSystem: Send + Sync {
    /// Short identifier used in log output (e.g. `file`, `memory`).
    fn scheme(&self) -> &str;

    /// Every regular file at or below `root` accepted by `selector`.
    ///
    /// Directories are always descended; the selector only decides which
    /// files are returned.
    fn list_recursive(&self, root: &NormalizedPath, selector: &dyn Selector) -> Result<Vec<FileStatus>>;

    /// Metadata for a single path.
    fn status(&self, path: &NormalizedPath) -> Result<FileStatus>;

    /// Direct children of a directory.
    fn read_dir(&self, path: &NormalizedPath) -> Result<Vec<FileStatus>>;

    /// Remove a regular file.
    fn delete_file(&self, path: &NormalizedPath) -> Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &NormalizedPath) -> Result<()>;

    fn exists(&self, path: &NormalizedPath) -> bool {
        self.status(path).is_ok()
    }
}
