//! In-memory implementation of [`FileSystem`]
//!
//! Useful for planning against a described tree and for exercising failure
//! paths that are awkward to produce on a real disk.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::sync::{PoisonError, RwLock};

use crate::filesystem::{EntryKind, FileStatus, FileSystem};
use crate::{Error, NormalizedPath, Result, Selector};

/// A filesystem held entirely in memory.
///
/// Adding a file creates its missing ancestor directories. Failures can be
/// injected for any subtree with [`MemoryFileSystem::fail_on`].
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    entries: RwLock<BTreeMap<NormalizedPath, FileStatus>>,
    failures: RwLock<BTreeMap<NormalizedPath, ErrorKind>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file, creating parent directories as needed.
    pub fn add_file(&self, path: impl Into<NormalizedPath>, size_bytes: u64, modification_time_millis: u64) {
        let status = FileStatus::file(path, size_bytes, modification_time_millis);
        self.insert(status);
    }

    /// Builder form of [`MemoryFileSystem::add_file`].
    pub fn with_file(self, path: impl Into<NormalizedPath>, size_bytes: u64, modification_time_millis: u64) -> Self {
        self.add_file(path, size_bytes, modification_time_millis);
        self
    }

    /// Add a directory, creating parent directories as needed.
    pub fn add_dir(&self, path: impl Into<NormalizedPath>) {
        self.insert(FileStatus::directory(path));
    }

    /// Set ownership and permission bits on an existing entry.
    pub fn set_permissions(&self, path: &NormalizedPath, mode: u32, owner: u32, group: u32) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = entries.get_mut(path) {
            status.mode = Some(mode);
            status.owner = Some(owner);
            status.group = Some(group);
        }
    }

    /// Make every operation touching `path` or its descendants fail.
    pub fn fail_on(&self, path: impl Into<NormalizedPath>, kind: ErrorKind) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), kind);
    }

    /// Snapshot of every file path currently stored.
    pub fn file_paths(&self) -> Vec<NormalizedPath> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|status| status.is_file())
            .map(|status| status.path.clone())
            .collect()
    }

    fn insert(&self, status: FileStatus) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut ancestor = status.path.parent();
        while let Some(dir) = ancestor {
            ancestor = dir.parent();
            entries
                .entry(dir.clone())
                .or_insert_with(|| FileStatus::directory(dir));
        }
        entries.insert(status.path.clone(), status);
    }

    fn check_failure(&self, path: &NormalizedPath) -> Result<()> {
        let failures = self.failures.read().unwrap_or_else(PoisonError::into_inner);
        match failures.iter().find(|(root, _)| path.is_descendant_of(root)) {
            Some((_, kind)) => Err(Error::io(
                path.to_native(),
                std::io::Error::new(*kind, "injected failure"),
            )),
            None => Ok(()),
        }
    }

    fn not_found(path: &NormalizedPath) -> Error {
        Error::NotFound {
            path: path.to_native(),
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn scheme(&self) -> &str {
        "memory"
    }

    fn list_recursive(&self, root: &NormalizedPath, selector: &dyn Selector) -> Result<Vec<FileStatus>> {
        self.check_failure(root)?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(root) {
            return Err(Self::not_found(root));
        }

        let mut files = Vec::new();
        for (path, status) in entries.iter() {
            if status.kind != EntryKind::File || !path.is_descendant_of(root) {
                continue;
            }
            self.check_failure(path)?;
            if selector.accept(&path.relativize(root)?) {
                files.push(status.clone());
            }
        }
        Ok(files)
    }

    fn status(&self, path: &NormalizedPath) -> Result<FileStatus> {
        self.check_failure(path)?;
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn read_dir(&self, path: &NormalizedPath) -> Result<Vec<FileStatus>> {
        self.check_failure(path)?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(path) {
            None => return Err(Self::not_found(path)),
            Some(status) if !status.is_dir() => {
                return Err(Error::io(
                    path.to_native(),
                    std::io::Error::other("not a directory"),
                ));
            }
            Some(_) => {}
        }
        Ok(entries
            .values()
            .filter(|child| child.path.parent().as_ref() == Some(path))
            .cloned()
            .collect())
    }

    fn delete_file(&self, path: &NormalizedPath) -> Result<()> {
        self.check_failure(path)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(path) {
            None => Err(Self::not_found(path)),
            Some(status) if status.is_dir() => Err(Error::io(
                path.to_native(),
                std::io::Error::other("is a directory"),
            )),
            Some(_) => {
                entries.remove(path);
                Ok(())
            }
        }
    }

    fn remove_dir(&self, path: &NormalizedPath) -> Result<()> {
        self.check_failure(path)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(path) {
            None => return Err(Self::not_found(path)),
            Some(status) if !status.is_dir() => {
                return Err(Error::io(
                    path.to_native(),
                    std::io::Error::other("not a directory"),
                ));
            }
            Some(_) => {}
        }
        if entries.keys().any(|child| child.parent().as_ref() == Some(path)) {
            return Err(Error::io(
                path.to_native(),
                std::io::Error::other("directory not empty"),
            ));
        }
        entries.remove(path);
        Ok(())
    }
}
