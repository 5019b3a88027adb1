//! Ancestor directory metadata attached to copy intents
//!
//! The copy executor recreates missing parent directories on the target.
//! What it should apply to them (owner, group, mode) is resolved here and
//! carried through the plan untouched.

use serde::{Deserialize, Serialize};
use treesync_fs::{FileSystem, NormalizedPath};

use crate::Result;

/// Ownership and permission bits of one ancestor directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorPermission {
    pub path: NormalizedPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
}

/// Metadata for the ancestors of a copied file, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncestorMetadata(Vec<AncestorPermission>);

impl AncestorMetadata {
    pub fn new(ancestors: Vec<AncestorPermission>) -> Self {
        Self(ancestors)
    }

    pub fn ancestors(&self) -> &[AncestorPermission] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves ancestor metadata for a file about to be copied.
pub trait AncestorMetadataResolver: Send + Sync {
    /// `parent_dir` is the immediate parent of the source file and
    /// `search_root` the deepest concrete directory of the discovery glob.
    fn resolve(
        &self,
        fs: &dyn FileSystem,
        parent_dir: &NormalizedPath,
        search_root: &NormalizedPath,
    ) -> Result<AncestorMetadata>;
}

/// Attaches no ancestor metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAncestorMetadata;

impl AncestorMetadataResolver for NoAncestorMetadata {
    fn resolve(
        &self,
        _fs: &dyn FileSystem,
        _parent_dir: &NormalizedPath,
        _search_root: &NormalizedPath,
    ) -> Result<AncestorMetadata> {
        Ok(AncestorMetadata::default())
    }
}

/// Records owner, group and mode of every directory from the file's parent
/// up to, but excluding, the search root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicateAncestorPermissions;

impl AncestorMetadataResolver for ReplicateAncestorPermissions {
    fn resolve(
        &self,
        fs: &dyn FileSystem,
        parent_dir: &NormalizedPath,
        search_root: &NormalizedPath,
    ) -> Result<AncestorMetadata> {
        // Fails with InvalidPath when the parent is outside the search root.
        parent_dir.relativize(search_root)?;

        let mut ancestors = Vec::new();
        let mut current = Some(parent_dir.clone());
        while let Some(dir) = current {
            if &dir == search_root {
                break;
            }
            let status = fs.status(&dir)?;
            ancestors.push(AncestorPermission {
                path: dir.clone(),
                mode: status.mode,
                owner: status.owner,
                group: status.group,
            });
            current = dir.parent();
        }

        Ok(AncestorMetadata::new(ancestors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesync_fs::MemoryFileSystem;

    #[test]
    fn replicate_walks_up_to_search_root() {
        let fs = MemoryFileSystem::new().with_file("/data/events/2024/01/a.log", 1, 1);
        fs.set_permissions(&NormalizedPath::new("/data/events/2024"), 0o750, 10, 20);

        let metadata = ReplicateAncestorPermissions
            .resolve(
                &fs,
                &NormalizedPath::new("/data/events/2024/01"),
                &NormalizedPath::new("/data/events"),
            )
            .unwrap();

        let paths: Vec<&str> = metadata.ancestors().iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["/data/events/2024/01", "/data/events/2024"]);
        assert_eq!(metadata.ancestors()[1].mode, Some(0o750));
        assert_eq!(metadata.ancestors()[1].owner, Some(10));
    }

    #[test]
    fn replicate_at_search_root_is_empty() {
        let fs = MemoryFileSystem::new().with_file("/data/a.log", 1, 1);
        let root = NormalizedPath::new("/data");
        let metadata = ReplicateAncestorPermissions.resolve(&fs, &root, &root).unwrap();
        assert!(metadata.is_empty());
    }

    #[test]
    fn replicate_outside_search_root_fails() {
        let fs = MemoryFileSystem::new().with_file("/other/a.log", 1, 1);
        let err = ReplicateAncestorPermissions
            .resolve(&fs, &NormalizedPath::new("/other"), &NormalizedPath::new("/data"))
            .unwrap_err();
        assert!(err.is_invalid_path());
    }
}
