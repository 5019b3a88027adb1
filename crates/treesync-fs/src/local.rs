//! Local disk implementation of [`FileSystem`]

use std::fs::{self, Metadata};
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::trace;
use walkdir::WalkDir;

use crate::filesystem::{EntryKind, FileStatus, FileSystem};
use crate::{Error, NormalizedPath, Result, Selector};

/// The machine's own filesystem.
///
/// Symlinks are not followed while listing; only regular files are
/// reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn scheme(&self) -> &str {
        "file"
    }

    fn list_recursive(&self, root: &NormalizedPath, selector: &dyn Selector) -> Result<Vec<FileStatus>> {
        let native_root = root.to_native();
        let mut files = Vec::new();

        for entry in WalkDir::new(&native_root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(&native_root, e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = NormalizedPath::new(entry.path());
            if !selector.accept(&path.relativize(root)?) {
                trace!(path = %path, "Skipping file rejected by selector");
                continue;
            }

            let metadata = entry.metadata().map_err(|e| walk_error(entry.path(), e))?;
            files.push(status_from_metadata(path, &metadata)?);
        }

        Ok(files)
    }

    fn status(&self, path: &NormalizedPath) -> Result<FileStatus> {
        let native = path.to_native();
        let metadata = fs::metadata(&native).map_err(|e| Error::from_io(&native, e))?;
        status_from_metadata(path.clone(), &metadata)
    }

    fn read_dir(&self, path: &NormalizedPath) -> Result<Vec<FileStatus>> {
        let native = path.to_native();
        let mut children = Vec::new();
        for entry in fs::read_dir(&native).map_err(|e| Error::from_io(&native, e))? {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            let metadata = entry.metadata().map_err(|e| Error::from_io(entry.path(), e))?;
            children.push(status_from_metadata(NormalizedPath::new(entry.path()), &metadata)?);
        }
        Ok(children)
    }

    fn delete_file(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        fs::remove_file(&native).map_err(|e| Error::from_io(&native, e))
    }

    fn remove_dir(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        fs::remove_dir(&native).map_err(|e| Error::from_io(&native, e))
    }
}

fn status_from_metadata(path: NormalizedPath, metadata: &Metadata) -> Result<FileStatus> {
    let modified = metadata
        .modified()
        .map_err(|e| Error::io(path.to_native(), e))?;
    // Timestamps before the epoch clamp to zero.
    let modification_time_millis = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0);

    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut status = FileStatus {
        path,
        kind,
        size_bytes: if kind == EntryKind::File { metadata.len() } else { 0 },
        modification_time_millis,
        mode: None,
        owner: None,
        group: None,
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};
        status.mode = Some(metadata.permissions().mode() & 0o7777);
        status.owner = Some(metadata.uid());
        status.group = Some(metadata.gid());
    }

    Ok(status)
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let at_root = err.depth() == 0;

    match err.into_io_error() {
        Some(io) if at_root && io.kind() == std::io::ErrorKind::NotFound => Error::NotFound { path },
        Some(io) => Error::io(path, io),
        None => Error::io(path, std::io::Error::other("filesystem loop detected")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AcceptAll;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_not_found() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path().join("absent"));

        let err = LocalFileSystem.list_recursive(&root, &AcceptAll).unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    }

    #[test]
    fn lists_nested_regular_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("top.txt"), "12345").unwrap();
        fs::write(temp.path().join("a/b/deep.txt"), "1").unwrap();

        let root = NormalizedPath::new(temp.path());
        let files = LocalFileSystem.list_recursive(&root, &AcceptAll).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(FileStatus::is_file));
        let top = files.iter().find(|f| f.path.file_name() == Some("top.txt")).unwrap();
        assert_eq!(top.size_bytes, 5);
    }

    #[test]
    fn status_of_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("nope"));
        assert!(LocalFileSystem.status(&path).unwrap_err().is_not_found());
    }
}
