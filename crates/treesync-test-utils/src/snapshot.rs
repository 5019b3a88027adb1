//! In-memory trees described as `(relative path, size, mtime millis)`.

use treesync_fs::{FileEntry, MemoryFileSystem, NormalizedPath, TreeSnapshot};

/// One file of a described tree.
pub type TestFile<'a> = (&'a str, u64, u64);

/// Build a snapshot rooted at `root` from `files`.
pub fn snapshot(root: &str, files: &[TestFile<'_>]) -> TreeSnapshot {
    let root = NormalizedPath::new(root);
    let entries = files
        .iter()
        .map(|&(path, size, mtime)| FileEntry::new(&root, path, size, mtime));
    TreeSnapshot::from_entries(root.clone(), entries)
}

/// Build a memory filesystem holding `files` under `root`.
pub fn memory_fs(root: &str, files: &[TestFile<'_>]) -> MemoryFileSystem {
    let fs = MemoryFileSystem::new();
    add_files(&fs, root, files);
    fs
}

/// Add `files` under `root` to an existing memory filesystem.
pub fn add_files(fs: &MemoryFileSystem, root: &str, files: &[TestFile<'_>]) {
    let root = NormalizedPath::new(root);
    for &(path, size, mtime) in files {
        fs.add_file(root.join(path), size, mtime);
    }
}

/// Relative paths as strings, for compact assertions.
pub fn path_strings<'a>(paths: impl IntoIterator<Item = &'a NormalizedPath>) -> Vec<String> {
    paths.into_iter().map(|path| path.to_string()).collect()
}
