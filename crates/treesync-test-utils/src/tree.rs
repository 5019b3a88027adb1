//! [`TestTree`] builder for on-disk sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tempfile::TempDir;
use treesync_fs::NormalizedPath;

/// A temporary directory with helpers for laying out files with exact
/// sizes and modification times.
///
/// # Example
///
/// ```rust,no_run
/// use treesync_test_utils::tree::TestTree;
///
/// let tree = TestTree::new();
/// tree.file("data/a.txt", 10, 1_700_000_000);
/// tree.assert_exists("data/a.txt");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap_or_else(|e| panic!("TestTree::new: {e}")),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a [`NormalizedPath`], canonicalized so it matches what a
    /// listing reports on platforms where the temp dir is a symlink.
    pub fn normalized_root(&self) -> NormalizedPath {
        let canonical = fs::canonicalize(self.root())
            .unwrap_or_else(|e| panic!("TestTree: cannot canonicalize root: {e}"));
        NormalizedPath::new(canonical)
    }

    /// Normalized absolute path of `relative` inside the tree.
    pub fn path(&self, relative: &str) -> NormalizedPath {
        self.normalized_root().join(relative)
    }

    /// Write a file of exactly `size` bytes with its mtime set to
    /// `mtime_secs` seconds since the epoch. Parents are created.
    ///
    /// # Panics
    /// Panics if any filesystem operation fails.
    pub fn file(&self, relative: &str, size: usize, mtime_secs: i64) -> PathBuf {
        let full_path = self.root().join(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestTree::file: cannot create {}: {e}", parent.display()));
        }
        fs::write(&full_path, vec![b'x'; size])
            .unwrap_or_else(|e| panic!("TestTree::file: cannot write {}: {e}", full_path.display()));
        filetime::set_file_mtime(&full_path, FileTime::from_unix_time(mtime_secs, 0))
            .unwrap_or_else(|e| panic!("TestTree::file: cannot set mtime on {}: {e}", full_path.display()));
        full_path
    }

    /// Create a directory (and its parents).
    pub fn dir(&self, relative: &str) -> PathBuf {
        let full_path = self.root().join(relative);
        fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("TestTree::dir: cannot create {}: {e}", full_path.display()));
        full_path
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        let full_path = self.root().join(relative);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `relative` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_missing(&self, relative: &str) {
        let full_path = self.root().join(relative);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }
}
