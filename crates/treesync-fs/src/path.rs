//! Normalized path handling and path algebra
//!
//! Every path that crosses a treesync boundary is a [`NormalizedPath`]:
//! forward slashes, no empty or `.` components, `..` resolved lexically.
//! This keeps snapshot keys comparable between trees listed from different
//! filesystems.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Provides consistent path handling across platforms by normalizing
/// all paths to forward slashes internally and converting to
/// platform-native format only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes, collapses repeated
    /// separators and `.` components, and resolves `..` lexically.
    /// A leading `//` is kept so UNC paths survive normalization.
    /// The empty relative path is spelled `.`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self { inner: clean(&raw) }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Join this path with another normalized path, treated as relative.
    pub fn join_path(&self, other: &NormalizedPath) -> Self {
        if other.is_current() {
            return self.clone();
        }
        self.join(other.inner.trim_start_matches('/'))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() || self.is_current() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(idx) if self.is_network_path() && idx < 2 => None,
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != ".")
    }

    /// Iterate over the non-empty components of the path.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
    }

    /// Whether the path starts at a filesystem root.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    /// Whether this is the filesystem root `/`.
    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Whether this is the empty relative path `.`.
    pub fn is_current(&self) -> bool {
        self.inner == "."
    }

    /// Strip `root` from this path.
    ///
    /// The comparison is component-wise, so `/a/bc` is not under `/a/b`.
    /// Relativizing a path against itself yields `.`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if this path is not `root` or one of
    /// its descendants.
    pub fn relativize(&self, root: &NormalizedPath) -> Result<NormalizedPath> {
        let invalid = || Error::InvalidPath {
            path: self.inner.clone(),
            root: root.inner.clone(),
        };

        if self.is_absolute() != root.is_absolute()
            || self.is_network_path() != root.is_network_path()
        {
            return Err(invalid());
        }

        let mut parts = self.components();
        for expected in root.components() {
            match parts.next() {
                Some(actual) if actual == expected => {}
                _ => return Err(invalid()),
            }
        }

        let rest: Vec<&str> = parts.collect();
        Ok(Self::new(rest.join("/")))
    }

    /// Whether this path equals `root` or lives below it.
    pub fn is_descendant_of(&self, root: &NormalizedPath) -> bool {
        self.relativize(root).is_ok()
    }

    /// UNC path (`//server/share`).
    pub fn is_network_path(&self) -> bool {
        self.inner.starts_with("//") && !self.inner.starts_with("///")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

/// Strip `root` from `path`. See [`NormalizedPath::relativize`].
pub fn relativize(path: &NormalizedPath, root: &NormalizedPath) -> Result<NormalizedPath> {
    path.relativize(root)
}

fn clean(raw: &str) -> String {
    let network = raw.starts_with("//") && !raw.starts_with("///");
    let absolute = raw.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if network {
        format!("//{}", body)
    } else if absolute {
        format!("/{}", body)
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relativize_strips_root() {
        let path = NormalizedPath::new("/data/events/2024/a.log");
        let root = NormalizedPath::new("/data/events");
        assert_eq!(path.relativize(&root).unwrap().as_str(), "2024/a.log");
    }

    #[test]
    fn relativize_self_is_current() {
        let root = NormalizedPath::new("/data");
        assert!(root.relativize(&root).unwrap().is_current());
    }

    #[test]
    fn relativize_is_component_wise() {
        let path = NormalizedPath::new("/a/bc/file");
        let root = NormalizedPath::new("/a/b");
        assert!(matches!(
            path.relativize(&root),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn relativize_rejects_mixed_absoluteness() {
        let path = NormalizedPath::new("a/b");
        let root = NormalizedPath::new("/a");
        assert!(path.relativize(&root).is_err());
    }

    #[test]
    fn parent_of_top_level_is_root() {
        let path = NormalizedPath::new("/top");
        assert!(path.parent().unwrap().is_root());
        assert_eq!(NormalizedPath::new("/").parent(), None);
    }

    #[test]
    fn join_path_with_current_is_identity() {
        let base = NormalizedPath::new("/mirror");
        assert_eq!(base.join_path(&NormalizedPath::new(".")), base);
    }
}
