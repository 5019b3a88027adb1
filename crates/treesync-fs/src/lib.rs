//! Filesystem abstraction for treesync
//!
//! Provides normalized path algebra, the [`FileSystem`] capability trait
//! with local and in-memory implementations, tree listing into
//! [`TreeSnapshot`]s, and safe I/O for configuration and plan files.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod glob;
pub mod io;
pub mod lister;
pub mod local;
pub mod memory;
pub mod path;
pub mod selector;

pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use filesystem::{EntryKind, FileStatus, FileSystem};
pub use glob::{deepest_non_wildcard_ancestor, is_glob};
pub use lister::{FileEntry, TreeSnapshot, list_tree};
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
pub use path::{NormalizedPath, relativize};
pub use selector::{AcceptAll, AllOf, HiddenFileSelector, RegexSelector, Selector};
