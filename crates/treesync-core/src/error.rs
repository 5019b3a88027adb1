//! Error types for treesync-core

use treesync_fs::NormalizedPath;

/// Result type for treesync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or committing a sync
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Files present on both sides differ and the policy forbids updates
    #[error(
        "{} file(s) already exist in the target but differ from the source; refusing to plan without update mode",
        .paths.len()
    )]
    UpdateNotAllowed { paths: Vec<NormalizedPath> },

    /// A copy filter reordered candidates or produced ones it was not given
    #[error("Copy filter {filter} violated its contract: {message}")]
    FilterContract { filter: String, message: String },

    /// A copy filter failed on its own terms
    #[error("Copy filter {filter} failed: {message}")]
    Filter { filter: String, message: String },

    /// A serialized plan does not satisfy the plan invariants
    #[error("Invalid plan: {message}")]
    InvalidPlan { message: String },

    /// Sync configuration is incomplete or inconsistent
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem error from treesync-fs
    #[error(transparent)]
    Fs(#[from] treesync_fs::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            filter: filter.into(),
            message: message.into(),
        }
    }

    pub fn is_update_not_allowed(&self) -> bool {
        matches!(self, Self::UpdateNotAllowed { .. })
    }

    /// Listing or metadata failure other than a missing path.
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            Self::Fs(treesync_fs::Error::Io { .. } | treesync_fs::Error::NotFound { .. })
        )
    }

    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::Fs(treesync_fs::Error::InvalidPath { .. }))
    }
}
