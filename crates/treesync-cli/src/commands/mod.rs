//! Command implementations for treesync-cli

pub mod apply;
pub mod plan;

pub use apply::run_apply_deletes;
pub use plan::run_plan;

use std::path::Path;

use treesync_fs::NormalizedPath;

use crate::error::Result;

/// Resolve a user-supplied path against the current directory.
pub(crate) fn absolute(path: &Path) -> Result<NormalizedPath> {
    let absolute = std::path::absolute(path)?;
    Ok(NormalizedPath::new(dunce::simplified(&absolute)))
}
