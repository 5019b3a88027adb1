//! Sync configuration files
//!
//! A [`SyncConfig`] describes one dataset and how to replicate it. It is
//! loaded through [`ConfigStore`], so TOML, JSON and YAML all work; the
//! format follows the file extension.
//!
//! ```toml
//! dataset_root = "/data/events/2024"
//! glob = "/data/events/*"
//! publish_dir = "/mirror"
//!
//! [policy]
//! update = true
//! delete = true
//! delete_empty_directories = true
//!
//! [selection]
//! skip_hidden = true
//! exclude = ['\.tmp$']
//!
//! [limits]
//! max_total_bytes = 1073741824
//! ```

use serde::{Deserialize, Serialize};
use treesync_fs::{
    AcceptAll, AllOf, ConfigStore, FileSystem, HiddenFileSelector, NormalizedPath, RegexSelector,
    Selector,
};

use crate::{
    DestinationExistsFilter, Error, FilterChain, MaxFileCountFilter, MaxTotalSizeFilter,
    RecursiveDataset, ReconciliationPolicy, ReplicateAncestorPermissions, Result,
};

/// Top-level sync configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root of the source tree
    pub dataset_root: Option<NormalizedPath>,
    /// Glob the dataset was discovered with; defaults to `dataset_root`
    pub glob: Option<NormalizedPath>,
    /// Directory the dataset is published under on the target
    pub publish_dir: Option<NormalizedPath>,
    /// Record ancestor directory owner and mode on every copy
    pub preserve_ancestor_permissions: bool,
    pub policy: PolicyConfig,
    pub selection: SelectionConfig,
    pub limits: LimitsConfig,
}

/// Policy flags. Absent flags are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub update: bool,
    pub delete: bool,
    pub delete_empty_directories: bool,
}

/// Which files are part of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Skip files whose name starts with `.` or `_`
    pub skip_hidden: bool,
    /// Never copy onto a destination that already exists
    pub skip_existing_destinations: bool,
}

/// Transfer limits applied to copy candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_total_bytes: Option<u64>,
    pub max_files: Option<usize>,
}

impl From<PolicyConfig> for ReconciliationPolicy {
    fn from(policy: PolicyConfig) -> Self {
        ReconciliationPolicy::new(policy.update, policy.delete, policy.delete_empty_directories)
    }
}

impl SyncConfig {
    /// Load from a TOML, JSON or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    pub fn policy(&self) -> ReconciliationPolicy {
        self.policy.into()
    }

    /// Combined selector for both listings.
    ///
    /// # Errors
    ///
    /// Returns an error if an include or exclude pattern does not compile.
    pub fn selector(&self) -> Result<Box<dyn Selector>> {
        let selection = &self.selection;
        let has_patterns = !selection.include.is_empty() || !selection.exclude.is_empty();

        let selector: Box<dyn Selector> = match (selection.skip_hidden, has_patterns) {
            (false, false) => Box::new(AcceptAll),
            (true, false) => Box::new(HiddenFileSelector),
            (false, true) => Box::new(RegexSelector::new(&selection.include, &selection.exclude)?),
            (true, true) => Box::new(
                AllOf::new()
                    .with(HiddenFileSelector)
                    .with(RegexSelector::new(&selection.include, &selection.exclude)?),
            ),
        };
        Ok(selector)
    }

    /// Copy filters implied by the limits.
    pub fn filter_chain(&self) -> FilterChain {
        let mut chain = FilterChain::new();
        if self.selection.skip_existing_destinations {
            chain.push(DestinationExistsFilter);
        }
        if let Some(max_files) = self.limits.max_files {
            chain.push(MaxFileCountFilter::new(max_files));
        }
        if let Some(max_total_bytes) = self.limits.max_total_bytes {
            chain.push(MaxTotalSizeFilter::new(max_total_bytes));
        }
        chain
    }

    /// The publish directory, which planning cannot do without.
    pub fn require_publish_dir(&self) -> Result<&NormalizedPath> {
        self.publish_dir
            .as_ref()
            .ok_or_else(|| Error::config("publish_dir is not set"))
    }

    /// Build the dataset this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `dataset_root` is missing or the root
    /// is not covered by the glob, and pattern errors from the selector.
    pub fn dataset<'fs>(&self, fs: &'fs dyn FileSystem) -> Result<RecursiveDataset<'fs>> {
        let root = self
            .dataset_root
            .clone()
            .ok_or_else(|| Error::config("dataset_root is not set"))?;
        let glob = self.glob.clone().unwrap_or_else(|| root.clone());

        let dataset = RecursiveDataset::new(fs, root, glob, self.policy())
            .with_boxed_selector(self.selector()?)
            .with_filters(self.filter_chain());
        if !dataset.root().is_descendant_of(&dataset.search_root()) {
            return Err(Error::config(format!(
                "dataset_root {} is not under the glob's search root {}",
                dataset.root(),
                dataset.search_root()
            )));
        }

        Ok(if self.preserve_ancestor_permissions {
            dataset.with_resolver(ReplicateAncestorPermissions)
        } else {
            dataset
        })
    }
}
