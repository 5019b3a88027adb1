//! Sync planning for treesync
//!
//! This crate decides what it takes to make a target directory tree mirror
//! a source tree, and expresses the answer as a [`ReconciliationPlan`] for
//! an execution engine:
//!
//! - **Reconciliation**: classify every relative path as copy, delete or
//!   unchanged under a [`ReconciliationPolicy`]
//! - **Filtering**: thin copy candidates with a [`FilterChain`]
//! - **Assembly**: copies first, then one [`DeleteStep`] that depends on
//!   every copy
//! - **Commit**: apply a delete step, pruning emptied directories
//!
//! # Architecture
//!
//! ```text
//!                 treesync-cli
//!                      |
//!                treesync-core
//!                      |
//!                 treesync-fs
//! ```
//!
//! # Example
//!
//! ```
//! use treesync_core::{RecursiveDataset, ReconciliationPolicy};
//! use treesync_fs::{MemoryFileSystem, NormalizedPath};
//!
//! let source = MemoryFileSystem::new().with_file("/data/a.txt", 10, 1_000);
//! let target = MemoryFileSystem::new();
//!
//! let root = NormalizedPath::new("/data");
//! let mut dataset = RecursiveDataset::new(&source, root.clone(), root, ReconciliationPolicy::default());
//! let plan = dataset.plan(&target, &NormalizedPath::new("/mirror")).unwrap();
//!
//! assert_eq!(plan.copy_count(), 1);
//! assert!(plan.delete_step().is_none());
//! ```

pub mod ancestor;
pub mod assemble;
pub mod commit;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod plan;
pub mod policy;
pub mod reconcile;

pub use ancestor::{
    AncestorMetadata, AncestorMetadataResolver, AncestorPermission, NoAncestorMetadata,
    ReplicateAncestorPermissions,
};
pub use assemble::{PlanAssembler, assemble, delete_intents, settled_delete_intents};
pub use commit::DeleteOutcome;
pub use config::{LimitsConfig, PolicyConfig, SelectionConfig, SyncConfig};
pub use dataset::RecursiveDataset;
pub use error::{Error, Result};
pub use filter::{
    CopyFilter, DestinationExistsFilter, FilterChain, MaxFileCountFilter, MaxTotalSizeFilter,
    PredicateFilter,
};
pub use plan::{
    CopyIntent, DeleteIntent, DeleteStep, PlannedUnit, ReconciliationPlan, UnitId, WorkUnit,
};
pub use policy::ReconciliationPolicy;
pub use reconcile::{Reconciliation, reconcile, same_file};
