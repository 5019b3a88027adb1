//! Shared test utilities for the treesync workspace.
//!
//! This crate provides standardised fixtures so every crate describes its
//! source and target trees the same way. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`tree`]: [`tree::TestTree`], a real directory tree on disk with
//!   controlled sizes and modification times
//! - [`snapshot`]: in-memory snapshots and filesystems built from a
//!   compact `(path, size, mtime)` description

pub mod snapshot;
pub mod tree;
