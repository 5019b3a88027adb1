//! A directory tree replicated file by file
//!
//! [`RecursiveDataset`] ties the pieces together: list both trees, classify,
//! build and filter copy intents, and assemble the plan.

use tracing::{debug, info};
use treesync_fs::{
    AcceptAll, FileSystem, NormalizedPath, Selector, deepest_non_wildcard_ancestor, list_tree,
};

use crate::assemble::{self, PlanAssembler};
use crate::{
    AncestorMetadataResolver, FilterChain, NoAncestorMetadata, ReconciliationPlan,
    ReconciliationPolicy, Result, reconcile,
};

/// Every file below `root` on the source filesystem.
pub struct RecursiveDataset<'fs> {
    fs: &'fs dyn FileSystem,
    root: NormalizedPath,
    /// Glob the dataset was discovered with
    glob: NormalizedPath,
    policy: ReconciliationPolicy,
    selector: Box<dyn Selector>,
    filters: FilterChain,
    resolver: Box<dyn AncestorMetadataResolver>,
}

impl<'fs> RecursiveDataset<'fs> {
    /// A dataset with no selector, no filters and no ancestor metadata.
    pub fn new(
        fs: &'fs dyn FileSystem,
        root: NormalizedPath,
        glob: NormalizedPath,
        policy: ReconciliationPolicy,
    ) -> Self {
        Self {
            fs,
            root,
            glob,
            policy,
            selector: Box::new(AcceptAll),
            filters: FilterChain::new(),
            resolver: Box::new(NoAncestorMetadata),
        }
    }

    /// Selector applied to both the source and the target listing.
    pub fn with_selector(mut self, selector: impl Selector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn with_boxed_selector(mut self, selector: Box<dyn Selector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_resolver(mut self, resolver: impl AncestorMetadataResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn policy(&self) -> &ReconciliationPolicy {
        &self.policy
    }

    /// Identifier the engine groups this dataset's work under.
    pub fn dataset_urn(&self) -> String {
        self.root.to_string()
    }

    /// Deepest concrete directory of the discovery glob.
    pub fn search_root(&self) -> NormalizedPath {
        deepest_non_wildcard_ancestor(&self.glob)
    }

    /// Where this dataset's root lands under `publish_dir`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPath` error if the root is outside the search root.
    pub fn target_root(&self, publish_dir: &NormalizedPath) -> Result<NormalizedPath> {
        let relative = self.root.relativize(&self.search_root())?;
        Ok(publish_dir.join_path(&relative))
    }

    /// Compute the plan that brings the target tree in line with the source.
    ///
    /// Both trees are listed concurrently; classification starts only once
    /// both listings are complete.
    ///
    /// # Errors
    ///
    /// Listing failures, `UpdateNotAllowed`, invalid paths and filter errors
    /// all abort planning; no partial plan is returned.
    pub fn plan(&mut self, target_fs: &dyn FileSystem, publish_dir: &NormalizedPath) -> Result<ReconciliationPlan> {
        let search_root = self.search_root();
        let target_root = self.target_root(publish_dir)?;
        debug!(
            root = %self.root,
            search_root = %search_root,
            target_root = %target_root,
            "Planning dataset"
        );

        let source_fs = self.fs;
        let selector = self.selector.as_ref();
        let (source, target) = rayon::join(
            || list_tree(source_fs, &self.root, selector),
            || list_tree(target_fs, &target_root, selector),
        );
        let (source, target) = (source?, target?);

        let classified = reconcile(&source, &target, &self.policy)?;

        let assembler = PlanAssembler::new(search_root, publish_dir.clone(), self.resolver.as_ref());
        let candidates = assembler.copy_intents(&classified.copy, &source, source_fs)?;
        let candidate_count = candidates.len();
        let copies = self.filters.apply(candidates, source_fs, target_fs)?;
        if copies.len() < candidate_count {
            info!(
                dropped = candidate_count - copies.len(),
                "Copy filters dropped candidates"
            );
        }

        let deletes = assemble::settled_delete_intents(&classified, &copies, &target);
        Ok(assemble::assemble(
            self.dataset_urn(),
            copies,
            deletes,
            &self.policy,
            &target_root,
        ))
    }
}
