//! Copy candidate filters
//!
//! Filters thin the list of copy intents before a plan is assembled, for
//! instance to respect a transfer budget. They may keep state across calls
//! but may only drop candidates: order is preserved and nothing is added.
//! [`FilterChain`] checks that contract after every filter runs.

use treesync_fs::FileSystem;

use crate::{CopyIntent, Error, Result};

/// A predicate over copy candidates.
pub trait CopyFilter: Send {
    /// Name used in errors and logs.
    fn name(&self) -> &str;

    fn filter(
        &mut self,
        candidates: Vec<CopyIntent>,
        source_fs: &dyn FileSystem,
        target_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>>;
}

/// Filters applied in order, each seeing the previous one's output.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn CopyFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl CopyFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: impl CopyFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter.
    ///
    /// # Errors
    ///
    /// Propagates the first filter error, or [`Error::FilterContract`] if a
    /// filter returns something other than an ordered subsequence of its
    /// input.
    pub fn apply(
        &mut self,
        mut candidates: Vec<CopyIntent>,
        source_fs: &dyn FileSystem,
        target_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>> {
        for filter in &mut self.filters {
            let before = candidates.clone();
            let after = filter.filter(candidates, source_fs, target_fs)?;
            check_subsequence(filter.name(), &before, &after)?;
            tracing::debug!(
                filter = filter.name(),
                kept = after.len(),
                dropped = before.len() - after.len(),
                "Applied copy filter"
            );
            candidates = after;
        }
        Ok(candidates)
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

fn check_subsequence(name: &str, before: &[CopyIntent], after: &[CopyIntent]) -> Result<()> {
    let mut remaining = before.iter();
    for kept in after {
        if !remaining.any(|candidate| candidate == kept) {
            return Err(Error::FilterContract {
                filter: name.to_string(),
                message: format!(
                    "{} is new, duplicated or out of order",
                    kept.destination_path
                ),
            });
        }
    }
    Ok(())
}

/// Stops admitting candidates once their combined size would exceed a
/// byte budget. The budget is shared by every call on the same filter.
#[derive(Debug, Clone)]
pub struct MaxTotalSizeFilter {
    budget_bytes: u64,
    used_bytes: u64,
}

impl MaxTotalSizeFilter {
    pub fn new(budget_bytes: u64) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
        }
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }
}

impl CopyFilter for MaxTotalSizeFilter {
    fn name(&self) -> &str {
        "max-total-size"
    }

    fn filter(
        &mut self,
        candidates: Vec<CopyIntent>,
        _source_fs: &dyn FileSystem,
        _target_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>> {
        let mut kept = Vec::with_capacity(candidates.len());
        for intent in candidates {
            let size = intent.source_entry.size_bytes;
            match self.used_bytes.checked_add(size) {
                Some(total) if total <= self.budget_bytes => {
                    self.used_bytes = total;
                    kept.push(intent);
                }
                _ => {}
            }
        }
        Ok(kept)
    }
}

/// Admits at most `max_files` candidates across all calls.
#[derive(Debug, Clone)]
pub struct MaxFileCountFilter {
    max_files: usize,
    admitted: usize,
}

impl MaxFileCountFilter {
    pub fn new(max_files: usize) -> Self {
        Self {
            max_files,
            admitted: 0,
        }
    }
}

impl CopyFilter for MaxFileCountFilter {
    fn name(&self) -> &str {
        "max-file-count"
    }

    fn filter(
        &mut self,
        mut candidates: Vec<CopyIntent>,
        _source_fs: &dyn FileSystem,
        _target_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>> {
        let room = self.max_files.saturating_sub(self.admitted);
        candidates.truncate(room);
        self.admitted += candidates.len();
        Ok(candidates)
    }
}

/// Keeps candidates accepted by a closure.
pub struct PredicateFilter<F> {
    name: String,
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: FnMut(&CopyIntent) -> bool + Send,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> CopyFilter for PredicateFilter<F>
where
    F: FnMut(&CopyIntent) -> bool + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(
        &mut self,
        mut candidates: Vec<CopyIntent>,
        _source_fs: &dyn FileSystem,
        _target_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>> {
        candidates.retain(|intent| (self.predicate)(intent));
        Ok(candidates)
    }
}

/// Drops candidates whose destination already exists on the target.
///
/// Useful for append-only publishing where a file, once landed, is never
/// rewritten even if the source changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestinationExistsFilter;

impl CopyFilter for DestinationExistsFilter {
    fn name(&self) -> &str {
        "destination-exists"
    }

    fn filter(
        &mut self,
        mut candidates: Vec<CopyIntent>,
        _source_fs: &dyn FileSystem,
        target_fs: &dyn FileSystem,
    ) -> Result<Vec<CopyIntent>> {
        candidates.retain(|intent| !target_fs.exists(&intent.destination_path));
        Ok(candidates)
    }
}
