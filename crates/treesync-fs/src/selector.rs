//! File selection predicates applied while listing a tree

use regex::Regex;

use crate::{Error, NormalizedPath, Result};

/// Decides whether a listed file belongs to the tree snapshot.
///
/// Selectors see each regular file's path relative to the listing root, so
/// one selector gives the same answer for a source tree and its mirror.
pub trait Selector: Send + Sync {
    fn accept(&self, path: &NormalizedPath) -> bool;
}

impl<F> Selector for F
where
    F: Fn(&NormalizedPath) -> bool + Send + Sync,
{
    fn accept(&self, path: &NormalizedPath) -> bool {
        self(path)
    }
}

/// Accepts every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Selector for AcceptAll {
    fn accept(&self, _path: &NormalizedPath) -> bool {
        true
    }
}

/// Rejects files whose name starts with `.` or `_`.
///
/// Staging and marker files (`_SUCCESS`, `.part-0001.crc`) are skipped
/// this way.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenFileSelector;

impl Selector for HiddenFileSelector {
    fn accept(&self, path: &NormalizedPath) -> bool {
        path.file_name()
            .is_some_and(|name| !name.starts_with('.') && !name.starts_with('_'))
    }
}

/// Include/exclude regular expressions matched against the path relative
/// to the listing root.
///
/// With no include patterns every path is a candidate; any exclude match
/// rejects the path.
#[derive(Debug, Clone, Default)]
pub struct RegexSelector {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl RegexSelector {
    /// Compile include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first pattern that fails
    /// to compile.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }
}

impl Selector for RegexSelector {
    fn accept(&self, path: &NormalizedPath) -> bool {
        let path = path.as_str();
        let included = self.include.is_empty() || self.include.iter().any(|re| re.is_match(path));
        included && !self.exclude.iter().any(|re| re.is_match(path))
    }
}

/// All selectors must accept.
#[derive(Default)]
pub struct AllOf(Vec<Box<dyn Selector>>);

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: impl Selector + 'static) -> Self {
        self.0.push(Box::new(selector));
        self
    }
}

impl Selector for AllOf {
    fn accept(&self, path: &NormalizedPath) -> bool {
        self.0.iter().all(|selector| selector.accept(path))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern.as_ref()).map_err(|e| Error::InvalidPattern {
                pattern: pattern.as_ref().to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}
