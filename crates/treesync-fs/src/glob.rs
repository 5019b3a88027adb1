//! Glob helpers
//!
//! Datasets are often discovered through a wildcard selector such as
//! `/data/*/events`. Destination paths are computed relative to the
//! deepest concrete directory of that selector.

use crate::NormalizedPath;

/// Characters that make a path component a wildcard.
pub const WILDCARD_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Whether a single component contains a wildcard character.
pub fn is_wildcard(component: &str) -> bool {
    component.contains(WILDCARD_CHARS)
}

/// Whether any component of the pattern is a wildcard.
pub fn is_glob(pattern: &NormalizedPath) -> bool {
    pattern.components().any(is_wildcard)
}

/// Longest prefix of `pattern` containing no wildcard component.
///
/// A pattern with no wildcards is returned as-is. When the very first
/// component is a wildcard the result is `/` for absolute patterns and
/// `.` for relative ones.
pub fn deepest_non_wildcard_ancestor(pattern: &NormalizedPath) -> NormalizedPath {
    let concrete: Vec<&str> = pattern
        .components()
        .take_while(|component| !is_wildcard(component))
        .collect();

    let body = concrete.join("/");
    if pattern.is_network_path() {
        NormalizedPath::new(format!("//{}", body))
    } else if pattern.is_absolute() {
        NormalizedPath::new(format!("/{}", body))
    } else {
        NormalizedPath::new(body)
    }
}
