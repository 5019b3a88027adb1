//! Reconciliation on real directories
//!
//! Each test lays out a source and a target tree on disk, lists them
//! through `LocalFileSystem` and checks the classification and the plan.

use pretty_assertions::assert_eq;
use rstest::rstest;
use treesync_core::{Error, RecursiveDataset, ReconciliationPolicy, reconcile};
use treesync_fs::{AcceptAll, LocalFileSystem, NormalizedPath, list_tree};
use treesync_test_utils::tree::TestTree;

const T5: i64 = 1_700_000_005;
const T10: i64 = 1_700_000_010;

struct Scenario {
    tree: TestTree,
}

impl Scenario {
    fn new(source: &[(&str, usize, i64)], target: &[(&str, usize, i64)]) -> Self {
        let tree = TestTree::new();
        tree.dir("src");
        for &(path, size, mtime) in source {
            tree.file(&format!("src/{path}"), size, mtime);
        }
        for &(path, size, mtime) in target {
            tree.file(&format!("dst/{path}"), size, mtime);
        }
        Self { tree }
    }

    fn source(&self) -> NormalizedPath {
        self.tree.path("src")
    }

    fn target(&self) -> NormalizedPath {
        self.tree.path("dst")
    }

    fn classify(&self, policy: ReconciliationPolicy) -> treesync_core::Result<(Vec<String>, Vec<String>)> {
        let fs = LocalFileSystem::new();
        let source = list_tree(&fs, &self.source(), &AcceptAll)?;
        let target = list_tree(&fs, &self.target(), &AcceptAll)?;
        let result = reconcile(&source, &target, &policy)?;
        Ok((
            result.copy.iter().map(|p| p.to_string()).collect(),
            result.delete.iter().map(|p| p.to_string()).collect(),
        ))
    }
}

#[test]
fn new_file_is_copied() {
    let scenario = Scenario::new(&[("a", 10, T5)], &[]);

    let (copy, delete) = scenario.classify(ReconciliationPolicy::default()).unwrap();

    assert_eq!(copy, vec!["a"]);
    assert!(delete.is_empty());
}

#[test]
fn identical_file_is_skipped() {
    let scenario = Scenario::new(&[("a", 10, T5)], &[("a", 10, T5)]);

    let (copy, delete) = scenario.classify(ReconciliationPolicy::default()).unwrap();

    assert!(copy.is_empty());
    assert!(delete.is_empty());
}

#[test]
fn changed_file_without_update_fails() {
    let scenario = Scenario::new(&[("a", 10, T10)], &[("a", 10, T5)]);

    let err = scenario.classify(ReconciliationPolicy::default()).unwrap_err();

    assert!(matches!(err, Error::UpdateNotAllowed { .. }));
}

#[test]
fn changed_file_with_update_is_replaced() {
    let scenario = Scenario::new(&[("a", 10, T10)], &[("a", 10, T5)]);

    let (copy, delete) = scenario
        .classify(ReconciliationPolicy::default().with_update(true))
        .unwrap();

    assert_eq!(copy, vec!["a"]);
    assert_eq!(delete, vec!["a"]);
}

#[rstest]
#[case::prune(true)]
#[case::keep_dirs(false)]
fn stale_file_is_deleted(#[case] prune: bool) {
    let scenario = Scenario::new(&[], &[("b", 5, T5)]);
    let policy = ReconciliationPolicy::new(false, true, prune);

    let (copy, delete) = scenario.classify(policy).unwrap();
    assert!(copy.is_empty());
    assert_eq!(delete, vec!["b"]);

    let fs = LocalFileSystem::new();
    let root = scenario.source();
    let mut dataset = RecursiveDataset::new(&fs, root.clone(), root, policy);
    let plan = dataset.plan(&fs, &scenario.target()).unwrap();
    assert_eq!(plan.delete_step().unwrap().prune_empty_directories, prune);
}

#[test]
fn missing_target_root_is_empty() {
    let scenario = Scenario::new(&[("a", 10, T5), ("x/y", 1, T5)], &[]);
    scenario.tree.assert_missing("dst");

    let fs = LocalFileSystem::new();
    let target = list_tree(&fs, &scenario.target(), &AcceptAll).unwrap();
    assert!(target.is_empty());

    let (copy, delete) = scenario.classify(ReconciliationPolicy::default()).unwrap();
    assert_eq!(copy, vec!["a", "x/y"]);
    assert!(delete.is_empty());
}

#[test]
fn same_size_newer_target_is_trusted() {
    let scenario = Scenario::new(&[("a", 10, T5)], &[("a", 10, T10)]);

    let (copy, delete) = scenario.classify(ReconciliationPolicy::default()).unwrap();

    assert!(copy.is_empty());
    assert!(delete.is_empty());
}

#[test]
fn size_change_always_needs_copy() {
    let scenario = Scenario::new(&[("a", 10, T5)], &[("a", 11, T10)]);

    let err = scenario.classify(ReconciliationPolicy::default()).unwrap_err();

    assert!(err.is_update_not_allowed());
}
