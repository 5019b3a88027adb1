//! Plans executed by a minimal engine on real directories
//!
//! The engine here copies bytes and commits the delete step stage by
//! stage, the way a real execution engine is expected to honor the
//! plan's dependency edges.

use std::fs;

use filetime::FileTime;
use pretty_assertions::assert_eq;
use treesync_core::{ReconciliationPlan, RecursiveDataset, ReconciliationPolicy, WorkUnit};
use treesync_fs::{FileSystem, LocalFileSystem, NormalizedPath};
use treesync_test_utils::tree::TestTree;

const T0: i64 = 1_700_000_000;

/// Run every stage in order: copies first, then the delete step.
fn execute(plan: &ReconciliationPlan, fs: &LocalFileSystem) -> Vec<String> {
    let mut log = Vec::new();
    for stage in plan.stages() {
        for planned in stage {
            match &planned.unit {
                WorkUnit::Copy(intent) => {
                    let destination = intent.destination_path.to_native();
                    fs::create_dir_all(destination.parent().unwrap()).unwrap();
                    let staging = destination.with_extension("staging");
                    fs::copy(intent.source_entry.absolute_path.to_native(), &staging).unwrap();
                    let mtime = FileTime::from_unix_time(
                        (intent.source_entry.modification_time_millis / 1000) as i64,
                        0,
                    );
                    filetime::set_file_mtime(&staging, mtime).unwrap();
                    fs::rename(&staging, &destination).unwrap();
                    log.push(format!("copy {}", intent.source_entry.relative_path));
                }
                WorkUnit::DeleteStep(step) => {
                    let outcome = step.execute(fs).unwrap();
                    log.push(format!("delete {}", outcome.deleted.len()));
                }
            }
        }
    }
    log
}

fn plan(tree: &TestTree, policy: ReconciliationPolicy) -> ReconciliationPlan {
    let fs = LocalFileSystem::new();
    let root = tree.path("src");
    let mut dataset = RecursiveDataset::new(&fs, root.clone(), root, policy);
    dataset.plan(&fs, &tree.path("dst")).unwrap()
}

#[test]
fn full_sync_converges() {
    let tree = TestTree::new();
    tree.file("src/keep.txt", 3, T0);
    tree.file("src/changed.txt", 5, T0 + 100);
    tree.file("src/new/deep/file.txt", 7, T0);
    tree.file("dst/keep.txt", 3, T0);
    tree.file("dst/changed.txt", 4, T0);
    tree.file("dst/stale/old.txt", 1, T0);
    let policy = ReconciliationPolicy::new(true, true, true);

    let first = plan(&tree, policy);
    assert_eq!(first.copy_count(), 2);
    assert_eq!(first.stages().len(), 2);

    let log = execute(&first, &LocalFileSystem::new());
    assert_eq!(log, vec!["copy changed.txt", "copy new/deep/file.txt", "delete 1"]);

    tree.assert_exists("dst/new/deep/file.txt");
    tree.assert_exists("dst/changed.txt");
    tree.assert_missing("dst/stale");
    assert_eq!(fs::read(tree.root().join("dst/changed.txt")).unwrap().len(), 5);

    let second = plan(&tree, policy);
    assert!(second.is_empty(), "second plan: {:?}", second);
}

#[test]
fn plan_survives_json_handoff() {
    let tree = TestTree::new();
    tree.file("src/a.txt", 2, T0);
    tree.file("dst/b.txt", 2, T0);
    let policy = ReconciliationPolicy::new(false, true, false);

    let plan = plan(&tree, policy);
    let json = serde_json::to_string(&plan).unwrap();
    let restored: ReconciliationPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, plan);

    let log = execute(&restored, &LocalFileSystem::new());
    assert_eq!(log, vec!["copy a.txt", "delete 1"]);
    tree.assert_missing("dst/b.txt");
    tree.assert_exists("dst/a.txt");
}

#[test]
fn delete_step_is_completed_after_execution() {
    let tree = TestTree::new();
    tree.dir("src");
    tree.file("dst/x/y.txt", 1, T0);
    let policy = ReconciliationPolicy::new(false, true, false);
    let fs = LocalFileSystem::new();

    let plan = plan(&tree, policy);
    let step = plan.delete_step().unwrap();
    assert!(!step.is_completed(&fs));

    step.execute(&fs).unwrap();

    assert!(step.is_completed(&fs));
    assert!(fs.exists(&tree.path("dst/x")));
}

#[cfg(unix)]
#[test]
fn ancestor_permissions_are_captured_from_disk() {
    use std::os::unix::fs::PermissionsExt;
    use treesync_core::ReplicateAncestorPermissions;

    let tree = TestTree::new();
    tree.file("src/2024/01/a.log", 1, T0);
    fs::set_permissions(tree.root().join("src/2024"), fs::Permissions::from_mode(0o750)).unwrap();

    let fs = LocalFileSystem::new();
    let mut dataset = RecursiveDataset::new(
        &fs,
        tree.path("src/2024"),
        NormalizedPath::new(format!("{}/*", tree.path("src"))),
        ReconciliationPolicy::default(),
    )
    .with_resolver(ReplicateAncestorPermissions);
    let plan = dataset.plan(&fs, &tree.path("dst")).unwrap();

    let intent = plan.copy_intents().next().unwrap();
    assert_eq!(intent.destination_path, tree.path("dst/2024/01/a.log"));
    let ancestors = intent.ancestor_metadata.ancestors();
    assert_eq!(ancestors.len(), 2);
    assert_eq!(ancestors[1].path, tree.path("src/2024"));
    assert_eq!(ancestors[1].mode.map(|mode| mode & 0o777), Some(0o750));
}
