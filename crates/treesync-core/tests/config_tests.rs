//! Tests for sync configuration loading

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use treesync_core::{Error, ReconciliationPolicy, SyncConfig};
use treesync_fs::{MemoryFileSystem, NormalizedPath};
use treesync_test_utils::snapshot::memory_fs;

fn write_config(dir: &TempDir, name: &str, content: &str) -> NormalizedPath {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    NormalizedPath::new(path)
}

#[test]
fn test_load_toml_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "sync.toml",
        r#"
dataset_root = "/data/events/2024"
glob = "/data/events/*"
publish_dir = "/mirror"

[policy]
update = true
delete = true

[selection]
skip_hidden = true
exclude = ['\.tmp$']

[limits]
max_total_bytes = 1024
max_files = 10
"#,
    );

    let config = SyncConfig::load(&path).unwrap();

    assert_eq!(config.dataset_root, Some(NormalizedPath::new("/data/events/2024")));
    assert_eq!(config.require_publish_dir().unwrap().as_str(), "/mirror");
    assert_eq!(config.policy(), ReconciliationPolicy::new(true, true, false));
    assert_eq!(config.limits.max_total_bytes, Some(1024));
    assert_eq!(config.filter_chain().len(), 2);
}

#[test]
fn test_load_yaml_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "sync.yaml",
        "dataset_root: /data\npublish_dir: /mirror\npolicy:\n  delete_empty_directories: true\n",
    );

    let config = SyncConfig::load(&path).unwrap();

    assert!(config.policy().prune_empty_directories);
    assert!(!config.policy().allow_delete);
    assert!(config.filter_chain().is_empty());
}

#[test]
fn test_missing_sections_default_to_conservative() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "sync.json", r#"{"dataset_root": "/data"}"#);

    let config = SyncConfig::load(&path).unwrap();

    assert_eq!(config.policy(), ReconciliationPolicy::default());
    assert!(matches!(config.require_publish_dir(), Err(Error::Config { .. })));
}

#[test]
fn test_dataset_requires_root() {
    let fs = MemoryFileSystem::new();
    let config = SyncConfig::default();

    let err = config.dataset(&fs).err().unwrap();

    assert!(err.to_string().contains("dataset_root"));
}

#[test]
fn test_dataset_root_must_be_under_glob() {
    let fs = MemoryFileSystem::new();
    let config = SyncConfig {
        dataset_root: Some(NormalizedPath::new("/other")),
        glob: Some(NormalizedPath::new("/data/*")),
        ..SyncConfig::default()
    };

    let err = config.dataset(&fs).err().unwrap();

    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_invalid_pattern_is_reported() {
    let fs = MemoryFileSystem::new();
    let mut config = SyncConfig {
        dataset_root: Some(NormalizedPath::new("/data")),
        ..SyncConfig::default()
    };
    config.selection.include.push("(unclosed".to_string());

    let err = config.dataset(&fs).err().unwrap();

    assert!(matches!(
        err,
        Error::Fs(treesync_fs::Error::InvalidPattern { .. })
    ));
}

#[test]
fn test_configured_dataset_plans() {
    let source = memory_fs("/data", &[("keep.txt", 1, 1), ("skip.tmp", 1, 1), ("_SUCCESS", 0, 1)]);
    let target = MemoryFileSystem::new();
    let mut config = SyncConfig {
        dataset_root: Some(NormalizedPath::new("/data")),
        publish_dir: Some(NormalizedPath::new("/mirror")),
        ..SyncConfig::default()
    };
    config.selection.skip_hidden = true;
    config.selection.exclude.push(r"\.tmp$".to_string());

    let mut dataset = config.dataset(&source).unwrap();
    let plan = dataset
        .plan(&target, config.require_publish_dir().unwrap())
        .unwrap();

    let destinations: Vec<&str> = plan.copy_intents().map(|i| i.destination_path.as_str()).collect();
    assert_eq!(destinations, vec!["/mirror/keep.txt"]);
}

#[test]
fn test_config_roundtrips_through_json() {
    let dir = TempDir::new().unwrap();
    let path = NormalizedPath::new(dir.path().join("sync.json"));
    let mut config = SyncConfig {
        dataset_root: Some(NormalizedPath::new("/data")),
        publish_dir: Some(NormalizedPath::new("/mirror")),
        preserve_ancestor_permissions: true,
        ..SyncConfig::default()
    };
    config.policy.update = true;
    config.limits.max_files = Some(3);

    std::fs::write(path.to_native(), serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = SyncConfig::load(&path).unwrap();

    assert_eq!(loaded, config);
}
