use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;
use treesync_fs::{Error, NormalizedPath, io};

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("plans/2024/plan.json"));

    io::write_atomic(&path, b"{}").unwrap();

    assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("plan.json");
    fs::write(&file_path, "original").unwrap();

    io::write_atomic(&NormalizedPath::new(&file_path), b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    io::write_atomic(&NormalizedPath::new(temp.path().join("plan.json")), b"content").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temp files: {leftovers:?}");
}

#[test]
fn test_read_text_missing_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let err = io::read_text(&NormalizedPath::new(temp.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_concurrent_writes_to_different_files_all_succeed() {
    let dir = TempDir::new().unwrap();
    let num_threads = 5;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let dir_path = dir.path().to_path_buf();
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                let path = NormalizedPath::new(dir_path.join(format!("plan_{}.json", thread_id)));
                io::write_atomic(&path, format!("{{\"id\": {}}}", thread_id).as_bytes()).is_ok()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("Thread should not panic"));
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), num_threads);
}
