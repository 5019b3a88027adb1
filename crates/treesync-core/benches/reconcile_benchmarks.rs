use criterion::{Criterion, black_box, criterion_group, criterion_main};
use treesync_core::{RecursiveDataset, ReconciliationPolicy, reconcile};
use treesync_fs::{FileEntry, MemoryFileSystem, NormalizedPath, TreeSnapshot};

fn snapshot(root: &str, count: u64, mtime_offset: u64) -> TreeSnapshot {
    let root = NormalizedPath::new(root);
    let entries = (0..count).map(|i| {
        FileEntry::new(&root, format!("d{}/f{}.dat", i % 100, i), i, i + mtime_offset * (i % 7))
    });
    TreeSnapshot::from_entries(root.clone(), entries)
}

fn reconcile_benchmark(c: &mut Criterion) {
    let source = snapshot("/src", 50_000, 1);
    let target = snapshot("/dst", 40_000, 0);
    let policy = ReconciliationPolicy::new(true, true, false);

    c.bench_function("reconcile (50k vs 40k entries)", |b| {
        b.iter(|| reconcile(black_box(&source), black_box(&target), &policy).unwrap())
    });
}

fn plan_benchmark(c: &mut Criterion) {
    let source = MemoryFileSystem::new();
    let target = MemoryFileSystem::new();
    for i in 0..5_000u64 {
        source.add_file(format!("/data/d{}/f{}.dat", i % 50, i), i, 10);
        if i % 3 == 0 {
            target.add_file(format!("/mirror/d{}/f{}.dat", i % 50, i), i, 10);
        }
    }
    let root = NormalizedPath::new("/data");
    let publish = NormalizedPath::new("/mirror");

    c.bench_function("plan (memory, 5000 files)", |b| {
        b.iter(|| {
            let mut dataset =
                RecursiveDataset::new(&source, root.clone(), root.clone(), ReconciliationPolicy::default());
            dataset.plan(&target, black_box(&publish)).unwrap()
        })
    });
}

criterion_group!(benches, reconcile_benchmark, plan_benchmark);
criterion_main!(benches);
