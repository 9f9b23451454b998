use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rdirdiff_common::CompareStrategy;
use rdirdiff_core::checksum::{blake3_reader, md5_reader};
use rdirdiff_core::{natural_cmp, CollectingSink, DiffOptions, LocalVfs, Reporter, TreeDiffer};
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

// Helper to create test directory structure
fn create_test_tree(root: &Path, depth: usize, files_per_dir: usize, file_size: usize, fill: u8) {
    if depth == 0 {
        return;
    }

    for i in 0..files_per_dir {
        let file_path = root.join(format!("file_{}.txt", i));
        let mut file = fs::File::create(&file_path).unwrap();
        let content = vec![fill; file_size];
        file.write_all(&content).unwrap();
    }

    if depth > 1 {
        for i in 0..3 {
            let dir_path = root.join(format!("subdir_{}", i));
            fs::create_dir(&dir_path).unwrap();
            create_test_tree(&dir_path, depth - 1, files_per_dir, file_size, fill);
        }
    }
}

fn bench_natural_sort(c: &mut Criterion) {
    let names: Vec<String> = (0..2000)
        .map(|i| format!("track_{}_take{}.flac", i % 97, i))
        .collect();

    c.bench_function("natural_sort_2000", |b| {
        b.iter(|| {
            let mut sorted = names.clone();
            sorted.sort_by(|a, b| natural_cmp(a, b));
            black_box(sorted)
        })
    });
}

fn bench_checksums(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    for size in [64 * 1024, 1024 * 1024] {
        let data = vec![0xA5u8; size];
        group.bench_with_input(BenchmarkId::new("md5", size), &data, |b, data| {
            b.iter(|| md5_reader(black_box(&data[..])).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("blake3", size), &data, |b, data| {
            b.iter(|| blake3_reader(black_box(&data[..])).unwrap())
        });
    }
    group.finish();
}

fn bench_tree_diff(c: &mut Criterion) {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    create_test_tree(first.path(), 4, 10, 1024, b'x');
    create_test_tree(second.path(), 4, 10, 1024, b'y');

    let vfs = LocalVfs::new();
    let mut group = c.benchmark_group("tree_diff");
    for strategy in [CompareStrategy::SizesOnly, CompareStrategy::Md5, CompareStrategy::Blake3] {
        group.bench_function(strategy.name(), |b| {
            b.iter(|| {
                let differ = TreeDiffer::new(&vfs, &strategy, DiffOptions::default());
                let mut reporter = Reporter::new(CollectingSink::new());
                differ
                    .run(first.path(), second.path(), &mut reporter)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_natural_sort, bench_checksums, bench_tree_diff);
criterion_main!(benches);
