//! Performance benchmarks for statdiff

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use statdiff::compare::contents_equal;
use statdiff::test_utils::{Side, TreePair};
use statdiff::{CompareConfig, ComparisonPolicy, compare, compare_parallel};

fn create_tree_pair(dir_count: usize, files_per_dir: usize) -> TreePair {
    let pair = TreePair::new();
    for d in 0..dir_count {
        for f in 0..files_per_dir {
            let path = format!("dir_{}/file_{}.txt", d, f);
            let content = format!("directory {} file {}\n", d, f).repeat(64);
            pair.add_both(&path, &content);
        }
    }
    pair
}

fn bench_content_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_comparison");

    let pair = TreePair::new();
    let data = vec![0xA5u8; 4 * 1024 * 1024];
    let old = pair.add_file(Side::Old, "large.bin", &data);
    let new = pair.add_file(Side::New, "large.bin", &data);

    for block_size in [4 * 1024, 8 * 1024, 64 * 1024] {
        group.bench_function(format!("identical_4mb_block_{}", block_size), |b| {
            b.iter(|| contents_equal(black_box(&old), black_box(&new), block_size))
        });
    }

    let mut changed = data.clone();
    changed[0] = 0;
    let early = pair.add_file(Side::New, "early.bin", &changed);
    group.bench_function("first_byte_differs", |b| {
        b.iter(|| contents_equal(black_box(&old), black_box(&early), 8 * 1024))
    });

    group.finish();
}

fn bench_tree_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_walk");

    // Small tree (10 files)
    let small = create_tree_pair(2, 5);
    group.bench_function("small_tree_10_files", |b| {
        b.iter(|| {
            compare(small.old_root(), small.new_root(), ComparisonPolicy::default()).count()
        })
    });

    // Larger tree (500 files)
    let large = create_tree_pair(20, 25);
    group.bench_function("sequential_500_files", |b| {
        b.iter(|| {
            compare(large.old_root(), large.new_root(), ComparisonPolicy::default()).count()
        })
    });

    let config = CompareConfig::default().with_parallel_workers(0);
    group.bench_function("parallel_500_files", |b| {
        b.iter(|| compare_parallel(&large.old_root(), &large.new_root(), black_box(&config)))
    });

    group.finish();
}

criterion_group!(benches, bench_content_comparison, bench_tree_walk);
criterion_main!(benches);
