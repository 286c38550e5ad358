//! Criterion microbenches for regionkit parsing, serialization, and hit
//! testing.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use regionkit::geom::{Coord, ItemViewport};
use regionkit::region::{Rect, Shape};
use regionkit::tree::AnnotationTree;
use regionkit::wire::{deserialize_results, from_results_str};

// Include test fixtures at compile time (no file I/O during benchmark)
const RESULTS_FIXTURE: &str = include_str!("../tests/fixtures/sample_valid.results.json");

/// Benchmark results JSON parsing plus region reconstruction.
fn bench_results_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("results_parse");
    group.throughput(Throughput::Bytes(RESULTS_FIXTURE.len() as u64));

    group.bench_function("from_results_str", |b| {
        b.iter(|| {
            let records = from_results_str(black_box(RESULTS_FIXTURE)).unwrap();
            black_box(records)
        })
    });

    let records = from_results_str(RESULTS_FIXTURE).unwrap();
    group.bench_function("deserialize_results", |b| {
        b.iter(|| {
            let tree = deserialize_results(black_box(&records)).unwrap();
            black_box(tree)
        })
    });

    group.finish();
}

/// Benchmark serializing a populated tree back to wire records.
fn bench_tree_serialize(c: &mut Criterion) {
    let records = from_results_str(RESULTS_FIXTURE).unwrap();
    let mut tree = AnnotationTree::new("image", ItemViewport::new(1000, 800));
    tree.deserialize(&records).unwrap();

    let mut group = c.benchmark_group("tree_serialize");
    group.bench_function("serialize", |b| {
        b.iter(|| {
            let out = tree.serialize();
            black_box(out)
        })
    });
    group.finish();
}

/// Benchmark hit testing across a grid of rectangles.
fn bench_hit_test(c: &mut Criterion) {
    let mut tree = AnnotationTree::new("image", ItemViewport::new(1000, 800));
    for row in 0..10 {
        for col in 0..10 {
            tree.insert_region(Shape::Rect(Rect::new(
                col as f64 * 10.0,
                row as f64 * 10.0,
                9.0,
                9.0,
            )));
        }
    }

    let mut group = c.benchmark_group("hit_test");
    group.bench_function("hit_test_100_regions", |b| {
        b.iter(|| {
            let hit = tree.hit_test(black_box(Coord::new(555.0, 333.0)));
            black_box(hit)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_results_parse,
    bench_tree_serialize,
    bench_hit_test
);
criterion_main!(benches);
