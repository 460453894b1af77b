//! Benchmarks for HNSW index construction, search and deletion.
//!
//! These benchmarks measure end-to-end performance on synthetic data, with the exact
//! linear scan as a baseline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use navgraph::benchmark::{evaluate, generate_clustered_dataset, EvalDataset};
use navgraph::{BruteForceIndex, DocId, FlatVectors, HnswIndex, HnswParams};
use roaring::RoaringBitmap;
use std::time::Instant;

const DIM: usize = 32;

fn dataset(n: usize) -> (EvalDataset, FlatVectors) {
    let dataset = generate_clustered_dataset("bench", n, 100, DIM, 32, 0.1, 10, 42);
    let vectors = dataset.store().expect("generated rows have DIM columns");
    (dataset, vectors)
}

fn build(vectors: &FlatVectors, n: usize) -> HnswIndex<&FlatVectors> {
    let params = HnswParams {
        m: 16,
        ef_construction: 100,
        seed: Some(7),
        ..Default::default()
    };
    let mut index = HnswIndex::new(DIM, vectors, params).expect("valid params");
    for id in 0..n as DocId {
        index.add_doc(id);
    }
    index
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_build");
    group.sample_size(10);

    for n in [1_000, 5_000] {
        let (_, vectors) = dataset(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("n", n), &n, |b, &n| {
            b.iter(|| black_box(build(&vectors, n)))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let n = 10_000;
    let (dataset, vectors) = dataset(n);
    let index = build(&vectors, n);

    let mut group = c.benchmark_group("hnsw_top_k");
    group.throughput(Throughput::Elements(dataset.queries.len() as u64));
    for search_k in [10, 50, 100, 200] {
        group.bench_with_input(
            BenchmarkId::new("search_k", search_k),
            &search_k,
            |b, &search_k| {
                b.iter(|| {
                    for q in &dataset.queries {
                        black_box(index.top_k(10, q, search_k));
                    }
                })
            },
        );
    }

    let mut exact = BruteForceIndex::new(DIM, &vectors).expect("matching dims");
    for id in 0..n as DocId {
        exact.add_doc(id);
    }
    group.bench_function("brute_force", |b| {
        b.iter(|| {
            for q in &dataset.queries {
                black_box(exact.top_k(10, q));
            }
        })
    });
    group.finish();
}

/// Recall/latency tradeoff: one timed pass per `search_k`, summarized before the
/// criterion measurement.
fn bench_recall_vs_search_k(c: &mut Criterion) {
    let n = 10_000;
    let (dataset, vectors) = dataset(n);
    let started = Instant::now();
    let index = build(&vectors, n);
    let build_time = started.elapsed();

    let mut group = c.benchmark_group("recall_vs_search_k");
    group.sample_size(10);
    for search_k in [10, 20, 50, 100, 200] {
        let results = evaluate(
            &dataset,
            "HNSW",
            &format!("M=16,search_k={search_k}"),
            build_time,
            index.size_bytes(),
            |q, k| index.top_k(k, q, search_k).into_iter().map(|(id, _)| id).collect(),
        );
        eprintln!("{}", results.summary());

        group.bench_with_input(
            BenchmarkId::new("search_k", search_k),
            &search_k,
            |b, &search_k| {
                b.iter(|| {
                    for q in &dataset.queries {
                        black_box(index.top_k(dataset.k, q, search_k));
                    }
                })
            },
        );
    }
    group.finish();
}

fn bench_filtered(c: &mut Criterion) {
    let n = 10_000;
    let (dataset, vectors) = dataset(n);
    let index = build(&vectors, n);

    let mut group = c.benchmark_group("hnsw_top_k_filter");
    for pct in [10u32, 50, 90, 99] {
        let exclude: RoaringBitmap = (0..n as u32).filter(|id| id % 100 < pct).collect();
        group.bench_with_input(BenchmarkId::new("excluded_pct", pct), &exclude, |b, exclude| {
            b.iter(|| {
                for q in &dataset.queries {
                    black_box(index.top_k_filter(10, q, 50, exclude));
                }
            })
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let n = 2_000;
    let (_, vectors) = dataset(n);

    let mut group = c.benchmark_group("hnsw_remove");
    group.sample_size(10);
    group.throughput(Throughput::Elements(200));
    group.bench_function("remove_200_reinsert", |b| {
        // Every iteration starts from a freshly built graph.
        b.iter_batched(
            || build(&vectors, n),
            |mut index| {
                for id in (0..n as DocId).step_by(10) {
                    index.remove_doc(id);
                }
                for id in (0..n as DocId).step_by(10) {
                    index.add_doc(id);
                }
                black_box(index)
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_search,
    bench_recall_vs_search_k,
    bench_filtered,
    bench_remove
);
criterion_main!(benches);
