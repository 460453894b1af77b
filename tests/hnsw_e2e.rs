//! End-to-end tests validating the HNSW index actually works.
//!
//! These build real graphs over synthetic data and compare against exact search, rather
//! than checking internals.

#![cfg(feature = "hnsw")]

use std::sync::Arc;
use std::time::Instant;

use navgraph::benchmark::{
    evaluate, generate_clustered_dataset, generate_uniform_dataset, mean_recall,
};
use navgraph::hnsw::DEFAULT_EF_CONSTRUCTION;
use navgraph::{
    AnnIndex, BruteForceIndex, DocId, FlatVectors, HnswIndex, HnswParams, SharedIndex,
    VectorSource,
};

fn params(m: usize, ef_construction: usize, seed: u64) -> HnswParams {
    HnswParams {
        m,
        ef_construction,
        seed: Some(seed),
        ..Default::default()
    }
}

fn build<V: VectorSource>(vectors: V, num_dims: usize, n: usize, p: HnswParams) -> HnswIndex<V> {
    let mut index = HnswIndex::new(num_dims, vectors, p).expect("valid params");
    for id in 0..n as DocId {
        index.add_doc(id);
    }
    index
}

fn ids(hits: &[(DocId, f64)]) -> Vec<DocId> {
    hits.iter().map(|&(id, _)| id).collect()
}

#[test]
fn four_point_scenario() {
    let vectors = FlatVectors::from_rows(
        4,
        [
            [0.0f32, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [10.0, 10.0, 10.0, 10.0],
        ],
    )
    .unwrap();
    let index = build(&vectors, 4, 4, params(4, 200, 1));
    index.validate_links().unwrap();

    let origin = [0.0f32; 4];
    assert_eq!(index.top_k(1, &origin, 10), vec![(0, 0.0)]);

    let two = index.top_k(2, &origin, 10);
    assert_eq!(two.len(), 2);
    assert_eq!(two[0], (0, 0.0));
    assert!(two[1].0 == 1 || two[1].0 == 2, "unexpected second hit {:?}", two[1]);
    assert_eq!(two[1].1, 1.0);
}

#[test]
fn every_document_finds_itself() {
    let dataset = generate_uniform_dataset("self", 300, 1, 8, 1, 7);
    let vectors = dataset.store().unwrap();
    let index = build(&vectors, 8, 300, params(8, 100, 2));

    for id in 0..300 {
        let hits = index.top_k(1, vectors.get(id).unwrap(), 300);
        assert_eq!(hits, vec![(id, 0.0)], "document {id} not found");
    }
}

#[test]
fn recall_against_brute_force() {
    let dataset = generate_clustered_dataset("clustered", 1000, 50, 16, 20, 0.08, 10, 42);
    let vectors = Arc::new(dataset.store().unwrap());
    let started = Instant::now();
    let hnsw = build(Arc::clone(&vectors), 16, 1000, params(16, 200, 3));
    let build_time = started.elapsed();
    let mut exact = BruteForceIndex::new(16, Arc::clone(&vectors)).unwrap();
    for id in 0..1000 {
        exact.add_doc(id);
    }

    let approx: Vec<Vec<DocId>> = dataset
        .queries
        .iter()
        .map(|q| ids(&hnsw.top_k(10, q, 100)))
        .collect();
    let truth: Vec<Vec<DocId>> = dataset
        .queries
        .iter()
        .map(|q| ids(&AnnIndex::top_k(&exact, 10, q, 0)))
        .collect();

    assert_eq!(truth, dataset.ground_truth);
    let recall = mean_recall(&approx, &truth, 10);
    assert!(recall >= 0.9, "recall too low: {recall}");

    let results = evaluate(
        &dataset,
        "HNSW",
        "M=16,search_k=100",
        build_time,
        hnsw.size_bytes(),
        |q, k| ids(&hnsw.top_k(k, q, 100)),
    );
    eprintln!("{}", results.summary());
    assert_eq!(results.recalls.len(), dataset.n_queries());
    assert!((results.mean_recall() - recall).abs() < 1e-6);
}

#[test]
fn recall_grows_with_search_k() {
    let dataset = generate_uniform_dataset("uniform", 2000, 40, 24, 10, 11);
    let vectors = dataset.store().unwrap();
    let index = build(&vectors, 24, 2000, params(6, 40, 4));

    let mut recalls = Vec::new();
    for search_k in [10, 20, 40, 80, 160, 320] {
        let approx: Vec<Vec<DocId>> = dataset
            .queries
            .iter()
            .map(|q| ids(&index.top_k(10, q, search_k)))
            .collect();
        let recall = mean_recall(&approx, &dataset.ground_truth, 10);
        eprintln!("search_k={search_k}: recall@10={:.1}%", recall * 100.0);
        recalls.push(recall);
    }

    for pair in recalls.windows(2) {
        assert!(pair[1] + 0.02 >= pair[0], "recall dropped: {recalls:?}");
    }
    assert!(recalls[recalls.len() - 1] > recalls[0]);
}

#[test]
fn insert_remove_round_trip_forward_and_reverse() {
    let n = 1000;
    let dataset = generate_uniform_dataset("churn", n, 1, 8, 1, 21);
    let vectors = dataset.store().unwrap();
    let mut index = build(&vectors, 8, n, params(8, 64, 5));
    index.validate_links().unwrap();

    // Forward removal, checking that queries only ever see survivors.
    for id in 0..n as DocId {
        index.remove_doc(id);
        if id % 100 == 99 {
            index.validate_links().unwrap();
            let live = n - id as usize - 1;
            assert_eq!(index.len(), live);
            if live > 0 {
                let hits = index.top_k(20, &[0.5; 8], 64);
                assert!(!hits.is_empty());
                assert!(hits.iter().all(|&(h, _)| h > id && index.contains(h)));
            }
        }
    }
    assert!(index.is_empty());
    assert_eq!(index.entry_point(), None);
    assert!(index.top_k(5, &[0.5; 8], 10).is_empty());

    // Same ids again, removed in reverse.
    for id in 0..n as DocId {
        index.add_doc(id);
    }
    assert_eq!(index.len(), n);
    index.validate_links().unwrap();
    for id in (0..n as DocId).rev() {
        index.remove_doc(id);
        if id % 100 == 0 {
            index.validate_links().unwrap();
        }
    }
    assert!(index.is_empty());
    assert_eq!(index.entry_point(), None);
}

#[test]
fn heavy_deletion_keeps_every_survivor_reachable() {
    let n = 1500;
    let dataset = generate_clustered_dataset("survivors", n, 5, 12, 15, 0.1, 10, 17);
    let vectors = dataset.store().unwrap();
    let mut index = build(&vectors, 12, n, params(8, DEFAULT_EF_CONSTRUCTION, 9));

    // Remove four documents out of every five.
    for id in (0..n as DocId).filter(|id| id % 5 != 0) {
        index.remove_doc(id);
    }
    index.validate_links().unwrap();
    let live = index.len();
    assert_eq!(live, n / 5);

    for q in &dataset.queries {
        assert_eq!(index.top_k(live, q, live).len(), live);
    }
    for id in index.doc_ids() {
        let hits = index.top_k(1, vectors.get(id).unwrap(), live);
        assert_eq!(hits, vec![(id, 0.0)], "document {id} unreachable after deletions");
    }
}

#[test]
fn interleaved_churn_keeps_recall() {
    let dataset = generate_clustered_dataset("churn", 1200, 30, 12, 10, 0.1, 10, 8);
    let vectors = dataset.store().unwrap();
    let mut index = build(&vectors, 12, 1200, params(12, 100, 6));

    // Drop every third document, then put half of them back.
    for id in (0..1200).step_by(3) {
        index.remove_doc(id);
    }
    for id in (0..1200).step_by(6) {
        index.add_doc(id);
    }
    index.validate_links().unwrap();

    let mut exact = BruteForceIndex::new(12, &vectors).unwrap();
    for id in index.doc_ids() {
        exact.add_doc(id);
    }
    let approx: Vec<Vec<DocId>> = dataset
        .queries
        .iter()
        .map(|q| ids(&index.top_k(10, q, 100)))
        .collect();
    let truth: Vec<Vec<DocId>> = dataset
        .queries
        .iter()
        .map(|q| ids(&exact.top_k(10, q)))
        .collect();
    let recall = mean_recall(&approx, &truth, 10);
    assert!(recall >= 0.85, "recall after churn: {recall}");
}

#[test]
fn shared_index_serves_concurrent_readers() {
    let dataset = generate_uniform_dataset("shared", 500, 1, 8, 1, 33);
    let vectors = Arc::new(dataset.store().unwrap());
    let index = SharedIndex::new(build(Arc::clone(&vectors), 8, 400, params(8, 64, 7)));
    assert_eq!(index.generation(), 0);

    std::thread::scope(|s| {
        for t in 0..4u32 {
            let index = &index;
            let vectors = &vectors;
            s.spawn(move || {
                for id in (t..400).step_by(4) {
                    let hits = index.top_k(1, vectors.get(id).unwrap(), 200);
                    assert_eq!(hits[0].0, id);
                }
            });
        }
        // A writer racing the readers: documents 400..500 arrive one by one.
        s.spawn(|| {
            for id in 400..500 {
                index.add_doc(id);
            }
        });
    });

    assert_eq!(index.len(), 500);
    assert_eq!(index.generation(), 100);
    index.read().validate_links().unwrap();
}

#[cfg(feature = "serde")]
#[test]
fn params_round_trip_through_json() {
    let original = params(24, 300, 99);
    let json = serde_json::to_string(&original).unwrap();
    let back: HnswParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);

    // Missing fields fall back to defaults.
    let partial: HnswParams = serde_json::from_str(r#"{"m": 8}"#).unwrap();
    assert_eq!(partial.m, 8);
    assert_eq!(partial.ef_construction, HnswParams::default().ef_construction);
}
