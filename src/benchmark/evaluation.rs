//! Recall and latency evaluation against exact ground truth.
//!
//! | Metric | Formula | Interpretation |
//! |--------|---------|----------------|
//! | Recall@K | \|approx ∩ true\| / K | Fraction of true neighbors found |
//! | QPS | queries / seconds | Throughput |
//!
//! All ground truth here is squared L2, the same metric the indexes use.
//!
//! Reference: https://ann-benchmarks.com/

use crate::distance::l2_distance_squared;
use crate::error::{IndexError, Result};
use crate::vectors::{DocId, FlatVectors};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// A dataset with ground truth for evaluation.
#[derive(Debug, Clone)]
pub struct EvalDataset {
    /// Name of the dataset
    pub name: String,
    /// Vectors to index; row `i` is document `i`
    pub base: Vec<Vec<f32>>,
    pub queries: Vec<Vec<f32>>,
    /// For each query, the ids of its `k` exact nearest neighbors, nearest first
    pub ground_truth: Vec<Vec<DocId>>,
    pub k: usize,
    pub num_dims: usize,
}

impl EvalDataset {
    pub fn n_base(&self) -> usize {
        self.base.len()
    }

    pub fn n_queries(&self) -> usize {
        self.queries.len()
    }

    /// Copy the base vectors into a contiguous store.
    pub fn store(&self) -> Result<FlatVectors> {
        FlatVectors::from_rows(self.num_dims, &self.base)
    }

    /// Validate dataset consistency.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(IndexError::InvalidParameter(msg)) };
        if self.base.is_empty() {
            return invalid("base vectors empty".into());
        }
        if self.queries.is_empty() {
            return invalid("queries empty".into());
        }
        if self.ground_truth.len() != self.queries.len() {
            return invalid(format!(
                "ground truth count {} != query count {}",
                self.ground_truth.len(),
                self.queries.len()
            ));
        }
        for (i, gt) in self.ground_truth.iter().enumerate() {
            if gt.len() < self.k.min(self.base.len()) {
                return invalid(format!(
                    "query {i} has {} neighbors, expected {}",
                    gt.len(),
                    self.k
                ));
            }
        }
        Ok(())
    }
}

/// Evaluation results for a single run.
#[derive(Debug, Clone)]
pub struct EvalResults {
    pub dataset: String,
    pub algorithm: String,
    /// Configuration string (e.g., "M=16,search_k=50")
    pub config: String,
    /// Recall@K for each query
    pub recalls: Vec<f32>,
    pub latencies_us: Vec<u64>,
    pub build_time: Duration,
    /// Index memory (approximate)
    pub index_memory_bytes: usize,
    pub k: usize,
}

impl EvalResults {
    /// Mean recall across all queries.
    pub fn mean_recall(&self) -> f32 {
        if self.recalls.is_empty() {
            return 0.0;
        }
        self.recalls.iter().sum::<f32>() / self.recalls.len() as f32
    }

    pub fn median_recall(&self) -> f32 {
        if self.recalls.is_empty() {
            return 0.0;
        }
        let mut sorted = self.recalls.clone();
        sorted.sort_by(f32::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    /// Queries per second.
    pub fn qps(&self) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }
        let total_us: u64 = self.latencies_us.iter().sum();
        if total_us == 0 {
            return f64::INFINITY;
        }
        self.latencies_us.len() as f64 / (total_us as f64 / 1_000_000.0)
    }

    pub fn mean_latency_us(&self) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }
        self.latencies_us.iter().sum::<u64>() as f64 / self.latencies_us.len() as f64
    }

    pub fn p50_latency_us(&self) -> u64 {
        self.latency_percentile(50)
    }

    pub fn p99_latency_us(&self) -> u64 {
        self.latency_percentile(99)
    }

    fn latency_percentile(&self, pct: usize) -> u64 {
        if self.latencies_us.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies_us.clone();
        sorted.sort_unstable();
        sorted[(sorted.len() * pct) / 100]
    }

    /// Format as a summary string.
    pub fn summary(&self) -> String {
        format!(
            "{}[{}]: recall={:.3}, qps={:.1}, p50={}us, p99={}us, build={:.2}s, mem={:.1}MB",
            self.algorithm,
            self.config,
            self.mean_recall(),
            self.qps(),
            self.p50_latency_us(),
            self.p99_latency_us(),
            self.build_time.as_secs_f64(),
            self.index_memory_bytes as f64 / 1_000_000.0
        )
    }
}

/// Recall@k for a single query.
///
/// # Arguments
/// * `approx` - Neighbors returned by the index
/// * `true_neighbors` - Ground truth neighbors, nearest first
/// * `k` - Number of neighbors to consider
pub fn recall_at_k(approx: &[DocId], true_neighbors: &[DocId], k: usize) -> f32 {
    let k = k.min(true_neighbors.len());
    if k == 0 {
        return 0.0;
    }
    let true_set: HashSet<DocId> = true_neighbors.iter().take(k).copied().collect();
    let found = approx.iter().take(k).filter(|id| true_set.contains(id)).count();
    found as f32 / k as f32
}

/// Mean recall@k over a batch of queries.
pub fn mean_recall(approx: &[Vec<DocId>], ground_truth: &[Vec<DocId>], k: usize) -> f32 {
    if approx.is_empty() {
        return 0.0;
    }
    approx
        .iter()
        .zip(ground_truth)
        .map(|(a, gt)| recall_at_k(a, gt, k))
        .sum::<f32>()
        / approx.len() as f32
}

/// Run every query of `dataset` through `search_fn`, timing each call.
pub fn evaluate<F>(
    dataset: &EvalDataset,
    algorithm: &str,
    config: &str,
    build_time: Duration,
    index_memory: usize,
    search_fn: F,
) -> EvalResults
where
    F: Fn(&[f32], usize) -> Vec<DocId>,
{
    let mut recalls = Vec::with_capacity(dataset.n_queries());
    let mut latencies = Vec::with_capacity(dataset.n_queries());

    for (query, gt) in dataset.queries.iter().zip(&dataset.ground_truth) {
        let start = Instant::now();
        let approx = search_fn(query, dataset.k);
        let elapsed = start.elapsed();

        recalls.push(recall_at_k(&approx, gt, dataset.k));
        latencies.push(elapsed.as_micros() as u64);
    }

    EvalResults {
        dataset: dataset.name.clone(),
        algorithm: algorithm.into(),
        config: config.into(),
        recalls,
        latencies_us: latencies,
        build_time,
        index_memory_bytes: index_memory,
        k: dataset.k,
    }
}

/// Exact `k` nearest base ids for each query.
pub fn compute_ground_truth(base: &[Vec<f32>], queries: &[Vec<f32>], k: usize) -> Vec<Vec<DocId>> {
    queries
        .iter()
        .map(|query| {
            let mut distances: Vec<(DocId, f32)> = base
                .iter()
                .enumerate()
                .map(|(i, v)| (i as DocId, l2_distance_squared(query, v)))
                .collect();
            distances.sort_by(|a, b| a.1.total_cmp(&b.1));
            distances.into_iter().take(k).map(|(id, _)| id).collect()
        })
        .collect()
}

// ============ Synthetic Dataset Generators ============

/// Uniform random vectors in `[0, 1)^num_dims`.
pub fn generate_uniform_dataset(
    name: &str,
    n_base: usize,
    n_queries: usize,
    num_dims: usize,
    k: usize,
    seed: u64,
) -> EvalDataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let base: Vec<Vec<f32>> = (0..n_base)
        .map(|_| (0..num_dims).map(|_| rng.random::<f32>()).collect())
        .collect();
    let queries: Vec<Vec<f32>> = (0..n_queries)
        .map(|_| (0..num_dims).map(|_| rng.random::<f32>()).collect())
        .collect();

    let ground_truth = compute_ground_truth(&base, &queries, k);

    EvalDataset {
        name: name.into(),
        base,
        queries,
        ground_truth,
        k,
        num_dims,
    }
}

/// Gaussian blobs around uniform random centers (more realistic).
#[allow(clippy::too_many_arguments)]
pub fn generate_clustered_dataset(
    name: &str,
    n_base: usize,
    n_queries: usize,
    num_dims: usize,
    n_clusters: usize,
    cluster_std: f32,
    k: usize,
    seed: u64,
) -> EvalDataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let centers: Vec<Vec<f32>> = (0..n_clusters.max(1))
        .map(|_| (0..num_dims).map(|_| rng.random::<f32>()).collect())
        .collect();

    // Box-Muller around a center, clamped to the unit cube.
    let sample_near = |rng: &mut StdRng, center: &[f32]| -> Vec<f32> {
        center
            .iter()
            .map(|&c| {
                let u1: f32 = 1.0 - rng.random::<f32>();
                let u2: f32 = rng.random();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                (c + z * cluster_std).clamp(0.0, 1.0)
            })
            .collect()
    };

    let sample = |rng: &mut StdRng| {
        let idx = rng.random_range(0..centers.len());
        sample_near(rng, &centers[idx])
    };
    let base: Vec<Vec<f32>> = (0..n_base).map(|_| sample(&mut rng)).collect();
    let queries: Vec<Vec<f32>> = (0..n_queries).map(|_| sample(&mut rng)).collect();

    let ground_truth = compute_ground_truth(&base, &queries, k);

    EvalDataset {
        name: name.into(),
        base,
        queries,
        ground_truth,
        k,
        num_dims,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recall_at_k() {
        let truth = vec![0, 2, 4, 6, 8];
        assert!((recall_at_k(&[0, 1, 2, 3, 4], &truth, 5) - 0.6).abs() < 0.01);
        assert!((recall_at_k(&[0, 2, 4, 6, 8], &truth, 5) - 1.0).abs() < 0.01);
        assert!(recall_at_k(&[1, 3, 5, 7, 9], &truth, 5).abs() < 0.01);
        // Short answers are penalized, not rescaled.
        assert!((recall_at_k(&[0], &truth, 5) - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_mean_recall() {
        let truth = vec![vec![0, 1], vec![2, 3]];
        let approx = vec![vec![0, 1], vec![2, 9]];
        assert!((mean_recall(&approx, &truth, 2) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_ground_truth_is_exact() {
        let base = vec![vec![0.0], vec![5.0], vec![1.0], vec![3.0]];
        let gt = compute_ground_truth(&base, &[vec![2.9]], 2);
        assert_eq!(gt, vec![vec![3, 2]]);
    }

    #[test]
    fn test_eval_dataset_generation() {
        let dataset = generate_clustered_dataset("test", 500, 20, 16, 5, 0.1, 10, 42);
        assert_eq!(dataset.n_base(), 500);
        assert_eq!(dataset.n_queries(), 20);
        assert_eq!(dataset.ground_truth[0].len(), 10);
        dataset.validate().unwrap();
        assert_eq!(dataset.store().unwrap().len(), 500);

        let uniform = generate_uniform_dataset("u", 50, 5, 4, 3, 1);
        assert!(uniform.base.iter().flatten().all(|x| (0.0..1.0).contains(x)));
        uniform.validate().unwrap();
    }

    #[test]
    fn test_evaluate_with_exact_search() {
        let dataset = generate_uniform_dataset("exact", 100, 10, 8, 5, 3);
        let results = evaluate(&dataset, "scan", "-", Duration::ZERO, 0, |q, k| {
            compute_ground_truth(&dataset.base, &[q.to_vec()], k).remove(0)
        });
        assert!((results.mean_recall() - 1.0).abs() < 1e-6);
        assert_eq!(results.recalls.len(), 10);
        assert!(results.summary().starts_with("scan[-]"));
    }

    #[test]
    fn test_eval_results_summary() {
        let results = EvalResults {
            dataset: "test".into(),
            algorithm: "hnsw".into(),
            config: "M=16".into(),
            recalls: vec![0.8, 0.9, 1.0],
            latencies_us: vec![100, 200, 150],
            build_time: Duration::from_millis(100),
            index_memory_bytes: 1_000_000,
            k: 10,
        };
        assert!((results.mean_recall() - 0.9).abs() < 0.01);
        assert!((results.median_recall() - 0.9).abs() < 0.01);
        assert_eq!(results.p50_latency_us(), 150);
        assert!(results.qps() > 0.0);
    }
}
