//! Benchmark utilities for ANN evaluation.
//!
//! Synthetic dataset generation, exact ground truth, and recall/latency measurement.
//! The integration tests and criterion benches build on these.

pub mod evaluation;

pub use evaluation::{
    compute_ground_truth, evaluate, generate_clustered_dataset, generate_uniform_dataset,
    mean_recall, recall_at_k, EvalDataset, EvalResults,
};
