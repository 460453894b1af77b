//! navgraph: incremental HNSW approximate nearest neighbor search.
//!
//! An in-memory graph index over fixed-dimension `f32` vectors under squared Euclidean
//! distance. Documents are identified by caller-assigned [`DocId`]s and their vectors are
//! read from an external [`VectorSource`]; the index stores only links.
//!
//! - [`hnsw`]: the layered graph, with insert, hard delete with local repair, top-k and
//!   filtered top-k queries
//! - [`BruteForceIndex`]: exact linear scan behind the same [`AnnIndex`] trait
//! - [`SharedIndex`]: reader/writer wrapper for querying from several threads
//! - [`benchmark`]: synthetic datasets, ground truth, recall and latency measurement
//!
//! # Example
//!
//! ```rust
//! use navgraph::{FlatVectors, HnswIndex, HnswParams};
//! use roaring::RoaringBitmap;
//!
//! # fn main() -> navgraph::Result<()> {
//! let vectors = FlatVectors::from_rows(
//!     4,
//!     [
//!         [0.0f32, 0.0, 0.0, 0.0],
//!         [1.0, 0.0, 0.0, 0.0],
//!         [0.0, 1.0, 0.0, 0.0],
//!         [10.0, 10.0, 10.0, 10.0],
//!     ],
//! )?;
//! let params = HnswParams { m: 4, ..Default::default() };
//! let mut index = HnswIndex::new(4, &vectors, params)?;
//! for id in 0..4 {
//!     index.add_doc(id);
//! }
//!
//! assert_eq!(index.top_k(1, &[0.0; 4], 10), vec![(0, 0.0)]);
//!
//! let exclude: RoaringBitmap = [0].into_iter().collect();
//! let hits = index.top_k_filter(1, &[0.0; 4], 10, &exclude);
//! assert_eq!(hits[0].1, 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Mutation takes `&mut self` and queries take `&self`, so the borrow checker already
//! keeps writers and readers apart. Wrap an index in [`SharedIndex`] to share it between
//! threads behind a lock.

pub mod ann;
pub mod benchmark;
pub mod brute_force;
pub mod distance;
pub mod error;
pub mod hnsw;
pub mod sync;
pub mod vectors;

// Re-exports
pub use ann::{AnnIndex, AnnStats};
pub use brute_force::BruteForceIndex;
pub use error::{IndexError, Result};
#[cfg(feature = "hnsw")]
pub use hnsw::{HnswIndex, HnswParams};
pub use sync::SharedIndex;
pub use vectors::{DocId, FlatVectors, VectorSource};
