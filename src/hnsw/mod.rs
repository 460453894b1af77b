//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor search.
//!
//! # Algorithm
//!
//! HNSW builds a multi-layer proximity graph:
//! - **Upper layers**: sparse, long-range links for fast navigation
//! - **Level 0**: every document, dense local links for precise search
//! - **Search**: greedy descent from the entry point to level 1, then a bounded beam
//!   search at level 0
//!
//! Each document is assigned a top level drawn from a geometric distribution, so level
//! `l` holds roughly `n / M^l` documents.
//!
//! The index is fully incremental: [`HnswIndex::add_doc`] and [`HnswIndex::remove_doc`]
//! keep the graph queryable after every call. Deletion is a hard delete with local
//! repair, not a tombstone.
//!
//! Links are undirected. For every pair `(a, b)` and level `l`, `a` lists `b` at `l`
//! exactly when `b` lists `a` at `l`; [`HnswIndex::validate_links`] checks this along with
//! the degree caps (`M` above level 0, `2M` at level 0).
//!
//! # Usage
//!
//! ```rust
//! use navgraph::{FlatVectors, HnswIndex, HnswParams};
//!
//! # fn main() -> navgraph::Result<()> {
//! let mut vectors = FlatVectors::new(2)?;
//! for i in 0..100 {
//!     vectors.push(&[i as f32, (i % 7) as f32])?;
//! }
//!
//! let params = HnswParams { m: 8, seed: Some(42), ..Default::default() };
//! let mut index = HnswIndex::new(2, &vectors, params)?;
//! for id in 0..100 {
//!     index.add_doc(id);
//! }
//!
//! let hits = index.top_k(3, &[10.0, 3.0], 32);
//! assert_eq!(hits[0], (10, 0.0));
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Malkov & Yashunin (2016): "Efficient and robust approximate nearest neighbor search
//!   using Hierarchical Navigable Small World graphs"

#[cfg(feature = "hnsw")]
mod construction;
#[cfg(feature = "hnsw")]
mod deletion;
#[cfg(feature = "hnsw")]
pub mod graph;
#[cfg(feature = "hnsw")]
mod index;
#[cfg(feature = "hnsw")]
mod query;
#[cfg(feature = "hnsw")]
mod repair;
#[cfg(feature = "hnsw")]
pub mod search;
#[cfg(feature = "hnsw")]
pub mod visited;

#[cfg(feature = "hnsw")]
pub use graph::{EntryPoint, LinkList};
#[cfg(feature = "hnsw")]
pub use index::{
    HnswIndex, HnswParams, DEFAULT_EF_CONSTRUCTION, DEFAULT_M, DEFAULT_MAX_LEVEL,
};
#[cfg(feature = "hnsw")]
pub use search::Hit;
#[cfg(feature = "hnsw")]
pub use visited::{VisitedPool, VisitedSet};
