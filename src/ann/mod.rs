//! Index-agnostic interface shared by the graph index and exact search.
//!
//! ```rust
//! use navgraph::{AnnIndex, BruteForceIndex, FlatVectors};
//!
//! # fn main() -> navgraph::Result<()> {
//! let vectors = FlatVectors::from_rows(2, [[0.0f32, 0.0], [1.0, 1.0]])?;
//! let mut index: Box<dyn AnnIndex> = Box::new(BruteForceIndex::new(2, vectors)?);
//! index.add_doc(0);
//! index.add_doc(1);
//! assert_eq!(index.top_k(1, &[0.9, 0.9], 1)[0].0, 1);
//! # Ok(())
//! # }
//! ```

pub mod traits;

pub use traits::{AnnIndex, AnnStats};
