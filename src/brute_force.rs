//! Exact nearest neighbor search by linear scan.
//!
//! Holds only the set of live ids; every query computes the distance to each of them.
//! Used as the recall reference for the graph index and as a baseline in benches.

use crate::ann::AnnStats;
use crate::distance::l2_distance_squared;
use crate::error::{IndexError, Result};
use crate::vectors::{DocId, VectorSource};
use roaring::RoaringBitmap;

/// Linear-scan index over an external vector source.
#[derive(Debug, Clone)]
pub struct BruteForceIndex<V> {
    vectors: V,
    num_dims: usize,
    live: RoaringBitmap,
}

impl<V: VectorSource> BruteForceIndex<V> {
    pub fn new(num_dims: usize, vectors: V) -> Result<Self> {
        if num_dims == 0 {
            return Err(IndexError::InvalidParameter(
                "num_dims must be greater than 0".into(),
            ));
        }
        if vectors.num_dims() != num_dims {
            return Err(IndexError::DimensionMismatch {
                expected: num_dims,
                actual: vectors.num_dims(),
            });
        }
        Ok(Self {
            vectors,
            num_dims,
            live: RoaringBitmap::new(),
        })
    }

    /// # Panics
    ///
    /// Panics if `id` is already indexed.
    pub fn add_doc(&mut self, id: DocId) {
        assert_eq!(
            self.vectors.vector(id).len(),
            self.num_dims,
            "vector for document {id} has wrong length"
        );
        assert!(self.live.insert(id), "document {id} is already indexed");
    }

    /// # Panics
    ///
    /// Panics if `id` is not indexed.
    pub fn remove_doc(&mut self, id: DocId) {
        assert!(self.live.remove(id), "document {id} is not indexed");
    }

    /// The exact `k` nearest documents, ascending by squared L2 distance.
    pub fn top_k(&self, k: usize, query: &[f32]) -> Vec<(DocId, f64)> {
        self.scan(k, query, |_| true)
    }

    /// The exact `k` nearest documents not contained in `exclude`.
    pub fn top_k_filter(
        &self,
        k: usize,
        query: &[f32],
        exclude: &RoaringBitmap,
    ) -> Vec<(DocId, f64)> {
        self.scan(k, query, |id| !exclude.contains(id))
    }

    fn scan(&self, k: usize, query: &[f32], allow: impl Fn(DocId) -> bool) -> Vec<(DocId, f64)> {
        assert_eq!(
            query.len(),
            self.num_dims,
            "query has {} dimensions, index has {}",
            query.len(),
            self.num_dims
        );
        if k == 0 {
            return Vec::new();
        }
        let mut scored: Vec<(DocId, f32)> = self
            .live
            .iter()
            .filter(|&id| allow(id))
            .map(|id| (id, l2_distance_squared(query, self.vectors.vector(id))))
            .collect();
        if scored.len() > k {
            scored.select_nth_unstable_by(k - 1, |a, b| a.1.total_cmp(&b.1));
            scored.truncate(k);
        }
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored
            .into_iter()
            .map(|(id, d)| (id, f64::from(d)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.live.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.live.contains(id)
    }

    pub fn vectors(&self) -> &V {
        &self.vectors
    }

    pub fn stats(&self) -> AnnStats {
        AnnStats {
            num_docs: self.len(),
            num_dims: self.num_dims,
            size_bytes: self.live.serialized_size(),
            max_level: None,
            algorithm: "BruteForce",
        }
    }
}
