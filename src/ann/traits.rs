//! Unified trait for incremental nearest neighbor indexes.

use crate::vectors::DocId;
use roaring::RoaringBitmap;

/// Unified trait for incremental ANN index implementations.
///
/// Vectors live in an external source; the index only stores document ids. Distances in
/// results are squared L2, ascending.
pub trait AnnIndex {
    /// Index document `id`. Panics if it is already indexed.
    fn add_doc(&mut self, id: DocId);

    /// Drop document `id`. Panics if it is not indexed.
    fn remove_doc(&mut self, id: DocId);

    /// Up to `k` nearest documents. `search_k` trades accuracy for speed where the
    /// implementation supports it.
    fn top_k(&self, k: usize, query: &[f32], search_k: usize) -> Vec<(DocId, f64)>;

    /// Like [`AnnIndex::top_k`], skipping every id in `exclude`.
    fn top_k_filter(
        &self,
        k: usize,
        query: &[f32],
        search_k: usize,
        exclude: &RoaringBitmap,
    ) -> Vec<(DocId, f64)>;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension.
    fn num_dims(&self) -> usize;

    fn stats(&self) -> AnnStats;
}

/// Statistics about an index.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnStats {
    pub num_docs: usize,
    pub num_dims: usize,
    /// Approximate bytes owned by the index structure, excluding vectors.
    pub size_bytes: usize,
    /// Top graph level, for layered indexes.
    pub max_level: Option<usize>,
    pub algorithm: &'static str,
}

// Implement AnnIndex for HNSW
#[cfg(feature = "hnsw")]
impl<V: crate::vectors::VectorSource> AnnIndex for crate::hnsw::HnswIndex<V> {
    fn add_doc(&mut self, id: DocId) {
        self.add_doc(id)
    }

    fn remove_doc(&mut self, id: DocId) {
        self.remove_doc(id)
    }

    fn top_k(&self, k: usize, query: &[f32], search_k: usize) -> Vec<(DocId, f64)> {
        self.top_k(k, query, search_k)
    }

    fn top_k_filter(
        &self,
        k: usize,
        query: &[f32],
        search_k: usize,
        exclude: &RoaringBitmap,
    ) -> Vec<(DocId, f64)> {
        self.top_k_filter(k, query, search_k, exclude)
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn num_dims(&self) -> usize {
        self.num_dims()
    }

    fn stats(&self) -> AnnStats {
        self.stats()
    }
}

// Implement AnnIndex for exact search
impl<V: crate::vectors::VectorSource> AnnIndex for crate::brute_force::BruteForceIndex<V> {
    fn add_doc(&mut self, id: DocId) {
        self.add_doc(id)
    }

    fn remove_doc(&mut self, id: DocId) {
        self.remove_doc(id)
    }

    fn top_k(&self, k: usize, query: &[f32], _search_k: usize) -> Vec<(DocId, f64)> {
        self.top_k(k, query)
    }

    fn top_k_filter(
        &self,
        k: usize,
        query: &[f32],
        _search_k: usize,
        exclude: &RoaringBitmap,
    ) -> Vec<(DocId, f64)> {
        self.top_k_filter(k, query, exclude)
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn num_dims(&self) -> usize {
        self.num_dims()
    }

    fn stats(&self) -> AnnStats {
        self.stats()
    }
}
