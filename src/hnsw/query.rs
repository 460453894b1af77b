//! Top-k queries over the finished graph.

use crate::hnsw::index::HnswIndex;
use crate::hnsw::search::Hit;
use crate::vectors::{DocId, VectorSource};
use roaring::RoaringBitmap;

impl<V: VectorSource> HnswIndex<V> {
    /// Approximate `k` nearest documents to `query`, ascending by squared L2 distance.
    ///
    /// `search_k` is the level-0 beam width; the effective width is `max(k, search_k)`,
    /// capped at the number of indexed documents. Returns an empty vector for an empty
    /// index or `k == 0`.
    ///
    /// # Panics
    ///
    /// Panics if `query.len() != num_dims`.
    pub fn top_k(&self, k: usize, query: &[f32], search_k: usize) -> Vec<(DocId, f64)> {
        self.check_query(query);
        let Some(entry) = self.graph.entry() else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let start = self.descend(query, entry, 0);
        let ef = k.max(search_k).min(self.num_docs);
        let mut hits = self.search_layer(query, &[start], 0, ef);
        hits.truncate(k);
        into_output(hits)
    }

    /// Like [`top_k`](Self::top_k), but never returns ids contained in `exclude`.
    ///
    /// Excluded documents still route the search. When too few allowed documents survive,
    /// the beam is doubled (up to the index size) and the level-0 search rerun, so the
    /// result can still be shorter than `k` if the allowed set is small or unreachable.
    pub fn top_k_filter(
        &self,
        k: usize,
        query: &[f32],
        search_k: usize,
        exclude: &RoaringBitmap,
    ) -> Vec<(DocId, f64)> {
        self.check_query(query);
        let Some(entry) = self.graph.entry() else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let start = self.descend(query, entry, 0);
        let limit = self.num_docs;
        let mut ef = k.max(search_k).min(limit);
        loop {
            let mut hits = self.search_layer_filtered(query, &[start], 0, ef, exclude);
            if hits.len() >= k || ef >= limit {
                hits.truncate(k);
                return into_output(hits);
            }
            ef = ef.saturating_mul(2).min(limit);
        }
    }

    fn check_query(&self, query: &[f32]) {
        assert_eq!(
            query.len(),
            self.num_dims,
            "query has {} dimensions, index has {}",
            query.len(),
            self.num_dims
        );
    }
}

fn into_output(hits: Vec<Hit>) -> Vec<(DocId, f64)> {
    hits.into_iter()
        .map(|hit| (hit.id, f64::from(hit.distance)))
        .collect()
}
