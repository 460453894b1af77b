//! Incremental HNSW insertion.
//!
//! Each document draws a random top level, descends greedily to that level, then at every
//! level below runs an `ef_construction` beam search, keeps a diverse subset of the beam
//! as links, and trims any neighbor pushed over its degree cap.
//!
//! # References
//!
//! - Malkov & Yashunin (2016): "Efficient and robust approximate nearest neighbor search
//!   using Hierarchical Navigable Small World graphs", Algorithms 1 and 4.

use crate::hnsw::graph::EntryPoint;
use crate::hnsw::index::HnswIndex;
use crate::hnsw::search::Hit;
use crate::vectors::{DocId, VectorSource};
use tracing::{debug, trace};

impl<V: VectorSource> HnswIndex<V> {
    /// Insert document `id`, whose vector is read from the vector source.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already indexed, or if its vector length differs from
    /// `num_dims`.
    pub fn add_doc(&mut self, id: DocId) {
        assert_eq!(
            self.vectors.vector(id).len(),
            self.num_dims,
            "vector for document {id} has wrong length"
        );

        let level = self.random_level();
        self.graph.init_node(id, level + 1);
        self.num_docs += 1;

        let Some(entry) = self.graph.entry() else {
            self.graph.set_entry(Some(EntryPoint { id, level }));
            debug!(id, level, "first document becomes entry point");
            return;
        };

        let top = level.min(entry.level);
        let start = self.descend(self.vectors.vector(id), entry, top);
        let mut entries = vec![start];

        for layer in (0..=top).rev() {
            let query = self.vectors.vector(id);
            let beam = self.search_layer(query, &entries, layer, self.params.ef_construction);
            let selected = self.select_neighbors(&beam, self.max_links(layer), id);

            for &n in &selected {
                self.graph.connect(id, n, layer);
            }
            let cap = self.max_links(layer);
            for &n in &selected {
                if self.graph.links(n, layer).len() > cap {
                    self.shrink(n, layer);
                }
            }

            trace!(id, layer, beam = beam.len(), linked = selected.len(), "connected");
            if !beam.is_empty() {
                entries = beam;
            }
        }

        if level > entry.level {
            self.graph.set_entry(Some(EntryPoint { id, level }));
            debug!(id, level, previous = entry.level, "new entry point");
        }
    }

    /// Diversity heuristic over `candidates`, sorted ascending by distance to a base point.
    ///
    /// A candidate is kept only if no already-kept neighbor is strictly closer to it than
    /// the base is. Stops once `cap` neighbors are kept. `skip` is never selected.
    pub(crate) fn select_neighbors(
        &self,
        candidates: &[Hit],
        cap: usize,
        skip: DocId,
    ) -> Vec<DocId> {
        let mut selected: Vec<DocId> = Vec::with_capacity(cap.min(candidates.len()));
        for hit in candidates {
            if selected.len() >= cap {
                break;
            }
            if hit.id == skip {
                continue;
            }
            let diverse = selected
                .iter()
                .all(|&s| self.distance_between(hit.id, s) >= hit.distance);
            if diverse {
                selected.push(hit.id);
            }
        }
        selected
    }
}
