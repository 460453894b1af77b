//! Degree maintenance: shrinking over-full link lists and refilling under-full ones.
//!
//! Both operations preserve the symmetric-link invariant: every link removed from one side
//! is removed from the other, and every link added goes through `connect`.

use crate::hnsw::index::HnswIndex;
use crate::hnsw::search::Hit;
use crate::vectors::{DocId, VectorSource};
use tracing::trace;

impl<V: VectorSource> HnswIndex<V> {
    /// Bring `node` back under its degree cap at `level`.
    ///
    /// The neighbor list is re-ranked by distance and filtered with the same diversity
    /// heuristic used during insertion. Dropped neighbors lose their reverse link and are
    /// refilled from the old neighbor list.
    pub(crate) fn shrink(&mut self, node: DocId, level: usize) {
        let mut pool: Vec<Hit> = self
            .graph
            .links(node, level)
            .iter()
            .map(|n| Hit {
                id: n,
                distance: self.distance_between(node, n),
            })
            .collect();
        pool.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let kept = self.select_neighbors(&pool, self.max_links(level), node);
        let pool_ids: Vec<DocId> = pool.iter().map(|h| h.id).collect();
        let lost: Vec<DocId> = pool_ids
            .iter()
            .copied()
            .filter(|id| !kept.contains(id))
            .collect();

        *self.graph.links_mut(node, level) = kept.into_iter().collect();
        for &l in &lost {
            self.graph.links_mut(l, level).remove(node);
        }

        let mut added = 0;
        for &l in &lost {
            added += self.refill(l, level, &pool_ids);
        }
        trace!(node, level, lost = lost.len(), added, "shrunk");
    }

    /// Reconnect `node` at `level` to members of `pool` if its degree fell below the low
    /// watermark. Returns the number of links added.
    ///
    /// Candidates are tried nearest first. A candidate is skipped if it is `node` itself,
    /// not live at `level`, already linked, or at its own cap. Stops when `node` is full.
    pub(crate) fn refill(&mut self, node: DocId, level: usize, pool: &[DocId]) -> usize {
        if self.graph.links(node, level).len() >= self.low_watermark(level) {
            return 0;
        }
        let cap = self.max_links(level);

        let mut candidates: Vec<Hit> = pool
            .iter()
            .copied()
            .filter(|&c| {
                c != node
                    && self.graph.num_levels(c) > level
                    && !self.graph.links(node, level).contains(c)
            })
            .map(|c| Hit {
                id: c,
                distance: self.distance_between(node, c),
            })
            .collect();
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut added = 0;
        for hit in candidates {
            if self.graph.links(node, level).len() >= cap {
                break;
            }
            if self.graph.links(hit.id, level).len() >= cap {
                continue;
            }
            self.graph.connect(node, hit.id, level);
            added += 1;
        }
        added
    }
}
