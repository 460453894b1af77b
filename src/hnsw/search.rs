//! Layer traversal primitives: greedy descent and bounded beam search.

use crate::hnsw::graph::EntryPoint;
use crate::hnsw::index::HnswIndex;
use crate::vectors::{DocId, VectorSource};
use roaring::RoaringBitmap;
use std::collections::BinaryHeap;

/// A document and its squared distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: DocId,
    pub distance: f32,
}

/// Min-heap entry: nearest candidate pops first.
#[derive(Clone, Copy)]
struct Nearest(Hit);

impl PartialEq for Nearest {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Nearest {}

impl Ord for Nearest {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.0.distance.total_cmp(&self.0.distance)
    }
}

impl PartialOrd for Nearest {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-heap entry: furthest kept result pops first.
#[derive(Clone, Copy)]
struct Furthest(Hit);

impl PartialEq for Furthest {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Furthest {}

impl Ord for Furthest {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.distance.total_cmp(&other.0.distance)
    }
}

impl PartialOrd for Furthest {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Set of document ids a traversal must not return.
pub(crate) trait Exclusion {
    fn excludes(&self, id: DocId) -> bool;
}

pub(crate) struct NoExclusion;

impl Exclusion for NoExclusion {
    #[inline(always)]
    fn excludes(&self, _id: DocId) -> bool {
        false
    }
}

impl Exclusion for RoaringBitmap {
    #[inline]
    fn excludes(&self, id: DocId) -> bool {
        self.contains(id)
    }
}

impl<V: VectorSource> HnswIndex<V> {
    /// Greedy single-path search: move to any strictly closer neighbor until none exists.
    pub(crate) fn search_layer_simple(&self, query: &[f32], entry: Hit, level: usize) -> Hit {
        let mut best = entry;
        loop {
            let current = best.id;
            for n in self.graph.links(current, level).iter() {
                let distance = self.distance_to(query, n);
                if distance < best.distance {
                    best = Hit { id: n, distance };
                }
            }
            if best.id == current {
                return best;
            }
        }
    }

    /// Greedy descent from `entry` through every level above `stop_level`.
    pub(crate) fn descend(&self, query: &[f32], entry: EntryPoint, stop_level: usize) -> Hit {
        let mut best = Hit {
            id: entry.id,
            distance: self.distance_to(query, entry.id),
        };
        for level in (stop_level + 1..=entry.level).rev() {
            best = self.search_layer_simple(query, best, level);
        }
        best
    }

    /// Beam search at `level` keeping the `ef` nearest hits, ascending by distance.
    pub(crate) fn search_layer(
        &self,
        query: &[f32],
        entries: &[Hit],
        level: usize,
        ef: usize,
    ) -> Vec<Hit> {
        self.beam_search(query, entries, level, ef, &NoExclusion)
    }

    /// Beam search that never returns ids in `exclude`.
    ///
    /// Excluded nodes are still expanded, so they bridge to reachable nodes behind them.
    /// Each excluded node admitted to the result heap widens the beam by one.
    pub(crate) fn search_layer_filtered<E: Exclusion>(
        &self,
        query: &[f32],
        entries: &[Hit],
        level: usize,
        ef: usize,
        exclude: &E,
    ) -> Vec<Hit> {
        self.beam_search(query, entries, level, ef, exclude)
    }

    fn beam_search<E: Exclusion>(
        &self,
        query: &[f32],
        entries: &[Hit],
        level: usize,
        ef: usize,
        exclude: &E,
    ) -> Vec<Hit> {
        // A beam wider than the node arena cannot admit anything more.
        let ef = ef.min(self.graph.capacity());
        let mut visited = self.visited.acquire(self.graph.capacity());
        let mut candidates: BinaryHeap<Nearest> = BinaryHeap::with_capacity(ef * 2);
        let mut results: BinaryHeap<Furthest> = BinaryHeap::with_capacity(ef + 1);
        // Only ever grows, so the beam never narrows mid-search.
        let mut excluded_admitted = 0usize;

        for &entry in entries {
            if !visited.mark(entry.id) {
                continue;
            }
            candidates.push(Nearest(entry));
            results.push(Furthest(entry));
            if exclude.excludes(entry.id) {
                excluded_admitted += 1;
            }
        }
        while results.len() > ef + excluded_admitted {
            results.pop();
        }

        while let Some(Nearest(current)) = candidates.pop() {
            let worst = results.peek().map_or(f32::INFINITY, |r| r.0.distance);
            if current.distance > worst && results.len() >= ef + excluded_admitted {
                break;
            }

            for n in self.graph.links(current.id, level).iter() {
                if !visited.mark(n) {
                    continue;
                }
                let distance = self.distance_to(query, n);
                let worst = results.peek().map_or(f32::INFINITY, |r| r.0.distance);
                if results.len() < ef + excluded_admitted || distance < worst {
                    let hit = Hit { id: n, distance };
                    candidates.push(Nearest(hit));
                    results.push(Furthest(hit));
                    if exclude.excludes(n) {
                        excluded_admitted += 1;
                    }
                    if results.len() > ef + excluded_admitted {
                        results.pop();
                    }
                }
            }
        }

        let mut hits: Vec<Hit> = results
            .into_sorted_vec()
            .into_iter()
            .map(|r| r.0)
            .filter(|hit| !exclude.excludes(hit.id))
            .collect();
        hits.truncate(ef);
        hits
    }
}
