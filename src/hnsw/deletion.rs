//! Hard deletion with local repair.
//!
//! A removed node is unlinked from every level, its slot is reset, and each former neighbor
//! that dropped below the low watermark is reconnected to the other former neighbors.

use crate::hnsw::graph::{EntryPoint, LinkList};
use crate::hnsw::index::HnswIndex;
use crate::vectors::{DocId, VectorSource};
use tracing::debug;

impl<V: VectorSource> HnswIndex<V> {
    /// Remove document `id` from the graph. Its vector is left in the source.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not indexed.
    pub fn remove_doc(&mut self, id: DocId) {
        assert!(self.graph.is_live(id), "document {id} is not indexed");

        let num_levels = self.graph.num_levels(id);
        let mut entry = self.graph.entry();
        // former[level] is the link list the node had at that level.
        let mut former: Vec<LinkList> = vec![LinkList::default(); num_levels];

        for level in (0..num_levels).rev() {
            let links = std::mem::take(self.graph.links_mut(id, level));
            for n in links.iter() {
                self.graph.links_mut(n, level).remove(id);
                if entry.is_some_and(|e| e.id == id) {
                    let promoted = EntryPoint {
                        id: n,
                        level: self.graph.num_levels(n) - 1,
                    };
                    debug!(
                        removed = id,
                        entry = n,
                        level = promoted.level,
                        "entry point promoted"
                    );
                    entry = Some(promoted);
                }
            }
            former[level] = links;
        }

        self.graph.reset_node(id);
        self.num_docs -= 1;

        for (level, links) in former.iter().enumerate().rev() {
            for n in links.iter() {
                self.refill(n, level, links.as_slice());
            }
        }

        if entry.is_some_and(|e| e.id == id) {
            entry = self.graph.highest_live_node();
            match entry {
                Some(e) => {
                    debug!(removed = id, entry = e.id, level = e.level, "entry point rescanned")
                }
                None => debug!(removed = id, "index is now empty"),
            }
        }
        self.graph.set_entry(entry);
    }
}
