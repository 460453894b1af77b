//! Graph store: per-document link lists for every level, plus the entry point.
//!
//! Nodes live in a dense `Vec` indexed by [`DocId`]. Links are ids, never references, so a
//! removed node is simply reset to zero levels and its slot is reused on reinsertion.

use crate::vectors::DocId;
use smallvec::SmallVec;

/// Inline capacity of a link list. Covers `2M` for the default `M = 16`; the transient
/// `2M + 1` before a shrink spills to the heap.
const INLINE_LINKS: usize = 32;

/// Unordered set of neighbor ids for one (node, level) pair.
///
/// Lists are short (bounded by `M` or `2M`), so membership and removal are linear scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkList {
    ids: SmallVec<[DocId; INLINE_LINKS]>,
}

impl LinkList {
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: DocId) -> bool {
        self.ids.contains(&id)
    }

    /// Append a neighbor. The caller guarantees it is not already present.
    #[inline]
    pub fn push(&mut self, id: DocId) {
        debug_assert!(!self.contains(id), "duplicate link to {id}");
        self.ids.push(id);
    }

    /// Remove a neighbor by swapping it with the last entry.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the list: the symmetric-link invariant guarantees that
    /// every removal targets an existing link.
    pub fn remove(&mut self, id: DocId) {
        let pos = self
            .ids
            .iter()
            .position(|&n| n == id)
            .unwrap_or_else(|| panic!("link to {id} not found"));
        self.ids.swap_remove(pos);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[inline]
    pub fn as_slice(&self) -> &[DocId] {
        &self.ids
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<DocId> for LinkList {
    fn from_iter<T: IntoIterator<Item = DocId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// One slot of the graph store. A node with `L` levels owns link lists for `0..L`.
#[derive(Debug, Clone, Default)]
pub struct Node {
    levels: Vec<LinkList>,
}

impl Node {
    /// Number of levels this node participates in (0 when not indexed).
    #[inline]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.levels.is_empty()
    }

    #[inline]
    pub fn has_level(&self, level: usize) -> bool {
        level < self.levels.len()
    }
}

/// Highest-level node, where every traversal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub id: DocId,
    pub level: usize,
}

/// Dense by-id array of nodes plus the designated entry point. Never shrinks.
#[derive(Debug, Default)]
pub(crate) struct GraphStore {
    nodes: Vec<Node>,
    entry: Option<EntryPoint>,
}

impl GraphStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of slots (highest id seen + 1), live or not.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Grow the store so that `id` has a slot.
    pub(crate) fn ensure_capacity(&mut self, id: DocId) {
        let needed = id as usize + 1;
        if self.nodes.len() < needed {
            self.nodes.resize_with(needed, Node::default);
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: DocId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub(crate) fn is_live(&self, id: DocId) -> bool {
        self.node(id).is_some_and(Node::is_live)
    }

    #[inline]
    pub(crate) fn num_levels(&self, id: DocId) -> usize {
        self.node(id).map_or(0, Node::num_levels)
    }

    /// Allocate `num_levels` empty link lists for a node that currently has none.
    ///
    /// # Panics
    ///
    /// Panics if the node is already indexed.
    pub(crate) fn init_node(&mut self, id: DocId, num_levels: usize) {
        self.ensure_capacity(id);
        let node = &mut self.nodes[id as usize];
        assert!(!node.is_live(), "document {id} is already indexed");
        node.levels = vec![LinkList::default(); num_levels];
    }

    /// Drop every level of a node. The slot stays allocated for reuse.
    pub(crate) fn reset_node(&mut self, id: DocId) {
        self.nodes[id as usize].levels = Vec::new();
    }

    #[inline]
    pub(crate) fn links(&self, id: DocId, level: usize) -> &LinkList {
        &self.nodes[id as usize].levels[level]
    }

    #[inline]
    pub(crate) fn links_mut(&mut self, id: DocId, level: usize) -> &mut LinkList {
        &mut self.nodes[id as usize].levels[level]
    }

    /// Add the undirected edge `a <-> b` at `level`.
    pub(crate) fn connect(&mut self, a: DocId, b: DocId, level: usize) {
        debug_assert_ne!(a, b, "self link");
        self.links_mut(a, level).push(b);
        self.links_mut(b, level).push(a);
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<EntryPoint> {
        self.entry
    }

    pub(crate) fn set_entry(&mut self, entry: Option<EntryPoint>) {
        self.entry = entry;
    }

    /// Ids of all live nodes in ascending order.
    pub(crate) fn live_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_live())
            .map(|(id, _)| id as DocId)
    }

    /// Live node with the most levels; the lowest id wins ties.
    pub(crate) fn highest_live_node(&self) -> Option<EntryPoint> {
        let mut best: Option<EntryPoint> = None;
        for id in self.live_ids() {
            let level = self.num_levels(id) - 1;
            if best.map_or(true, |b| level > b.level) {
                best = Some(EntryPoint { id, level });
            }
        }
        best
    }

    /// Approximate heap footprint of the link structure in bytes.
    pub(crate) fn size_bytes(&self) -> usize {
        let slots = self.nodes.capacity() * std::mem::size_of::<Node>();
        let lists: usize = self
            .nodes
            .iter()
            .map(|node| {
                node.levels.capacity() * std::mem::size_of::<LinkList>()
                    + node
                        .levels
                        .iter()
                        .filter(|l| l.ids.spilled())
                        .map(|l| l.ids.capacity() * std::mem::size_of::<DocId>())
                        .sum::<usize>()
            })
            .sum();
        slots + lists
    }
}
