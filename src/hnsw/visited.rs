//! Epoch-tagged visited sets and the per-index pool that recycles them.
//!
//! A beam search touches a few hundred nodes out of possibly millions. Allocating and
//! zeroing a marker array per call would cost O(graph size), so sets are reused and
//! cleared by bumping a `u16` epoch instead. The array is zeroed only when the epoch wraps.

use crate::vectors::DocId;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Visited marker array. `data[id] == epoch` means `id` was seen in the current pass.
#[derive(Debug)]
pub struct VisitedSet {
    data: Vec<u16>,
    epoch: u16,
}

impl VisitedSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u16; capacity],
            epoch: 1,
        }
    }

    /// Start a new pass. O(1) except on epoch wraparound.
    pub fn clear(&mut self) {
        if self.epoch == u16::MAX {
            self.data.fill(0);
            self.epoch = 1;
        } else {
            self.epoch += 1;
        }
    }

    /// Grow to cover ids `< cap`.
    pub fn ensure_capacity(&mut self, cap: usize) {
        if cap > self.data.len() {
            self.data.resize(cap, 0);
        }
    }

    /// Mark `id`. Returns `true` if it was not marked before in this pass.
    #[inline]
    pub fn mark(&mut self, id: DocId) -> bool {
        let slot = &mut self.data[id as usize];
        if *slot == self.epoch {
            false
        } else {
            *slot = self.epoch;
            true
        }
    }

    #[inline]
    pub fn is_marked(&self, id: DocId) -> bool {
        self.data
            .get(id as usize)
            .is_some_and(|&slot| slot == self.epoch)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}

/// Free list of visited sets owned by one index.
///
/// The mutex is held only while popping or pushing a set, never during traversal, so
/// concurrent readers each work on their own set.
#[derive(Debug, Default)]
pub struct VisitedPool {
    free: Mutex<Vec<VisitedSet>>,
}

impl VisitedPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a cleared set covering at least `min_size` ids.
    pub fn acquire(&self, min_size: usize) -> PooledVisited<'_> {
        let mut set = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| VisitedSet::new(min_size));
        set.ensure_capacity(min_size);
        set.clear();
        PooledVisited {
            pool: self,
            set: Some(set),
        }
    }

    /// Number of idle sets.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

/// A visited set on loan from a [`VisitedPool`]; returned on drop.
pub struct PooledVisited<'a> {
    pool: &'a VisitedPool,
    set: Option<VisitedSet>,
}

impl Deref for PooledVisited<'_> {
    type Target = VisitedSet;

    fn deref(&self) -> &VisitedSet {
        self.set.as_ref().expect("visited set present until drop")
    }
}

impl DerefMut for PooledVisited<'_> {
    fn deref_mut(&mut self) -> &mut VisitedSet {
        self.set.as_mut().expect("visited set present until drop")
    }
}

impl Drop for PooledVisited<'_> {
    fn drop(&mut self) {
        if let Some(set) = self.set.take() {
            self.pool.free.lock().push(set);
        }
    }
}
