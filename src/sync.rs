//! Thread-safe wrapper for mixing queries with occasional mutation.
//!
//! The indexes themselves are single-writer structures: mutation takes `&mut self`. This
//! wrapper puts one behind a `parking_lot::RwLock` so that any number of threads can query
//! at once while writers are serialized, and bumps a generation counter on every mutation
//! so readers can tell whether results they cached are stale.

use crate::ann::{AnnIndex, AnnStats};
use crate::vectors::DocId;
use parking_lot::{RwLock, RwLockReadGuard};
use roaring::RoaringBitmap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// An index shared between threads. Readers run concurrently; writers are exclusive.
#[derive(Debug, Default)]
pub struct SharedIndex<I> {
    inner: RwLock<I>,
    generation: AtomicU64,
}

impl<I: AnnIndex> SharedIndex<I> {
    pub fn new(index: I) -> Self {
        Self {
            inner: RwLock::new(index),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of completed mutations. Changes only while a writer holds the lock.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn add_doc(&self, id: DocId) {
        self.update(|index| index.add_doc(id));
    }

    pub fn remove_doc(&self, id: DocId) {
        self.update(|index| index.remove_doc(id));
    }

    /// Run `f` with exclusive access, counting it as one mutation.
    ///
    /// Use this to batch several inserts, or to touch the vector source between them.
    pub fn update<R>(&self, f: impl FnOnce(&mut I) -> R) -> R {
        let mut guard = self.inner.write();
        let out = f(&mut guard);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(generation, "index updated");
        out
    }

    pub fn top_k(&self, k: usize, query: &[f32], search_k: usize) -> Vec<(DocId, f64)> {
        self.inner.read().top_k(k, query, search_k)
    }

    pub fn top_k_filter(
        &self,
        k: usize,
        query: &[f32],
        search_k: usize,
        exclude: &RoaringBitmap,
    ) -> Vec<(DocId, f64)> {
        self.inner.read().top_k_filter(k, query, search_k, exclude)
    }

    /// Results tagged with the generation they were computed at.
    pub fn top_k_versioned(
        &self,
        k: usize,
        query: &[f32],
        search_k: usize,
    ) -> (u64, Vec<(DocId, f64)>) {
        let guard = self.inner.read();
        let generation = self.generation();
        (generation, guard.top_k(k, query, search_k))
    }

    /// Shared access for several reads against one consistent state.
    pub fn read(&self) -> RwLockReadGuard<'_, I> {
        self.inner.read()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> AnnStats {
        self.inner.read().stats()
    }

    pub fn into_inner(self) -> I {
        self.inner.into_inner()
    }
}
