//! Vector access.
//!
//! Indexes never own or copy vectors. They hold a [`VectorSource`] and look vectors up by
//! document id whenever a distance is needed.

use crate::error::{IndexError, Result};
use std::sync::Arc;

/// Caller-assigned document identifier. Ids are expected to be dense in `[0, max_id]`.
pub type DocId = u32;

/// Read-only mapping from document id to its fixed-length vector.
pub trait VectorSource {
    /// Length of every vector served by this source.
    fn num_dims(&self) -> usize;

    /// Vector for `id`. Implementations may panic for ids they do not hold.
    fn vector(&self, id: DocId) -> &[f32];
}

impl<T: VectorSource + ?Sized> VectorSource for &T {
    fn num_dims(&self) -> usize {
        (**self).num_dims()
    }

    fn vector(&self, id: DocId) -> &[f32] {
        (**self).vector(id)
    }
}

impl<T: VectorSource + ?Sized> VectorSource for Arc<T> {
    fn num_dims(&self) -> usize {
        (**self).num_dims()
    }

    fn vector(&self, id: DocId) -> &[f32] {
        (**self).vector(id)
    }
}

/// Contiguous row-major vector store: row `i` holds the vector of document `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatVectors {
    num_dims: usize,
    data: Vec<f32>,
}

impl FlatVectors {
    /// Create an empty store for vectors of length `num_dims`.
    pub fn new(num_dims: usize) -> Result<Self> {
        Self::with_capacity(num_dims, 0)
    }

    /// Create an empty store with room for `capacity` vectors.
    pub fn with_capacity(num_dims: usize, capacity: usize) -> Result<Self> {
        if num_dims == 0 {
            return Err(IndexError::InvalidParameter(
                "num_dims must be greater than 0".into(),
            ));
        }
        Ok(Self {
            num_dims,
            data: Vec::with_capacity(num_dims * capacity),
        })
    }

    /// Build a store from rows; row `i` becomes document `i`.
    pub fn from_rows<I, R>(num_dims: usize, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f32]>,
    {
        let mut store = Self::new(num_dims)?;
        for row in rows {
            store.push(row.as_ref())?;
        }
        Ok(store)
    }

    /// Append a vector and return the id it was stored under.
    pub fn push(&mut self, vector: &[f32]) -> Result<DocId> {
        self.check_len(vector)?;
        let id = self.len() as DocId;
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    /// Store `vector` under `id`, growing the store with zero rows if needed.
    pub fn insert(&mut self, id: DocId, vector: &[f32]) -> Result<()> {
        self.check_len(vector)?;
        let start = id as usize * self.num_dims;
        let end = start + self.num_dims;
        if self.data.len() < end {
            self.data.resize(end, 0.0);
        }
        self.data[start..end].copy_from_slice(vector);
        Ok(())
    }

    /// Vector for `id`, if stored.
    pub fn get(&self, id: DocId) -> Option<&[f32]> {
        let start = id as usize * self.num_dims;
        self.data.get(start..start + self.num_dims)
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.num_dims
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_len(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.num_dims {
            return Err(IndexError::DimensionMismatch {
                expected: self.num_dims,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl VectorSource for FlatVectors {
    fn num_dims(&self) -> usize {
        self.num_dims
    }

    #[inline]
    fn vector(&self, id: DocId) -> &[f32] {
        let start = id as usize * self.num_dims;
        &self.data[start..start + self.num_dims]
    }
}
