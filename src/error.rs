//! Error types for navgraph.
//!
//! Only construction-time validation and vector ingestion return errors. Violated graph
//! invariants during `add_doc` / `remove_doc` are programming errors and panic.

use crate::vectors::DocId;
use thiserror::Error;

/// Errors that can occur while configuring an index or loading vectors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Vector length does not match the configured dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Graph structure violates an invariant (reported by link validation).
    #[error("inconsistent graph at node {id}, level {level}: {reason}")]
    InconsistentGraph {
        id: DocId,
        level: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, IndexError>;
