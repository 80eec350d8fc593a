//! Error types for Lifegrid.
//!
//! The simulation core itself is total over the coordinate domain and never
//! returns these. They describe malformed input that collaborators (settings
//! loaders, the persistence layer) reject before it reaches the core.

use thiserror::Error;

/// World and chunk errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Chunk size outside the supported range
    #[error("Invalid chunk size {size}: must be between {min} and {max}")]
    InvalidChunkSize {
        /// Requested size
        size: u32,
        /// Smallest supported size
        min: u32,
        /// Largest supported size
        max: u32,
    },

    /// Local cell index does not fit inside a chunk
    #[error("Local index {index} out of range for chunk size {chunk_size}")]
    LocalIndexOutOfRange {
        /// Offending index
        index: i64,
        /// Chunk side length
        chunk_size: u32,
    },

    /// Negative or otherwise impossible count in external data
    #[error("Invalid {what} count: {count}")]
    InvalidCount {
        /// Which count was invalid
        what: &'static str,
        /// The value read
        count: i64,
    },

    /// Invalid chunk data
    #[error("Invalid chunk data: {0}")]
    InvalidData(String),
}

/// Result type alias for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
