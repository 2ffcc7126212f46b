//! # Procgen Error Types
//!
//! All errors that can occur while generating an island.
//!
//! Degenerate input (no points, zero-area bounds, fewer than three sites)
//! is never an error: those stages return empty output instead.

use thiserror::Error;

/// Errors that can occur in the generation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcgenError {
    /// A flat coordinate buffer did not hold whole `(x, y)` pairs.
    #[error("mismatched coordinate buffer: {len} values is not a whole number of points")]
    MismatchedCoordinates {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// A triangulation input point was NaN or infinite.
    #[error("non-finite coordinate at point {index}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },

    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read or parsed.
    #[error("configuration unreadable: {0}")]
    ConfigIo(String),
}

/// Result type for pipeline operations.
pub type ProcgenResult<T> = Result<T, ProcgenError>;
