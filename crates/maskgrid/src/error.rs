//! Error types for grid, codec, rasterizer, and tracer operations.

use thiserror::Error;

/// Errors produced by maskgrid operations.
///
/// Every failure is synchronous and deterministic; no operation leaves
/// partial output behind when it returns an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Cell totals disagree with the requested shape
    #[error("shape mismatch: expected {expected} cells, got {actual}")]
    ShapeMismatch { expected: u64, actual: u64 },

    /// A zero-length run, or a truncated run pair in a flat stream
    #[error("invalid run at index {index}")]
    InvalidRun { index: usize },

    /// A polygon path or value list that cannot be rasterized
    #[error("invalid path: {reason}")]
    InvalidPath { reason: &'static str },

    /// An input grid the operation cannot work on
    #[error("invalid input: {reason}")]
    InvalidInput { reason: &'static str },
}

/// Result type for maskgrid operations.
pub type Result<T> = std::result::Result<T, Error>;
