//! # Volume Errors
//!
//! Error types for volume construction and mask arithmetic.

use thiserror::Error;

/// Errors that can occur while building volumes or combining masks.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// The voxel buffer does not match the requested shape
    #[error("Cannot shape {len} voxels as {shape:?}")]
    Shape { shape: [usize; 3], len: usize },

    /// Two volumes or masks that must align have different shapes
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        actual: [usize; 3],
    },
}

/// Result type alias for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;
