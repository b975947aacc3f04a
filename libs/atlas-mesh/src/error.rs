//! # Mesh Errors
//!
//! Error types for surface extraction and mesh persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting, processing or writing meshes.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mask has no foreground voxels
    #[error("Mask has no foreground voxels")]
    EmptyMask,

    /// Surface extraction produced no usable surface
    #[error("Degenerate mesh: {message}")]
    DegenerateMesh { message: String },

    /// The directory a mesh should be written to does not exist
    #[error("Output directory does not exist: {}", path.display())]
    OutputPath { path: PathBuf },

    /// Reading or writing a mesh file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An extraction parameter is out of range
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A mesh file could not be parsed
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl MeshError {
    /// Creates a degenerate mesh error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateMesh {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for per-region conditions that skip a node instead of
    /// aborting a batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyMask | Self::DegenerateMesh { .. })
    }
}

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_variants() {
        assert!(MeshError::EmptyMask.is_recoverable());
        assert!(MeshError::degenerate("no triangles").is_recoverable());
        assert!(!MeshError::OutputPath {
            path: PathBuf::from("/missing")
        }
        .is_recoverable());
        assert!(!MeshError::invalid_parameter("fraction").is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = MeshError::parse(3, "bad face");
        assert_eq!(err.to_string(), "Parse error at line 3: bad face");
        let err = MeshError::OutputPath {
            path: PathBuf::from("/no/such/dir"),
        };
        assert!(err.to_string().contains("/no/such/dir"));
    }
}
