//! # Mesh Generation Errors
//!
//! Run-level failures. Per-region problems never surface here; they are
//! recorded as task outcomes instead.

use atlas_structures::StructureError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole mesh generation run.
#[derive(Debug, Error)]
pub enum MeshGenError {
    /// The structure list is malformed or could not be read or written
    #[error("Structure list error: {0}")]
    Structure(#[from] StructureError),

    /// The meshes directory does not exist
    #[error("Meshes directory does not exist: {}", path.display())]
    OutputPath { path: PathBuf },

    /// The run configuration is invalid or unreadable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The worker pool could not be created
    #[error("Worker pool error: {message}")]
    ThreadPool { message: String },

    /// Reading or writing run outputs failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the registry failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshGenError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
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
}

/// Result type alias for mesh generation runs.
pub type MeshGenResult<T> = Result<T, MeshGenError>;
