//! # Structure Errors
//!
//! Configuration errors raised while reading or validating a structure list.
//! All of them are fatal for a meshing run and are reported before any
//! volume is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or querying the structure hierarchy.
#[derive(Debug, Error)]
pub enum StructureError {
    /// The structure list could not be read from disk
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The structure list is not valid JSON or has the wrong shape
    #[error("Invalid structure JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No structures were supplied
    #[error("Structure list is empty")]
    EmptyList,

    /// A record has an empty `structure_id_path`
    #[error("Structure {id} has an empty structure_id_path")]
    EmptyPath { id: u32 },

    /// A record uses the background label as its id
    #[error("Structure id {id} is reserved for background")]
    ReservedId { id: u32 },

    /// A record's path does not end with its own id
    #[error("Structure {id} has a structure_id_path ending in {last}, expected {id}")]
    PathMismatch { id: u32, last: u32 },

    /// Two records share an id
    #[error("Duplicate structure id: {id}")]
    DuplicateId { id: u32 },

    /// Two records share an acronym
    #[error("Duplicate structure acronym: {acronym}")]
    DuplicateAcronym { acronym: String },

    /// No record has a path of length one
    #[error("Structure list has no root")]
    NoRoot,

    /// More than one record has a path of length one
    #[error("Structure list has multiple roots: {ids:?}")]
    MultipleRoots { ids: Vec<u32> },

    /// The only root does not carry the reserved root acronym
    #[error("Root structure {id} has acronym '{acronym}', expected 'root'")]
    RootAcronym { id: u32, acronym: String },

    /// A record's parent id is not present in the list
    #[error("Structure {id} references missing parent {parent}")]
    MissingParent { id: u32, parent: u32 },

    /// Records whose parent chain never reaches the root (cycles)
    #[error("Structures not reachable from root: {ids:?}")]
    Unreachable { ids: Vec<u32> },

    /// A query named an id that is not in the tree
    #[error("Unknown structure id: {id}")]
    UnknownStructure { id: u32 },
}

/// Result type alias for structure operations.
pub type StructureResult<T> = Result<T, StructureError>;
