//! # Atlas Mesh
//!
//! Turns binary region masks into closed, decimated surface meshes.
//!
//! ## Architecture
//!
//! ```text
//! RegionMask → morphology → isosurface → [largest component] → decimate → [smooth] → [scale] → OBJ
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust:
//! - **Isosurface**: Marching tetrahedra over a Kuhn cube split, capped at the border
//! - **Decimation**: Quadric error edge collapse with link-condition checks
//! - **Smoothing**: Taubin λ/μ filtering
//! - **Components**: Union-find over triangle vertices
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_mesh::{extract_mesh_from_mask, ExtractionParams};
//!
//! let mesh = extract_mesh_from_mask(&mask, Some(&path), &ExtractionParams::region())?;
//! println!("{} vertices", mesh.vertex_count());
//! ```

pub mod error;
pub mod extract;
pub mod io;
pub mod isosurface;
pub mod mesh;
pub mod ops;

pub use error::{MeshError, MeshResult};
pub use extract::{extract_mesh_from_mask, ExtractionParams};
pub use io::{read_obj_file, write_obj_file};
pub use isosurface::extract_isosurface;
pub use mesh::Mesh;
