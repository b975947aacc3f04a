//! # Mesh I/O
//!
//! Wavefront OBJ persistence for region meshes.

pub mod obj;

pub use obj::{read_obj, read_obj_file, write_obj, write_obj_file};
