//! # Atlas Volume
//!
//! Annotation volumes and the binary masks derived from them.
//!
//! ## Architecture
//!
//! ```text
//! AnnotationVolume + StructureTree node → RegionMask → morphology → atlas-mesh
//! ```
//!
//! The annotation volume is immutable and shared read-only between workers;
//! masks are built per node and dropped once the mesh has been extracted.

pub mod error;
pub mod mask;
pub mod morphology;
pub mod volume;

pub use error::{VolumeError, VolumeResult};
pub use mask::{
    build_mask, mask_for_label, mask_for_structure, mask_greater_than, selection_for_structure,
    LabelSelection, RegionMask,
};
pub use volume::AnnotationVolume;
