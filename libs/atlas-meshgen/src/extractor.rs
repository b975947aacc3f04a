//! Seam between the orchestrator and the surface pipeline.

use atlas_mesh::{extract_mesh_from_mask, ExtractionParams, MeshResult};
use atlas_volume::RegionMask;
use std::path::Path;

/// Turns one region mask into a mesh file.
///
/// Implementations are shared across worker threads.
pub trait MeshExtractor: Send + Sync {
    /// Extracts the surface of `mask` and writes it to `obj_path`.
    fn extract(&self, mask: &RegionMask, obj_path: &Path, params: &ExtractionParams) -> MeshResult<()>;
}

/// The production extractor backed by [`extract_mesh_from_mask`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SurfaceExtractor;

impl MeshExtractor for SurfaceExtractor {
    fn extract(&self, mask: &RegionMask, obj_path: &Path, params: &ExtractionParams) -> MeshResult<()> {
        extract_mesh_from_mask(mask, Some(obj_path), params).map(|_| ())
    }
}
