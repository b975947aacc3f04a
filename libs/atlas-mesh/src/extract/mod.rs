//! # Mask → Mesh Pipeline
//!
//! Converts one binary region mask into a cleaned, decimated surface and
//! optionally persists it.
//!
//! ## Stages
//!
//! The order is fixed; reordering changes the output shape.
//!
//! 1. Validate parameters and the output directory
//! 2. Reject empty masks
//! 3. Fill holes and close (skipped when `closing_iterations` is `None` or 0)
//! 4. Isosurface at `threshold`, capped at the volume border
//! 5. Keep the largest component (opt-in)
//! 6. Decimate to `decimate_fraction` of the vertices
//! 7. Taubin smoothing (opt-in), after decimation
//! 8. Scale into physical units when a resolution is given
//! 9. Compute vertex normals and write the OBJ file

mod params;

#[cfg(test)]
mod tests;

pub use params::ExtractionParams;

use crate::error::{MeshError, MeshResult};
use crate::io::write_obj_file;
use crate::isosurface::extract_isosurface;
use crate::mesh::Mesh;
use crate::ops::{decimate, largest_component, smooth_taubin};
use atlas_volume::morphology::{close, fill_holes};
use atlas_volume::RegionMask;
use std::path::Path;
use tracing::{debug, trace};

/// Extracts the surface of a mask and writes it to `obj_path` if given.
///
/// # Arguments
///
/// * `mask` - Binary region mask
/// * `obj_path` - Target OBJ file; its parent directory must exist
/// * `params` - Numeric pipeline configuration
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] for out-of-range parameters
/// - [`MeshError::OutputPath`] if the target directory is missing (checked
///   before any work)
/// - [`MeshError::EmptyMask`] if the mask has no foreground voxels
/// - [`MeshError::DegenerateMesh`] if no surface survives extraction
/// - [`MeshError::Io`] if the file cannot be written
///
/// # Example
///
/// ```rust,ignore
/// let mesh = extract_mesh_from_mask(&mask, Some(&meshes_dir.join("997.obj")), &ExtractionParams::root())?;
/// ```
pub fn extract_mesh_from_mask(
    mask: &RegionMask,
    obj_path: Option<&Path>,
    params: &ExtractionParams,
) -> MeshResult<Mesh> {
    params.validate()?;
    if let Some(path) = obj_path {
        check_output_dir(path)?;
    }

    if mask.is_empty() {
        return Err(MeshError::EmptyMask);
    }

    let closed;
    let field = match params.closing_iterations {
        Some(iterations) if iterations > 0 => {
            trace!(iterations, "filling holes and closing");
            closed = close(&fill_holes(mask), iterations);
            &closed
        }
        _ => mask,
    };

    let mut mesh = extract_isosurface(field, params.threshold);
    if mesh.is_empty() {
        return Err(MeshError::degenerate("isosurface has no triangles"));
    }

    if params.extract_largest {
        mesh = largest_component(&mesh);
    }

    mesh = decimate(&mesh, params.decimate_fraction);

    if params.smooth {
        smooth_taubin(&mut mesh, params.smoothing_iterations);
    }

    if let Some(scale) = params.scale() {
        mesh.scale(scale);
    }

    if !mesh.validate() || mesh.signed_volume() <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "surface with {} vertices encloses no volume",
            mesh.vertex_count()
        )));
    }

    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "extracted region mesh"
    );

    mesh.compute_normals();
    if let Some(path) = obj_path {
        write_obj_file(&mesh, path)?;
    }
    Ok(mesh)
}

fn check_output_dir(path: &Path) -> MeshResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(MeshError::OutputPath {
                path: parent.to_path_buf(),
            })
        }
        _ => Ok(()),
    }
}
