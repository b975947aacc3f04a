//! # Configuration Constants
//!
//! Centralized constants for the atlas meshing pipeline. Precision values,
//! surface extraction defaults, output layout and batch limits are all
//! defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Hierarchy**: Reserved acronyms and labels
//! - **Extraction**: Isosurface, morphology, decimation and smoothing defaults
//! - **Output**: File naming and registry thresholds
//! - **Execution**: Worker pool sizing and progress reporting

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Used for determining if two floating-point values are "equal" within
/// numerical tolerance.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Epsilon for degenerate triangle detection.
///
/// Triangles whose doubled area falls below this value are treated as
/// zero-area during mesh validation and decimation.
///
/// # Example
///
/// ```rust
/// use config::constants::{EPSILON, VERTEX_MERGE_EPSILON};
///
/// assert!(VERTEX_MERGE_EPSILON > EPSILON);
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1e-8;

// =============================================================================
// HIERARCHY CONSTANTS
// =============================================================================

/// Acronym that identifies the single root structure of an atlas.
///
/// # Example
///
/// ```rust
/// use config::constants::ROOT_ACRONYM;
///
/// assert_eq!(ROOT_ACRONYM, "root");
/// ```
pub const ROOT_ACRONYM: &str = "root";

/// Label value marking unannotated voxels in an annotation volume.
///
/// # Example
///
/// ```rust
/// use config::constants::BACKGROUND_LABEL;
///
/// let voxel: u32 = 0;
/// assert_eq!(voxel, BACKGROUND_LABEL);
/// ```
pub const BACKGROUND_LABEL: u32 = 0;

// =============================================================================
// EXTRACTION CONSTANTS
// =============================================================================

/// Scalar threshold for isosurface extraction over a binary mask.
///
/// Binary fields only take the values 0 and 1, so the surface is placed
/// half way between background and foreground voxel centers.
pub const ISOSURFACE_THRESHOLD: f64 = 0.5;

/// Default number of morphological closing iterations for regular regions.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_REGION_CLOSING_ITERATIONS, DEFAULT_ROOT_CLOSING_ITERATIONS};
///
/// assert!(DEFAULT_ROOT_CLOSING_ITERATIONS <= DEFAULT_REGION_CLOSING_ITERATIONS);
/// ```
pub const DEFAULT_REGION_CLOSING_ITERATIONS: u32 = 2;

/// Default number of morphological closing iterations for the root region.
///
/// The root surface is large and already smooth, so it needs fewer passes.
pub const DEFAULT_ROOT_CLOSING_ITERATIONS: u32 = 1;

/// Default fraction of vertices kept by decimation.
///
/// `1.0` disables decimation entirely.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_DECIMATE_FRACTION;
///
/// let vertices = 1000usize;
/// let target = (vertices as f64 * DEFAULT_DECIMATE_FRACTION).round() as usize;
/// assert_eq!(target, 600);
/// ```
pub const DEFAULT_DECIMATE_FRACTION: f64 = 0.6;

/// Smallest vertex count decimation will reduce a mesh to.
///
/// A tetrahedron is the smallest closed triangulated surface.
pub const MIN_DECIMATED_VERTICES: usize = 4;

/// Minimum cosine between a face normal before and after an edge collapse.
///
/// Collapses that rotate any surrounding face further than this are
/// rejected to prevent fold-overs.
pub const DECIMATION_MIN_NORMAL_ALIGNMENT: f64 = 0.2;

/// Default number of smoothing passes when smoothing is enabled.
pub const DEFAULT_SMOOTHING_ITERATIONS: u32 = 15;

/// Taubin smoothing shrink weight (positive pass).
pub const TAUBIN_LAMBDA: f64 = 0.5;

/// Taubin smoothing inflate weight (negative pass).
///
/// # Example
///
/// ```rust
/// use config::constants::{TAUBIN_LAMBDA, TAUBIN_MU};
///
/// // Taubin smoothing requires |mu| slightly larger than lambda
/// assert!(-TAUBIN_MU > TAUBIN_LAMBDA);
/// ```
pub const TAUBIN_MU: f64 = -0.53;

// =============================================================================
// OUTPUT CONSTANTS
// =============================================================================

/// File extension used for persisted region meshes.
pub const MESH_FILE_EXTENSION: &str = "obj";

/// Directory name that holds region meshes inside an atlas package.
pub const MESHES_DIRNAME: &str = "meshes";

/// Minimum byte size of a mesh file for it to be registered.
///
/// Smaller files come from degenerate or empty surfaces.
///
/// # Example
///
/// ```rust
/// use config::constants::MIN_MESH_FILE_BYTES;
///
/// let file_size = 128u64;
/// assert!(file_size < MIN_MESH_FILE_BYTES);
/// ```
pub const MIN_MESH_FILE_BYTES: u64 = 512;

/// File name of the id to mesh path registry handed to packaging.
pub const MESH_REGISTRY_FILENAME: &str = "mesh_registry.json";

/// File name of the filtered structure list handed to packaging.
pub const STRUCTURES_FILENAME: &str = "structures_with_mesh.json";

// =============================================================================
// EXECUTION CONSTANTS
// =============================================================================

/// Cores left free when sizing the default worker pool.
pub const RESERVED_CORES: usize = 2;

/// Number of nodes between progress reports in sequential mode.
pub const PROGRESS_REPORT_INTERVAL: usize = 25;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Returns the deterministic mesh file name for a structure id.
///
/// # Example
///
/// ```rust
/// use config::constants::mesh_file_name;
///
/// assert_eq!(mesh_file_name(997), "997.obj");
/// ```
pub fn mesh_file_name(structure_id: u32) -> String {
    format!("{structure_id}.{MESH_FILE_EXTENSION}")
}

/// Computes the default worker pool size from the available parallelism.
///
/// Leaves [`RESERVED_CORES`] free and never returns less than one.
///
/// # Example
///
/// ```rust
/// use config::constants::default_worker_threads;
///
/// assert_eq!(default_worker_threads(8), 6);
/// assert_eq!(default_worker_threads(1), 1);
/// ```
pub fn default_worker_threads(available: usize) -> usize {
    available.saturating_sub(RESERVED_CORES).max(1)
}

/// Checks if two f64 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Checks if a f64 value is approximately zero within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}
