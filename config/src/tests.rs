//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants
//! and helper functions.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_vertex_merge_epsilon_larger_than_epsilon() {
    assert!(
        VERTEX_MERGE_EPSILON >= EPSILON,
        "VERTEX_MERGE_EPSILON should be >= EPSILON"
    );
}

// =============================================================================
// EXTRACTION TESTS
// =============================================================================

#[test]
fn test_threshold_between_background_and_foreground() {
    assert!(ISOSURFACE_THRESHOLD > 0.0 && ISOSURFACE_THRESHOLD < 1.0);
}

#[test]
fn test_root_closes_less_than_regions() {
    assert!(DEFAULT_ROOT_CLOSING_ITERATIONS < DEFAULT_REGION_CLOSING_ITERATIONS);
}

#[test]
fn test_decimate_fraction_in_range() {
    assert!(DEFAULT_DECIMATE_FRACTION > 0.0);
    assert!(DEFAULT_DECIMATE_FRACTION <= 1.0);
}

#[test]
fn test_min_decimated_vertices_is_tetrahedron() {
    assert_eq!(MIN_DECIMATED_VERTICES, 4);
}

#[test]
fn test_taubin_weights() {
    assert!(TAUBIN_LAMBDA > 0.0);
    assert!(TAUBIN_MU < 0.0);
    assert!(TAUBIN_MU.abs() > TAUBIN_LAMBDA);
}

#[test]
fn test_normal_alignment_is_cosine() {
    assert!(DECIMATION_MIN_NORMAL_ALIGNMENT > -1.0);
    assert!(DECIMATION_MIN_NORMAL_ALIGNMENT < 1.0);
}

// =============================================================================
// OUTPUT TESTS
// =============================================================================

#[test]
fn test_mesh_file_name_uses_id() {
    assert_eq!(mesh_file_name(1), "1.obj");
    assert_eq!(mesh_file_name(999), "999.obj");
}

#[test]
fn test_min_mesh_file_bytes() {
    assert_eq!(MIN_MESH_FILE_BYTES, 512);
}

// =============================================================================
// EXECUTION TESTS
// =============================================================================

#[test]
fn test_default_worker_threads_reserves_cores() {
    assert_eq!(default_worker_threads(16), 14);
    assert_eq!(default_worker_threads(3), 1);
}

#[test]
fn test_default_worker_threads_never_zero() {
    assert_eq!(default_worker_threads(0), 1);
}

#[test]
fn test_approx_helpers() {
    assert!(approx_equal(0.5, 0.5 + 1e-12));
    assert!(approx_zero(-1e-12));
    assert!(!approx_zero(1e-3));
}
