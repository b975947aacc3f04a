//! # Extraction Pipeline Tests

use super::*;
use crate::io::read_obj_file;
use approx::assert_relative_eq;
use config::constants::MIN_MESH_FILE_BYTES;
use glam::DVec3;
use ndarray::Array3;

fn block_mask(shape: (usize, usize, usize), lo: usize, hi: usize) -> RegionMask {
    RegionMask::new(Array3::from_shape_fn(shape, |(x, y, z)| {
        (lo..hi).contains(&x) && (lo..hi).contains(&y) && (lo..hi).contains(&z)
    }))
}

fn single_voxel() -> RegionMask {
    let mut data = Array3::from_elem((5, 5, 5), false);
    data[[2, 2, 2]] = true;
    RegionMask::new(data)
}

#[test]
fn test_empty_mask_is_rejected() {
    let mask = RegionMask::empty([4, 4, 4]);
    assert!(matches!(
        extract_mesh_from_mask(&mask, None, &ExtractionParams::default()),
        Err(MeshError::EmptyMask)
    ));
}

#[test]
fn test_single_voxel_yields_closed_surface() {
    let mesh = extract_mesh_from_mask(&single_voxel(), None, &ExtractionParams::default()).unwrap();
    assert!(mesh.vertex_count() >= 4);
    assert!(mesh.signed_volume() > 0.0);
    assert!(mesh.is_watertight());
}

#[test]
fn test_missing_directory_fails_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("1.obj");
    // Even an empty mask reports the path problem first
    let err = extract_mesh_from_mask(&RegionMask::empty([2, 2, 2]), Some(&path), &ExtractionParams::default())
        .unwrap_err();
    assert!(matches!(err, MeshError::OutputPath { .. }));
}

#[test]
fn test_invalid_params_fail_before_work() {
    let params = ExtractionParams {
        decimate_fraction: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        extract_mesh_from_mask(&single_voxel(), None, &params),
        Err(MeshError::InvalidParameter { .. })
    ));
}

#[test]
fn test_writes_obj_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("5.obj");
    let mask = block_mask((12, 12, 12), 3, 9);
    let mesh = extract_mesh_from_mask(&mask, Some(&path), &ExtractionParams::default()).unwrap();

    let size = std::fs::metadata(&path).unwrap().len();
    assert!(size >= MIN_MESH_FILE_BYTES);
    let loaded = read_obj_file(&path).unwrap();
    assert_eq!(loaded.vertex_count(), mesh.vertex_count());
    assert_eq!(loaded.triangles(), mesh.triangles());

    let normals = mesh.normals().unwrap();
    assert_eq!(normals.len(), mesh.vertex_count());
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), normals.len());
}

#[test]
fn test_decimation_reduces_vertices() {
    let mask = block_mask((12, 12, 12), 3, 9);
    let full = ExtractionParams {
        decimate_fraction: 1.0,
        ..Default::default()
    };
    let reduced = ExtractionParams {
        decimate_fraction: 0.3,
        ..Default::default()
    };
    let a = extract_mesh_from_mask(&mask, None, &full).unwrap();
    let b = extract_mesh_from_mask(&mask, None, &reduced).unwrap();
    assert!(b.vertex_count() < a.vertex_count());
}

#[test]
fn test_closing_bridges_gaps() {
    // Two slabs one voxel apart merge into one body after closing
    let mask = RegionMask::new(Array3::from_shape_fn((12, 12, 12), |(x, y, z)| {
        (2..10).contains(&x) && (2..10).contains(&y) && [3, 4, 6, 7].contains(&z)
    }));
    let open = ExtractionParams {
        closing_iterations: None,
        decimate_fraction: 1.0,
        ..Default::default()
    };
    let closed = ExtractionParams {
        closing_iterations: Some(2),
        decimate_fraction: 1.0,
        ..Default::default()
    };
    let open_mesh = extract_mesh_from_mask(&mask, None, &open).unwrap();
    let closed_mesh = extract_mesh_from_mask(&mask, None, &closed).unwrap();
    assert_eq!(crate::ops::connected_components(&open_mesh).len(), 2);
    assert_eq!(crate::ops::connected_components(&closed_mesh).len(), 1);
}

#[test]
fn test_largest_component_is_opt_in() {
    // Bilateral region: two separate blocks
    let mask = RegionMask::new(Array3::from_shape_fn((18, 8, 8), |(x, y, z)| {
        ((2..6).contains(&x) || (12..16).contains(&x)) && (2..6).contains(&y) && (2..6).contains(&z)
    }));
    let both = extract_mesh_from_mask(&mask, None, &ExtractionParams::default()).unwrap();
    assert_eq!(crate::ops::connected_components(&both).len(), 2);

    let params = ExtractionParams {
        extract_largest: true,
        ..Default::default()
    };
    let one = extract_mesh_from_mask(&mask, None, &params).unwrap();
    assert_eq!(crate::ops::connected_components(&one).len(), 1);
}

#[test]
fn test_resolution_scales_output() {
    let mask = block_mask((10, 10, 10), 2, 8);
    let base = ExtractionParams {
        decimate_fraction: 1.0,
        ..Default::default()
    };
    let scaled = ExtractionParams {
        resolution: Some([10.0, 10.0, 25.0]),
        ..base.clone()
    };
    let a = extract_mesh_from_mask(&mask, None, &base).unwrap();
    let b = extract_mesh_from_mask(&mask, None, &scaled).unwrap();
    assert_relative_eq!(b.signed_volume(), a.signed_volume() * 2500.0, max_relative = 1e-9);
    assert_eq!(b.vertex(0), a.vertex(0) * DVec3::new(10.0, 10.0, 25.0));
}

#[test]
fn test_smoothing_moves_vertices_not_topology() {
    let mask = block_mask((10, 10, 10), 2, 8);
    let plain = ExtractionParams::default();
    let smooth = ExtractionParams {
        smooth: true,
        ..Default::default()
    };
    let a = extract_mesh_from_mask(&mask, None, &plain).unwrap();
    let b = extract_mesh_from_mask(&mask, None, &smooth).unwrap();
    assert_eq!(a.triangles(), b.triangles());
    assert_ne!(a.vertices(), b.vertices());
}
