//! Subtree masks through the full extraction pipeline.

use atlas_mesh::{extract_mesh_from_mask, read_obj_file, ExtractionParams, MeshError};
use atlas_structures::{StructureRecord, StructureTree};
use atlas_volume::{mask_for_structure, AnnotationVolume};
use ndarray::Array3;

fn tree() -> StructureTree {
    StructureTree::from_records(&[
        StructureRecord::new(999, "root", "root", [255, 255, 255], vec![999]),
        StructureRecord::new(101, "P", "parent", [200, 0, 0], vec![999, 101]),
        StructureRecord::new(1, "L", "left", [0, 200, 0], vec![999, 101, 1]),
        StructureRecord::new(5, "R", "right", [0, 0, 200], vec![999, 101, 5]),
        StructureRecord::new(7, "E", "empty", [9, 9, 9], vec![999, 7]),
    ])
    .unwrap()
}

/// Label 1 and label 5 as two touching blocks.
fn volume() -> AnnotationVolume {
    AnnotationVolume::new(Array3::from_shape_fn((16, 10, 10), |(x, y, z)| {
        let inside = (2..8).contains(&y) && (2..8).contains(&z);
        match x {
            2..=6 if inside => 1,
            7..=12 if inside => 5,
            _ => 0,
        }
    }))
}

#[test]
fn parent_surface_encloses_both_children() {
    let (tree, volume) = (tree(), volume());
    let params = ExtractionParams {
        decimate_fraction: 1.0,
        ..ExtractionParams::region()
    };
    let volume_of = |id| {
        let mask = mask_for_structure(&volume, &tree, id).unwrap();
        extract_mesh_from_mask(&mask, None, &params).unwrap().signed_volume()
    };
    let (left, right, parent) = (volume_of(1), volume_of(5), volume_of(101));
    assert!(parent > left.max(right));
    // Only the chamfers along the shared face are gained
    assert!(parent < left + right + 36.0);
}

#[test]
fn root_uses_root_params_and_matches_parent_surface() {
    let (tree, volume) = (tree(), volume());
    let dir = tempfile::tempdir().unwrap();
    let root_path = dir.path().join("999.obj");
    let parent_path = dir.path().join("101.obj");

    let root_mask = mask_for_structure(&volume, &tree, 999).unwrap();
    let parent_mask = mask_for_structure(&volume, &tree, 101).unwrap();
    assert_eq!(root_mask, parent_mask);

    let params = ExtractionParams::region();
    extract_mesh_from_mask(&root_mask, Some(&root_path), &params).unwrap();
    extract_mesh_from_mask(&parent_mask, Some(&parent_path), &params).unwrap();
    assert_eq!(
        read_obj_file(&root_path).unwrap(),
        read_obj_file(&parent_path).unwrap()
    );

    let root = extract_mesh_from_mask(&root_mask, None, &ExtractionParams::root()).unwrap();
    assert!(root.is_watertight());
}

#[test]
fn region_without_voxels_is_empty_mask() {
    let (tree, volume) = (tree(), volume());
    let mask = mask_for_structure(&volume, &tree, 7).unwrap();
    assert!(matches!(
        extract_mesh_from_mask(&mask, None, &ExtractionParams::region()),
        Err(MeshError::EmptyMask)
    ));
}
