//! Structure lists read from and written to disk.

use atlas_structures::{read_structures_json, write_structures_json, StructureError, StructureTree};
use std::fs;

const STRUCTURES: &str = r#"[
    {"id": 997, "acronym": "root", "name": "root", "rgb_triplet": [255, 255, 255], "structure_id_path": [997], "graph_order": 0},
    {"id": 8, "acronym": "grey", "name": "Basic cell groups and regions", "rgb_triplet": [191, 218, 227], "structure_id_path": [997, 8]},
    {"id": 567, "acronym": "CH", "name": "Cerebrum", "rgb_triplet": [176, 240, 255], "structure_id_path": [997, 8, 567]},
    {"id": 343, "acronym": "BS", "name": "Brain stem", "rgb_triplet": [255, 112, 128], "structure_id_path": [997, 8, 343]},
    {"id": 73, "acronym": "VS", "name": "ventricular systems", "rgb_triplet": [170, 170, 170], "structure_id_path": [997, 73]}
]"#;

#[test]
fn loads_hierarchy_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("structures.json");
    fs::write(&path, STRUCTURES).unwrap();

    let records = read_structures_json(&path).unwrap();
    let tree = StructureTree::from_records(&records).unwrap();

    assert_eq!(tree.root_id(), 997);
    assert_eq!(tree.children(997).unwrap(), vec![8, 73]);
    assert_eq!(tree.children(8).unwrap(), vec![343, 567]);
    assert_eq!(tree.preorder(), vec![997, 8, 343, 567, 73]);
    assert_eq!(tree.id_for_acronym("CH"), Some(567));
    assert_eq!(tree.leaves(997).unwrap(), vec![73, 343, 567]);
    assert_eq!(
        tree.to_string(),
        "root (997)\n  grey (8)\n    BS (343)\n    CH (567)\n  VS (73)\n"
    );
}

#[test]
fn written_list_reloads_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("structures.json");
    fs::write(&source, STRUCTURES).unwrap();
    let records = read_structures_json(&source).unwrap();

    let kept: Vec<_> = records.iter().filter(|r| r.id != 73).cloned().collect();
    let target = dir.path().join("structures_with_mesh.json");
    write_structures_json(&target, &kept).unwrap();

    assert_eq!(read_structures_json(&target).unwrap(), kept);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_structures_json(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(StructureError::Io { .. })));
}
