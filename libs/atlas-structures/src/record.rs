//! # Structure Records
//!
//! One record per anatomical region, in the JSON layout used by atlas
//! packages. Extra keys in the source JSON are ignored.

use crate::error::{StructureError, StructureResult};
use config::constants::BACKGROUND_LABEL;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A named region of the atlas hierarchy.
///
/// `structure_id_path` lists ancestors root-first and ends with `id` itself.
///
/// # Example
///
/// ```rust
/// use atlas_structures::StructureRecord;
///
/// let record = StructureRecord::new(567, "CH", "Cerebrum", [176, 240, 255], vec![997, 8, 567]);
/// assert_eq!(record.parent_id(), Some(8));
/// assert_eq!(record.tag(), "CH (567)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    /// Unique positive identifier, also the label value in the volume
    pub id: u32,
    /// Unique short name
    pub acronym: String,
    /// Full region name
    pub name: String,
    /// Display color
    pub rgb_triplet: [u8; 3],
    /// Ancestor chain, root first, ending with `id`
    pub structure_id_path: Vec<u32>,
}

impl StructureRecord {
    /// Creates a record.
    pub fn new(
        id: u32,
        acronym: impl Into<String>,
        name: impl Into<String>,
        rgb_triplet: [u8; 3],
        structure_id_path: Vec<u32>,
    ) -> Self {
        Self {
            id,
            acronym: acronym.into(),
            name: name.into(),
            rgb_triplet,
            structure_id_path,
        }
    }

    /// Returns the parent id, or `None` for a root record.
    pub fn parent_id(&self) -> Option<u32> {
        let path = &self.structure_id_path;
        if path.len() < 2 {
            return None;
        }
        Some(path[path.len() - 2])
    }

    /// Returns true if the path has exactly one element.
    #[inline]
    pub fn is_root_path(&self) -> bool {
        self.structure_id_path.len() == 1
    }

    /// Human-readable label used in logs: `acronym (id)`.
    pub fn tag(&self) -> String {
        format!("{} ({})", self.acronym, self.id)
    }
}

/// Checks the per-record invariants of a structure list.
///
/// Verifies that no id is the background label, that every path is
/// non-empty and ends with the record's own id, and that ids and acronyms
/// are unique. Parent and root checks happen
/// during tree construction.
///
/// # Errors
///
/// Returns the first violated invariant, in list order.
pub fn check_consistency(records: &[StructureRecord]) -> StructureResult<()> {
    if records.is_empty() {
        return Err(StructureError::EmptyList);
    }

    let mut ids = HashSet::with_capacity(records.len());
    let mut acronyms = HashSet::with_capacity(records.len());

    for record in records {
        if record.id == BACKGROUND_LABEL {
            return Err(StructureError::ReservedId { id: record.id });
        }
        let last = match record.structure_id_path.last() {
            Some(&last) => last,
            None => return Err(StructureError::EmptyPath { id: record.id }),
        };
        if last != record.id {
            return Err(StructureError::PathMismatch {
                id: record.id,
                last,
            });
        }
        if !ids.insert(record.id) {
            return Err(StructureError::DuplicateId { id: record.id });
        }
        if !acronyms.insert(record.acronym.as_str()) {
            return Err(StructureError::DuplicateAcronym {
                acronym: record.acronym.clone(),
            });
        }
    }

    Ok(())
}

/// Parses a structure list from a JSON string.
///
/// # Example
///
/// ```rust
/// use atlas_structures::structures_from_json_str;
///
/// let json = r#"[{"id": 997, "acronym": "root", "name": "root",
///                 "rgb_triplet": [255, 255, 255], "structure_id_path": [997]}]"#;
/// let records = structures_from_json_str(json).unwrap();
/// assert_eq!(records[0].id, 997);
/// ```
pub fn structures_from_json_str(json: &str) -> StructureResult<Vec<StructureRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a structure list from a JSON file.
pub fn read_structures_json(path: &Path) -> StructureResult<Vec<StructureRecord>> {
    let file = File::open(path).map_err(|source| StructureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Writes a structure list as pretty-printed JSON.
pub fn write_structures_json(path: &Path, records: &[StructureRecord]) -> StructureResult<()> {
    let file = File::create(path).map_err(|source| StructureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush().map_err(|source| StructureError::Io {
        path: path.to_path_buf(),
        source,
    })
}
