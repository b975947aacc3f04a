//! # Mesh Registry
//!
//! The final `id → mesh file` map, built by a post-pass over the structure
//! list once every task has finished. Only files that exist and reach the
//! minimum size are registered.

use crate::error::{MeshGenError, MeshGenResult};
use crate::state::{NodeState, SkipReason};
use atlas_structures::StructureRecord;
use config::constants::mesh_file_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Structure id to mesh file path, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshRegistry {
    entries: BTreeMap<u32, PathBuf>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the post-pass over `records` in list order.
    ///
    /// Only nodes in [`NodeState::MeshAttempted`] are checked; they advance
    /// to `Registered`, or to `Skipped` when the file is missing or smaller
    /// than `min_bytes`.
    pub fn build(
        records: &[StructureRecord],
        meshes_dir: &Path,
        min_bytes: u64,
        states: &mut BTreeMap<u32, NodeState>,
    ) -> Self {
        let mut registry = Self::new();
        for record in records {
            let Some(state) = states.get_mut(&record.id) else {
                continue;
            };
            if *state != NodeState::MeshAttempted {
                continue;
            }

            let path = meshes_dir.join(mesh_file_name(record.id));
            let next = match fs::metadata(&path) {
                Err(_) => {
                    warn!(structure_id = record.id, acronym = %record.acronym, "no mesh file exists for {}, ignoring it", record.tag());
                    NodeState::Skipped(SkipReason::MissingFile)
                }
                Ok(meta) if meta.len() < min_bytes => {
                    warn!(
                        structure_id = record.id,
                        acronym = %record.acronym,
                        bytes = meta.len(),
                        "obj file for {} is too small, ignoring it",
                        record.tag()
                    );
                    NodeState::Skipped(SkipReason::Undersized { bytes: meta.len() })
                }
                Ok(_) => {
                    registry.insert(record.id, path);
                    NodeState::Registered
                }
            };
            if let Ok(advanced) = state.clone().advance(next) {
                *state = advanced;
            }
        }
        registry
    }

    pub fn insert(&mut self, id: u32, path: PathBuf) {
        self.entries.insert(id, path);
    }

    pub fn get(&self, id: u32) -> Option<&Path> {
        self.entries.get(&id).map(PathBuf::as_path)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Path)> + '_ {
        self.entries.iter().map(|(&id, p)| (id, p.as_path()))
    }

    /// Writes the registry as a pretty-printed JSON object keyed by id.
    pub fn write_json(&self, path: &Path) -> MeshGenResult<()> {
        let file = File::create(path).map_err(|e| MeshGenError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| MeshGenError::io(path, e))
    }

    /// Reads a registry written by [`MeshRegistry::write_json`].
    pub fn read_json(path: &Path) -> MeshGenResult<Self> {
        let file = File::open(path).map_err(|e| MeshGenError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
