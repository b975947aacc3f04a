//! # Region Tasks
//!
//! One immutable descriptor per scheduled structure and the single worker
//! function both runners call. A task reads the shared volume and tree and
//! writes only `<meshes_dir>/<id>.obj`, so tasks never conflict.

use crate::config::MeshGenConfig;
use crate::extractor::MeshExtractor;
use crate::presence::VoxelPresence;
use crate::state::{NodeState, SkipReason};
use atlas_mesh::{ExtractionParams, MeshError};
use atlas_structures::{StructureRecord, StructureTree};
use atlas_volume::{mask_for_structure, AnnotationVolume};
use config::constants::mesh_file_name;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

// =============================================================================
// Descriptor
// =============================================================================

/// Everything a worker needs to mesh one structure.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTask {
    pub structure_id: u32,
    pub acronym: String,
    pub is_root: bool,
    pub obj_path: PathBuf,
    pub params: ExtractionParams,
    pub skip_existing: bool,
}

impl RegionTask {
    /// Builds the task for `record` under `config`.
    pub fn new(record: &StructureRecord, is_root: bool, config: &MeshGenConfig) -> Self {
        Self {
            structure_id: record.id,
            acronym: record.acronym.clone(),
            is_root,
            obj_path: config.meshes_dir.join(mesh_file_name(record.id)),
            params: config.params_for(is_root).clone(),
            skip_existing: config.skip_existing,
        }
    }

    /// `acronym (id)`, as used in log messages.
    pub fn tag(&self) -> String {
        format!("{} ({})", self.acronym, self.structure_id)
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// What a task did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// A new mesh file was written
    Written { path: PathBuf },
    /// An existing mesh file was kept without re-extraction
    Reused { path: PathBuf },
    /// The structure has nothing to mesh
    Skipped { reason: SkipReason },
    /// The task errored or panicked
    Failed { message: String },
}

/// Result of one task, carried back from the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    pub structure_id: u32,
    pub acronym: String,
    pub outcome: TaskOutcome,
    /// State reached by the end of the task
    pub state: NodeState,
}

impl TaskReport {
    fn new(task: &RegionTask, state: NodeState, outcome: TaskOutcome) -> Self {
        Self {
            structure_id: task.structure_id,
            acronym: task.acronym.clone(),
            outcome,
            state,
        }
    }

    fn skipped(task: &RegionTask, reason: SkipReason) -> Self {
        Self::new(
            task,
            NodeState::Skipped(reason.clone()),
            TaskOutcome::Skipped { reason },
        )
    }

    /// Report for a task that never returned normally.
    pub fn failed(task: &RegionTask, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            task,
            NodeState::Skipped(SkipReason::Failed {
                message: message.clone(),
            }),
            TaskOutcome::Failed { message },
        )
    }

    /// Returns true if a mesh file was written or reused.
    pub fn produced_file(&self) -> bool {
        matches!(
            self.outcome,
            TaskOutcome::Written { .. } | TaskOutcome::Reused { .. }
        )
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Read-only inputs shared by every task of a run.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub volume: &'a AnnotationVolume,
    pub tree: &'a StructureTree,
    pub presence: &'a VoxelPresence,
    pub extractor: &'a dyn MeshExtractor,
}

/// Meshes one structure.
///
/// Never returns an error: every per-region problem becomes a
/// [`TaskOutcome`]. Panics are caught one level up by the runner.
pub fn run_region_task(task: &RegionTask, ctx: &TaskContext<'_>) -> TaskReport {
    let id = task.structure_id;

    if task.skip_existing && task.obj_path.is_file() {
        debug!(structure_id = id, acronym = %task.acronym, "mesh file exists, reusing it");
        return TaskReport::new(
            task,
            NodeState::MeshAttempted,
            TaskOutcome::Reused {
                path: task.obj_path.clone(),
            },
        );
    }

    if !ctx.presence.subtree_has_voxels(id) {
        warn!(structure_id = id, acronym = %task.acronym, "no labels found for {}", task.tag());
        return TaskReport::skipped(task, SkipReason::NoLabels);
    }

    let mask = match mask_for_structure(ctx.volume, ctx.tree, id) {
        Ok(mask) => mask,
        Err(e) => {
            warn!(structure_id = id, acronym = %task.acronym, error = %e, "mask building failed for {}", task.tag());
            return TaskReport::failed(task, e.to_string());
        }
    };
    let mut state = NodeState::MaskBuilt;

    if mask.is_empty() {
        warn!(structure_id = id, acronym = %task.acronym, "empty mask for {}", task.tag());
        return TaskReport::skipped(task, SkipReason::EmptyMask);
    }

    debug!(structure_id = id, acronym = %task.acronym, voxels = mask.count(), "extracting mesh");
    let result = ctx.extractor.extract(&mask, &task.obj_path, &task.params);
    if let Ok(next) = state.clone().advance(NodeState::MeshAttempted) {
        state = next;
    }

    match result {
        Ok(()) => TaskReport::new(
            task,
            state,
            TaskOutcome::Written {
                path: task.obj_path.clone(),
            },
        ),
        Err(MeshError::EmptyMask) => {
            warn!(structure_id = id, acronym = %task.acronym, "empty mask for {}", task.tag());
            TaskReport::skipped(task, SkipReason::EmptyMask)
        }
        Err(MeshError::DegenerateMesh { message }) => {
            warn!(structure_id = id, acronym = %task.acronym, %message, "degenerate mesh for {}", task.tag());
            TaskReport::skipped(task, SkipReason::Degenerate { message })
        }
        Err(e) => {
            warn!(structure_id = id, acronym = %task.acronym, error = %e, "mesh extraction failed for {}", task.tag());
            TaskReport::failed(task, e.to_string())
        }
    }
}
