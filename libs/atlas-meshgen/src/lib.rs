//! # Atlas Meshgen
//!
//! Builds one mesh per structure of an atlas hierarchy and the registry of
//! the meshes that survived.
//!
//! ## Architecture
//!
//! ```text
//! records → StructureTree ─┐
//! volume  → VoxelPresence ─┼→ RegionTask per node → runner → TaskReport
//!                          │                                    │
//!                          └──────── registry post-pass ←───────┘
//! ```
//!
//! Configuration problems abort the run before any volume work. Problems
//! with a single region are logged, recorded in the [`MeshGenReport`] and
//! never stop the batch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_meshgen::{construct_meshes_from_annotation, MeshGenConfig};
//!
//! let config = MeshGenConfig::new("atlas/meshes");
//! let report = construct_meshes_from_annotation(&volume, &records, &config)?;
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod presence;
pub mod registry;
pub mod report;
pub mod runner;
pub mod state;
pub mod task;

pub use crate::config::{Execution, MeshGenConfig};
pub use error::{MeshGenError, MeshGenResult};
pub use extractor::{MeshExtractor, SurfaceExtractor};
pub use presence::VoxelPresence;
pub use registry::MeshRegistry;
pub use report::MeshGenReport;
pub use state::{NodeState, SkipReason};
pub use task::{RegionTask, TaskOutcome, TaskReport};

use atlas_structures::{StructureRecord, StructureTree};
use atlas_volume::AnnotationVolume;
use std::collections::BTreeMap;
use task::TaskContext;
use tracing::{debug, info};

/// Meshes every structure of `records` from `volume`.
///
/// # Arguments
///
/// * `volume` - Annotation volume, read-only for the whole run
/// * `records` - Flat structure list; validated before anything else
/// * `config` - Meshes directory, scheduling and extraction parameters
///
/// # Errors
///
/// - [`MeshGenError::Structure`] for an invalid structure list
/// - [`MeshGenError::Config`] for invalid parameters
/// - [`MeshGenError::OutputPath`] if the meshes directory does not exist
/// - [`MeshGenError::ThreadPool`] if the worker pool cannot start
pub fn construct_meshes_from_annotation(
    volume: &AnnotationVolume,
    records: &[StructureRecord],
    config: &MeshGenConfig,
) -> MeshGenResult<MeshGenReport> {
    construct_meshes_with(volume, records, config, &SurfaceExtractor)
}

/// Same as [`construct_meshes_from_annotation`] with a custom extractor.
pub fn construct_meshes_with(
    volume: &AnnotationVolume,
    records: &[StructureRecord],
    config: &MeshGenConfig,
    extractor: &dyn MeshExtractor,
) -> MeshGenResult<MeshGenReport> {
    let tree = StructureTree::from_records(records)?;
    config.validate()?;
    if !config.meshes_dir.is_dir() {
        return Err(MeshGenError::OutputPath {
            path: config.meshes_dir.clone(),
        });
    }

    let labels = volume.labels();
    let presence = VoxelPresence::compute(&tree, &labels);
    info!(
        structures = tree.size(),
        labels = labels.len(),
        labeled = presence.labeled_count(),
        "annotation scanned"
    );

    let mut states: BTreeMap<u32, NodeState> = tree
        .preorder()
        .into_iter()
        .map(|id| (id, NodeState::Pending))
        .collect();

    let mut tasks = Vec::with_capacity(tree.size());
    for record in tree.records() {
        if config.prune_empty_subtrees && !presence.subtree_has_voxels(record.id) {
            debug!(structure_id = record.id, acronym = %record.acronym, "pruned, no voxels in subtree");
            states.insert(record.id, NodeState::Skipped(SkipReason::NoLabels));
            continue;
        }
        tasks.push(RegionTask::new(record, tree.is_root(record.id), config));
    }

    let ctx = TaskContext {
        volume,
        tree: &tree,
        presence: &presence,
        extractor,
    };
    let reports = runner::run_tasks(&tasks, &ctx, &config.execution)?;

    for report in &reports {
        if let Some(state) = states.get_mut(&report.structure_id) {
            if let Ok(next) = state.clone().advance(report.state.clone()) {
                *state = next;
            }
        }
    }

    let registry = MeshRegistry::build(records, &config.meshes_dir, config.min_mesh_file_bytes, &mut states);
    let report = MeshGenReport::new(records, reports, states, registry);
    info!(
        kept = report.kept(),
        total = report.total(),
        written = report.written(),
        reused = report.reused(),
        failed = report.failed(),
        "{}",
        report.summary()
    );
    Ok(report)
}
