//! # Run Report
//!
//! Everything a run produced: per-task reports, final node states, the
//! registry and the structure list filtered to structures with a mesh.

use crate::error::MeshGenResult;
use crate::registry::MeshRegistry;
use crate::state::{NodeState, SkipReason};
use crate::task::{TaskOutcome, TaskReport};
use atlas_structures::{write_structures_json, StructureRecord};
use config::constants::{MESH_REGISTRY_FILENAME, STRUCTURES_FILENAME};
use std::collections::BTreeMap;
use std::path::Path;

/// Outcome of a mesh generation run.
#[derive(Debug, Clone)]
pub struct MeshGenReport {
    /// One report per scheduled task, in schedule order
    pub tasks: Vec<TaskReport>,
    /// Final state of every structure
    pub states: BTreeMap<u32, NodeState>,
    pub registry: MeshRegistry,
    /// Input records with a registered mesh, in input order
    pub structures_with_mesh: Vec<StructureRecord>,
}

impl MeshGenReport {
    pub fn new(
        records: &[StructureRecord],
        tasks: Vec<TaskReport>,
        states: BTreeMap<u32, NodeState>,
        registry: MeshRegistry,
    ) -> Self {
        let structures_with_mesh = records
            .iter()
            .filter(|r| registry.contains(r.id))
            .cloned()
            .collect();
        Self {
            tasks,
            states,
            registry,
            structures_with_mesh,
        }
    }

    /// Number of structures in the input list.
    pub fn total(&self) -> usize {
        self.states.len()
    }

    /// Number of structures with a registered mesh.
    pub fn kept(&self) -> usize {
        self.registry.len()
    }

    /// Tasks that wrote a new mesh file.
    pub fn written(&self) -> usize {
        self.count_outcomes(|o| matches!(o, TaskOutcome::Written { .. }))
    }

    /// Tasks that kept an existing mesh file.
    pub fn reused(&self) -> usize {
        self.count_outcomes(|o| matches!(o, TaskOutcome::Reused { .. }))
    }

    /// Tasks that errored or panicked.
    pub fn failed(&self) -> usize {
        self.count_outcomes(|o| matches!(o, TaskOutcome::Failed { .. }))
    }

    fn count_outcomes(&self, pred: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.tasks.iter().filter(|t| pred(&t.outcome)).count()
    }

    /// Every structure without a mesh and the reason, ordered by id.
    pub fn skipped(&self) -> Vec<(u32, &SkipReason)> {
        self.states
            .iter()
            .filter_map(|(&id, state)| state.skip_reason().map(|r| (id, r)))
            .collect()
    }

    /// `N of M structures kept with mesh`
    pub fn summary(&self) -> String {
        format!(
            "{} of {} structures kept with mesh",
            self.kept(),
            self.total()
        )
    }

    /// Writes `mesh_registry.json` and `structures_with_mesh.json` into `dir`.
    pub fn write_outputs(&self, dir: &Path) -> MeshGenResult<()> {
        self.registry.write_json(&dir.join(MESH_REGISTRY_FILENAME))?;
        write_structures_json(&dir.join(STRUCTURES_FILENAME), &self.structures_with_mesh)?;
        Ok(())
    }
}
