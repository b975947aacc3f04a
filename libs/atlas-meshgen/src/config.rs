//! # Run Configuration
//!
//! Everything that varies between mesh generation runs, loadable from TOML.
//!
//! ```toml
//! meshes_dir = "atlas/meshes"
//! skip_existing = true
//! prune_empty_subtrees = false
//! min_mesh_file_bytes = 512
//!
//! [execution]
//! mode = "parallel"
//! threads = 6
//!
//! [root]
//! closing_iterations = 1
//! smooth = true
//!
//! [region]
//! closing_iterations = 2
//! decimate_fraction = 0.3
//! ```
//!
//! Missing keys fall back to the defaults in `config::constants`.

use crate::error::{MeshGenError, MeshGenResult};
use atlas_mesh::ExtractionParams;
use config::constants::{default_worker_threads, MESHES_DIRNAME, MIN_MESH_FILE_BYTES};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How region tasks are scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Execution {
    /// One task at a time on a single worker thread, with progress reports
    Sequential,
    /// Fixed-size worker pool; `None` leaves two cores free
    Parallel { threads: Option<usize> },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::Parallel { threads: None }
    }
}

impl Execution {
    /// Resolves the worker count for a parallel run.
    pub fn worker_threads(&self) -> usize {
        match self {
            Execution::Sequential => 1,
            Execution::Parallel { threads: Some(n) } => *n,
            Execution::Parallel { threads: None } => {
                let available = std::thread::available_parallelism().map_or(1, |n| n.get());
                default_worker_threads(available)
            }
        }
    }
}

/// Configuration of one mesh generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshGenConfig {
    /// Directory that receives `<id>.obj`; must exist before the run
    pub meshes_dir: PathBuf,
    /// Leave existing mesh files untouched and do not re-extract them
    pub skip_existing: bool,
    /// Do not schedule nodes whose whole subtree has no voxels
    pub prune_empty_subtrees: bool,
    /// Mesh files below this size are left out of the registry
    pub min_mesh_file_bytes: u64,
    /// Task scheduling
    pub execution: Execution,
    /// Extraction parameters for the root structure
    #[serde(deserialize_with = "root_params")]
    pub root: ExtractionParams,
    /// Extraction parameters for every other structure
    pub region: ExtractionParams,
}

impl Default for MeshGenConfig {
    fn default() -> Self {
        Self {
            meshes_dir: PathBuf::from(MESHES_DIRNAME),
            skip_existing: true,
            prune_empty_subtrees: false,
            min_mesh_file_bytes: MIN_MESH_FILE_BYTES,
            execution: Execution::default(),
            root: ExtractionParams::root(),
            region: ExtractionParams::region(),
        }
    }
}

impl MeshGenConfig {
    /// Creates a default configuration writing into `meshes_dir`.
    pub fn new(meshes_dir: impl Into<PathBuf>) -> Self {
        Self {
            meshes_dir: meshes_dir.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MeshGenError::Config`] on syntax errors or invalid values.
    pub fn from_toml_str(text: &str) -> MeshGenResult<Self> {
        let config: MeshGenConfig =
            toml::from_str(text).map_err(|e| MeshGenError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// A relative `meshes_dir` is resolved against the file's directory.
    pub fn load(path: &Path) -> MeshGenResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| MeshGenError::io(path, e))?;
        let mut config = Self::from_toml_str(&text)?;
        if config.meshes_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.meshes_dir = base.join(&config.meshes_dir);
            }
        }
        Ok(config)
    }

    /// Checks extraction parameters and the worker count.
    pub fn validate(&self) -> MeshGenResult<()> {
        self.root
            .validate()
            .map_err(|e| MeshGenError::config(format!("root: {e}")))?;
        self.region
            .validate()
            .map_err(|e| MeshGenError::config(format!("region: {e}")))?;
        if self.execution == (Execution::Parallel { threads: Some(0) }) {
            return Err(MeshGenError::config("threads must be at least 1"));
        }
        Ok(())
    }

    /// Returns the parameters for a node.
    pub fn params_for(&self, is_root: bool) -> &ExtractionParams {
        if is_root {
            &self.root
        } else {
            &self.region
        }
    }
}

/// Overlays a partial `[root]` table on [`ExtractionParams::root`].
fn root_params<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExtractionParams, D::Error> {
    let overrides = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut merged = serde_json::to_value(ExtractionParams::root()).map_err(D::Error::custom)?;
    if let Some(fields) = merged.as_object_mut() {
        fields.extend(overrides);
    }
    serde_json::from_value(merged).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = MeshGenConfig::from_toml_str("").unwrap();
        assert_eq!(config, MeshGenConfig::default());
        assert!(config.skip_existing);
    }

    #[test]
    fn test_full_toml() {
        let config = MeshGenConfig::from_toml_str(
            r#"
            meshes_dir = "out/meshes"
            skip_existing = false
            prune_empty_subtrees = true
            min_mesh_file_bytes = 64

            [execution]
            mode = "parallel"
            threads = 3

            [root]
            smooth = true

            [region]
            decimate_fraction = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.meshes_dir, PathBuf::from("out/meshes"));
        assert!(!config.skip_existing);
        assert!(config.prune_empty_subtrees);
        assert_eq!(config.min_mesh_file_bytes, 64);
        assert_eq!(config.execution.worker_threads(), 3);
        assert!(config.params_for(true).smooth);
        assert_eq!(config.params_for(false).decimate_fraction, 0.25);
        // Unset root keys keep root defaults, not region ones
        assert_eq!(config.root.closing_iterations, ExtractionParams::root().closing_iterations);
    }

    #[test]
    fn test_sequential_mode() {
        let config = MeshGenConfig::from_toml_str("[execution]\nmode = \"sequential\"\n").unwrap();
        assert_eq!(config.execution, Execution::Sequential);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            MeshGenConfig::from_toml_str("[region]\ndecimate_fraction = 2.0\n"),
            Err(MeshGenError::Config { .. })
        ));
        assert!(matches!(
            MeshGenConfig::from_toml_str("[execution]\nmode = \"parallel\"\nthreads = 0\n"),
            Err(MeshGenError::Config { .. })
        ));
        assert!(matches!(
            MeshGenConfig::from_toml_str("skip_existing = \"yes\""),
            Err(MeshGenError::Config { .. })
        ));
    }

    #[test]
    fn test_load_resolves_relative_meshes_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "meshes_dir = \"meshes\"\n").unwrap();
        let config = MeshGenConfig::load(&path).unwrap();
        assert_eq!(config.meshes_dir, dir.path().join("meshes"));
    }

    #[test]
    fn test_default_workers_leave_cores_free() {
        assert!(Execution::default().worker_threads() >= 1);
        assert_eq!(Execution::Sequential.worker_threads(), 1);
    }
}
