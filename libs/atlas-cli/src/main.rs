//! # atlas-meshgen
//!
//! Builds one OBJ mesh per atlas structure from a structure list and a raw
//! annotation volume.
//!
//! ```text
//! atlas-meshgen --structures structures.json --annotation annotation.raw \
//!     --shape 528 320 456 --dtype u32 --output atlas/
//! ```
//!
//! Meshes land in `<output>/meshes/`; `mesh_registry.json` and
//! `structures_with_mesh.json` are written to `<output>/`.

mod raw;

use anyhow::{Context, Result};
use atlas_meshgen::{construct_meshes_from_annotation, Execution, MeshGenConfig};
use atlas_structures::read_structures_json;
use clap::Parser;
use config::constants::MESHES_DIRNAME;
use raw::{read_raw_volume, Dtype};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "atlas-meshgen", version, about)]
struct Args {
    /// Structure list JSON
    #[arg(long)]
    structures: PathBuf,

    /// Raw annotation volume, little-endian, C order
    #[arg(long)]
    annotation: PathBuf,

    /// Volume shape in voxels
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
    shape: Vec<usize>,

    /// Voxel type of the annotation file
    #[arg(long, value_enum, default_value_t = Dtype::U32)]
    dtype: Dtype,

    /// Atlas directory; meshes go to `<output>/meshes`
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads; defaults to all cores but two
    #[arg(long, conflicts_with = "sequential")]
    threads: Option<usize>,

    /// Mesh one structure at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Re-extract meshes whose files already exist
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Log filter, e.g. `debug` or `atlas_meshgen=debug`; overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());
    run(&args)
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let out_dir = output_dir(&config.meshes_dir);
    fs::create_dir_all(&config.meshes_dir)
        .with_context(|| format!("creating {}", config.meshes_dir.display()))?;

    let records = read_structures_json(&args.structures)
        .with_context(|| format!("loading structures from {}", args.structures.display()))?;
    let shape = [args.shape[0], args.shape[1], args.shape[2]];
    let volume = read_raw_volume(&args.annotation, shape, args.dtype)?;
    info!(
        structures = records.len(),
        shape = ?shape,
        meshes_dir = %config.meshes_dir.display(),
        "inputs loaded"
    );

    let report = construct_meshes_from_annotation(&volume, &records, &config)?;
    for (id, reason) in report.skipped() {
        warn!(structure_id = id, "skipped: {reason}");
    }
    report
        .write_outputs(&out_dir)
        .with_context(|| format!("writing registry to {}", out_dir.display()))?;

    println!("{}", report.summary());
    Ok(())
}

/// Merges the optional TOML file with command-line overrides.
fn build_config(args: &Args) -> Result<MeshGenConfig> {
    let mut config = match &args.config {
        Some(path) => MeshGenConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MeshGenConfig::default(),
    };
    if let Some(output) = &args.output {
        config.meshes_dir = output.join(MESHES_DIRNAME);
    }
    if args.overwrite {
        config.skip_existing = false;
    }
    if args.sequential {
        config.execution = Execution::Sequential;
    } else if let Some(threads) = args.threads {
        config.execution = Execution::Parallel {
            threads: Some(threads),
        };
    }
    config.validate()?;
    Ok(config)
}

/// Registry files sit next to the meshes directory.
fn output_dir(meshes_dir: &Path) -> PathBuf {
    match meshes_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_meshgen::MeshRegistry;
    use config::constants::{MESH_REGISTRY_FILENAME, STRUCTURES_FILENAME};

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "atlas-meshgen",
            "--structures",
            "s.json",
            "--annotation",
            "a.raw",
            "--shape",
            "4",
            "5",
            "6",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let args = parse(&[]);
        assert_eq!(args.shape, vec![4, 5, 6]);
        assert_eq!(args.dtype, Dtype::U32);
        let config = build_config(&args).unwrap();
        assert!(config.skip_existing);
        assert_eq!(config.execution, Execution::default());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&["--output", "atlas", "--threads", "3", "--overwrite", "--dtype", "u16"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.meshes_dir, PathBuf::from("atlas/meshes"));
        assert!(!config.skip_existing);
        assert_eq!(config.execution, Execution::Parallel { threads: Some(3) });
        assert_eq!(output_dir(&config.meshes_dir), PathBuf::from("atlas"));
        assert_eq!(args.dtype, Dtype::U16);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let base = ["atlas-meshgen", "--structures", "s.json", "--annotation", "a.raw"];
        assert!(Args::try_parse_from(base.iter().chain(&["--shape", "1", "2"])).is_err());
        assert!(Args::try_parse_from(base.iter().chain(&["--shape", "1", "2", "3", "--dtype", "f32"])).is_err());
        assert!(build_config(&parse(&["--threads", "0"])).is_err());
        assert!(Args::try_parse_from(base.iter().chain(&["--shape", "1", "1", "1", "--sequential", "--threads", "2"])).is_err());
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let structures = dir.path().join("structures.json");
        fs::write(
            &structures,
            r#"[
                {"id": 999, "acronym": "root", "name": "root", "rgb_triplet": [255, 255, 255], "structure_id_path": [999]},
                {"id": 1, "acronym": "A", "name": "a", "rgb_triplet": [0, 200, 0], "structure_id_path": [999, 1]},
                {"id": 2, "acronym": "B", "name": "b", "rgb_triplet": [0, 0, 200], "structure_id_path": [999, 2]}
            ]"#,
        )
        .unwrap();

        let shape = [12usize, 10, 10];
        let bytes: Vec<u8> = (0..shape.iter().product::<usize>())
            .map(|i| {
                let (x, y, z) = (i / 100, (i / 10) % 10, i % 10);
                u8::from((2..9).contains(&x) && (2..8).contains(&y) && (2..8).contains(&z))
            })
            .collect();
        let annotation = dir.path().join("annotation.raw");
        fs::write(&annotation, bytes).unwrap();

        let out = dir.path().join("atlas");
        let args = Args::try_parse_from([
            "atlas-meshgen",
            "--structures",
            structures.to_str().unwrap(),
            "--annotation",
            annotation.to_str().unwrap(),
            "--shape",
            "12",
            "10",
            "10",
            "--dtype",
            "u8",
            "--output",
            out.to_str().unwrap(),
            "--sequential",
        ])
        .unwrap();
        run(&args).unwrap();

        let registry = MeshRegistry::read_json(&out.join(MESH_REGISTRY_FILENAME)).unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 999]);
        assert!(out.join("meshes").join("1.obj").is_file());
        let kept = read_structures_json(&out.join(STRUCTURES_FILENAME)).unwrap();
        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![999, 1]);
    }
}
