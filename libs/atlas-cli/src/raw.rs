//! Raw annotation volumes: little-endian unsigned labels in C order.

use anyhow::{bail, Context, Result};
use atlas_volume::AnnotationVolume;
use clap::ValueEnum;
use std::fs;
use std::path::Path;

/// On-disk voxel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dtype {
    U8,
    U16,
    U32,
}

impl Dtype {
    /// Bytes per voxel.
    pub fn width(self) -> usize {
        match self {
            Dtype::U8 => 1,
            Dtype::U16 => 2,
            Dtype::U32 => 4,
        }
    }

    fn decode(self, bytes: &[u8]) -> Vec<u32> {
        match self {
            Dtype::U8 => bytes.iter().map(|&b| u32::from(b)).collect(),
            Dtype::U16 => bytes
                .chunks_exact(2)
                .map(|c| u32::from(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
            Dtype::U32 => bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        }
    }
}

/// Decodes a raw buffer into a volume of `shape`.
pub fn volume_from_bytes(bytes: &[u8], shape: [usize; 3], dtype: Dtype) -> Result<AnnotationVolume> {
    let voxels = shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
    let expected = voxels.and_then(|n| n.checked_mul(dtype.width()));
    if expected != Some(bytes.len()) {
        bail!(
            "annotation has {} bytes, expected {:?} x {} for shape {:?}",
            bytes.len(),
            voxels,
            dtype.width(),
            shape
        );
    }
    Ok(AnnotationVolume::from_shape_vec(shape, dtype.decode(bytes))?)
}

/// Reads a raw annotation file.
pub fn read_raw_volume(path: &Path, shape: [usize; 3], dtype: Dtype) -> Result<AnnotationVolume> {
    let bytes = fs::read(path).with_context(|| format!("reading annotation {}", path.display()))?;
    volume_from_bytes(&bytes, shape, dtype)
        .with_context(|| format!("decoding annotation {}", path.display()))
}
