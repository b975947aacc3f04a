//! # Extraction Parameters
//!
//! Per-call numeric configuration for [`super::extract_mesh_from_mask`].

use crate::error::{MeshError, MeshResult};
use config::constants::{
    DEFAULT_DECIMATE_FRACTION, DEFAULT_REGION_CLOSING_ITERATIONS, DEFAULT_ROOT_CLOSING_ITERATIONS,
    DEFAULT_SMOOTHING_ITERATIONS, ISOSURFACE_THRESHOLD,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Numeric knobs of the mask → mesh pipeline.
///
/// Root and non-root regions conventionally use different values; see
/// [`ExtractionParams::root`] and [`ExtractionParams::region`].
///
/// # Example
///
/// ```rust
/// use atlas_mesh::ExtractionParams;
///
/// let params = ExtractionParams {
///     decimate_fraction: 0.2,
///     smooth: true,
///     ..ExtractionParams::region()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionParams {
    /// Isosurface level between background (0) and foreground (1)
    pub threshold: f64,
    /// Hole filling + closing iterations; `None` or `0` skips the step
    pub closing_iterations: Option<u32>,
    /// Keep only the largest connected surface
    pub extract_largest: bool,
    /// Fraction of vertices kept by decimation, in (0, 1]
    pub decimate_fraction: f64,
    /// Apply Taubin smoothing after decimation
    pub smooth: bool,
    /// Smoothing pass pairs when `smooth` is set
    pub smoothing_iterations: u32,
    /// Microns per voxel along each axis; `None` keeps voxel units
    pub resolution: Option<[f64; 3]>,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self::region()
    }
}

impl ExtractionParams {
    /// Defaults for ordinary regions.
    pub fn region() -> Self {
        Self {
            threshold: ISOSURFACE_THRESHOLD,
            closing_iterations: Some(DEFAULT_REGION_CLOSING_ITERATIONS),
            extract_largest: false,
            decimate_fraction: DEFAULT_DECIMATE_FRACTION,
            smooth: false,
            smoothing_iterations: DEFAULT_SMOOTHING_ITERATIONS,
            resolution: None,
        }
    }

    /// Defaults for the root region.
    pub fn root() -> Self {
        Self {
            closing_iterations: Some(DEFAULT_ROOT_CLOSING_ITERATIONS),
            ..Self::region()
        }
    }

    /// Returns the resolution as a scale vector, if set.
    pub fn scale(&self) -> Option<DVec3> {
        self.resolution.map(DVec3::from_array)
    }

    /// Checks every parameter range.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> MeshResult<()> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(MeshError::invalid_parameter(format!(
                "threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        if !(self.decimate_fraction > 0.0 && self.decimate_fraction <= 1.0) {
            return Err(MeshError::invalid_parameter(format!(
                "decimate_fraction must be in (0, 1], got {}",
                self.decimate_fraction
            )));
        }
        if self.smooth && self.smoothing_iterations == 0 {
            return Err(MeshError::invalid_parameter(
                "smoothing_iterations must be positive when smoothing is enabled",
            ));
        }
        if let Some(resolution) = self.resolution {
            if resolution.iter().any(|r| !r.is_finite() || *r <= 0.0) {
                return Err(MeshError::invalid_parameter(format!(
                    "resolution must be positive, got {resolution:?}"
                )));
            }
        }
        Ok(())
    }
}
