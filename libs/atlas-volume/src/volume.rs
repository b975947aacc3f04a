//! # Annotation Volume
//!
//! Immutable 3D array of region labels. Label `0` is background; every
//! other value is the id of a (usually terminal) structure.

use crate::error::{VolumeError, VolumeResult};
use config::constants::BACKGROUND_LABEL;
use ndarray::parallel::prelude::*;
use ndarray::Array3;
use std::collections::{BTreeSet, HashSet};

/// A voxel-labeled annotation volume.
///
/// # Example
///
/// ```rust
/// use atlas_volume::AnnotationVolume;
///
/// let volume = AnnotationVolume::from_shape_vec([2, 2, 1], vec![0, 1, 5, 5]).unwrap();
/// assert_eq!(volume.labels().into_iter().collect::<Vec<_>>(), vec![1, 5]);
/// assert_eq!(volume.voxel_count(5), 2);
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationVolume {
    data: Array3<u32>,
}

impl AnnotationVolume {
    /// Wraps an existing label array.
    pub fn new(data: Array3<u32>) -> Self {
        Self { data }
    }

    /// Builds a volume from a C-order voxel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Shape`] if the buffer length is not the
    /// product of the shape.
    pub fn from_shape_vec(shape: [usize; 3], voxels: Vec<u32>) -> VolumeResult<Self> {
        let len = voxels.len();
        let data = Array3::from_shape_vec((shape[0], shape[1], shape[2]), voxels)
            .map_err(|_| VolumeError::Shape { shape, len })?;
        Ok(Self { data })
    }

    /// Returns the volume shape.
    pub fn shape(&self) -> [usize; 3] {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }

    /// Returns the number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the volume has no voxels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying label array.
    #[inline]
    pub fn data(&self) -> &Array3<u32> {
        &self.data
    }

    /// Returns the label at a voxel, `None` when out of bounds.
    pub fn get(&self, index: [usize; 3]) -> Option<u32> {
        self.data.get((index[0], index[1], index[2])).copied()
    }

    /// Returns the unique non-background labels present, sorted.
    pub fn labels(&self) -> BTreeSet<u32> {
        self.data
            .par_iter()
            .fold(HashSet::new, |mut seen, &label| {
                if label != BACKGROUND_LABEL {
                    seen.insert(label);
                }
                seen
            })
            .reduce(HashSet::new, |mut a, b| {
                a.extend(b);
                a
            })
            .into_iter()
            .collect()
    }

    /// Returns true if any voxel carries the label.
    pub fn contains_label(&self, label: u32) -> bool {
        self.data.par_iter().any(|&v| v == label)
    }

    /// Counts voxels carrying the label.
    pub fn voxel_count(&self, label: u32) -> usize {
        self.data.par_iter().filter(|&&v| v == label).count()
    }

    /// Counts non-background voxels.
    pub fn foreground_count(&self) -> usize {
        self.data.par_iter().filter(|&&v| v != BACKGROUND_LABEL).count()
    }
}

impl From<Array3<u32>> for AnnotationVolume {
    fn from(data: Array3<u32>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnnotationVolume {
        let mut data = Array3::<u32>::zeros((4, 4, 4));
        data[[1, 1, 1]] = 1;
        data[[1, 2, 1]] = 1;
        data[[2, 2, 2]] = 5;
        AnnotationVolume::new(data)
    }

    #[test]
    fn test_shape_and_len() {
        let volume = sample();
        assert_eq!(volume.shape(), [4, 4, 4]);
        assert_eq!(volume.len(), 64);
        assert!(!volume.is_empty());
    }

    #[test]
    fn test_from_shape_vec_rejects_bad_length() {
        let err = AnnotationVolume::from_shape_vec([2, 2, 2], vec![0; 7]).unwrap_err();
        assert!(matches!(err, VolumeError::Shape { len: 7, .. }));
    }

    #[test]
    fn test_from_shape_vec_is_c_order() {
        let volume = AnnotationVolume::from_shape_vec([1, 2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(volume.get([0, 1, 0]), Some(3));
        assert_eq!(volume.get([0, 0, 2]), Some(2));
        assert_eq!(volume.get([1, 0, 0]), None);
    }

    #[test]
    fn test_labels_exclude_background() {
        let labels: Vec<u32> = sample().labels().into_iter().collect();
        assert_eq!(labels, vec![1, 5]);
    }

    #[test]
    fn test_labels_of_empty_volume() {
        let volume = AnnotationVolume::new(Array3::zeros((3, 3, 3)));
        assert!(volume.labels().is_empty());
        assert_eq!(volume.foreground_count(), 0);
    }

    #[test]
    fn test_counts() {
        let volume = sample();
        assert!(volume.contains_label(5));
        assert!(!volume.contains_label(7));
        assert_eq!(volume.voxel_count(1), 2);
        assert_eq!(volume.foreground_count(), 3);
    }
}
