//! # Region Masks
//!
//! Binary masks aggregated over a structure's subtree.
//!
//! A mask is `true` wherever the annotation label belongs to the selected
//! id set. Composite regions usually carry no voxels of their own, so their
//! masks are the union of their descendants' labels.
//!
//! ## Root Special Case
//!
//! The root's subtree is every structure in the atlas, so its mask is built
//! as "every non-background voxel" ([`LabelSelection::AllForeground`])
//! instead of a set lookup per voxel. For any volume whose labels all belong
//! to the tree the two give identical masks.

use crate::error::{VolumeError, VolumeResult};
use crate::volume::AnnotationVolume;
use atlas_structures::{StructureResult, StructureTree};
use config::constants::BACKGROUND_LABEL;
use ndarray::parallel::prelude::*;
use ndarray::{Array3, Zip};
use std::collections::HashSet;

/// Which labels a mask selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSelection {
    /// Every non-background voxel (the root branch)
    AllForeground,
    /// Voxels whose label is in the set
    Labels(HashSet<u32>),
    /// Voxels whose label is strictly greater than the value
    GreaterThan(u32),
}

impl LabelSelection {
    /// Returns true if a voxel label is selected.
    #[inline]
    pub fn matches(&self, label: u32) -> bool {
        match self {
            LabelSelection::AllForeground => label != BACKGROUND_LABEL,
            LabelSelection::Labels(ids) => ids.contains(&label),
            LabelSelection::GreaterThan(value) => label > *value,
        }
    }

    /// Returns true if at least one of the given present labels is selected.
    ///
    /// Used to skip mask building when a subtree has no voxels at all.
    pub fn intersects<'a>(&self, present: impl IntoIterator<Item = &'a u32>) -> bool {
        present.into_iter().any(|&label| self.matches(label))
    }
}

/// A same-shape boolean companion to an annotation volume.
///
/// # Example
///
/// ```rust
/// use atlas_volume::{mask_for_label, AnnotationVolume};
///
/// let volume = AnnotationVolume::from_shape_vec([1, 1, 3], vec![0, 4, 4]).unwrap();
/// let mask = mask_for_label(&volume, 4);
/// assert_eq!(mask.count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMask {
    data: Array3<bool>,
}

impl RegionMask {
    /// Wraps a boolean array.
    pub fn new(data: Array3<bool>) -> Self {
        Self { data }
    }

    /// Creates an all-false mask.
    pub fn empty(shape: [usize; 3]) -> Self {
        Self {
            data: Array3::from_elem((shape[0], shape[1], shape[2]), false),
        }
    }

    /// Returns the mask shape.
    pub fn shape(&self) -> [usize; 3] {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }

    /// Returns the underlying boolean array.
    #[inline]
    pub fn data(&self) -> &Array3<bool> {
        &self.data
    }

    /// Consumes the mask and returns its array.
    pub fn into_inner(self) -> Array3<bool> {
        self.data
    }

    /// Returns the value at a voxel, `false` when out of bounds.
    pub fn get(&self, index: [usize; 3]) -> bool {
        self.data
            .get((index[0], index[1], index[2]))
            .copied()
            .unwrap_or(false)
    }

    /// Counts foreground voxels.
    pub fn count(&self) -> usize {
        self.data.par_iter().filter(|&&v| v).count()
    }

    /// Returns true if no voxel is set.
    pub fn is_empty(&self) -> bool {
        !self.data.par_iter().any(|&v| v)
    }

    /// Returns the voxel-wise union of two masks.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ShapeMismatch`] if the shapes differ.
    pub fn union(&self, other: &RegionMask) -> VolumeResult<RegionMask> {
        if self.shape() != other.shape() {
            return Err(VolumeError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        let data = Zip::from(&self.data)
            .and(&other.data)
            .par_map_collect(|&a, &b| a || b);
        Ok(RegionMask { data })
    }
}

/// Builds the mask of all voxels matching a selection.
pub fn build_mask(volume: &AnnotationVolume, selection: &LabelSelection) -> RegionMask {
    let data = Zip::from(volume.data()).par_map_collect(|&label| selection.matches(label));
    RegionMask { data }
}

/// Returns the label selection for a structure's subtree.
///
/// The root maps to [`LabelSelection::AllForeground`]; every other node maps
/// to the literal set of its own id and its descendants.
pub fn selection_for_structure(tree: &StructureTree, id: u32) -> StructureResult<LabelSelection> {
    if tree.is_root(id) {
        // Root subtree = whole atlas; skip the per-voxel set lookup
        tree.record(id)?;
        return Ok(LabelSelection::AllForeground);
    }
    Ok(LabelSelection::Labels(tree.subtree(id)?.into_iter().collect()))
}

/// Builds the mask of a structure and all of its descendants.
///
/// # Errors
///
/// Returns a [`atlas_structures::StructureError`] if the id is unknown.
pub fn mask_for_structure(
    volume: &AnnotationVolume,
    tree: &StructureTree,
    id: u32,
) -> StructureResult<RegionMask> {
    let selection = selection_for_structure(tree, id)?;
    Ok(build_mask(volume, &selection))
}

/// Builds the mask of a single label.
pub fn mask_for_label(volume: &AnnotationVolume, label: u32) -> RegionMask {
    build_mask(volume, &LabelSelection::Labels(HashSet::from([label])))
}

/// Builds the mask of every voxel whose label exceeds `value`.
pub fn mask_greater_than(volume: &AnnotationVolume, value: u32) -> RegionMask {
    build_mask(volume, &LabelSelection::GreaterThan(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_structures::StructureRecord;

    /// `root(999) → parent(101) → {child(1), child(5)}`
    fn tree() -> StructureTree {
        StructureTree::from_records(&[
            StructureRecord::new(999, "root", "root", [255, 255, 255], vec![999]),
            StructureRecord::new(101, "P", "parent", [1, 1, 1], vec![999, 101]),
            StructureRecord::new(1, "A", "child a", [1, 1, 1], vec![999, 101, 1]),
            StructureRecord::new(5, "B", "child b", [1, 1, 1], vec![999, 101, 5]),
        ])
        .unwrap()
    }

    fn volume() -> AnnotationVolume {
        let mut data = Array3::<u32>::zeros((6, 6, 6));
        data[[1, 1, 1]] = 1;
        data[[1, 2, 1]] = 1;
        data[[4, 4, 4]] = 5;
        data[[4, 4, 3]] = 5;
        AnnotationVolume::new(data)
    }

    #[test]
    fn test_parent_mask_is_union_of_children() {
        let (tree, volume) = (tree(), volume());
        let parent = mask_for_structure(&volume, &tree, 101).unwrap();
        let children = mask_for_label(&volume, 1)
            .union(&mask_for_label(&volume, 5))
            .unwrap();
        assert_eq!(parent, children);
        assert_eq!(parent.count(), 4);
    }

    #[test]
    fn test_root_mask_matches_literal_membership() {
        let (tree, volume) = (tree(), volume());
        let special = mask_for_structure(&volume, &tree, 999).unwrap();
        let literal = build_mask(
            &volume,
            &LabelSelection::Labels(tree.subtree(999).unwrap().into_iter().collect()),
        );
        assert_eq!(special, literal);
        assert_eq!(special, mask_for_structure(&volume, &tree, 101).unwrap());
    }

    #[test]
    fn test_root_selection_is_all_foreground() {
        assert_eq!(
            selection_for_structure(&tree(), 999).unwrap(),
            LabelSelection::AllForeground
        );
        assert!(matches!(
            selection_for_structure(&tree(), 1).unwrap(),
            LabelSelection::Labels(_)
        ));
    }

    #[test]
    fn test_absent_labels_give_empty_mask() {
        let tree = tree();
        let volume = AnnotationVolume::new(Array3::zeros((3, 3, 3)));
        let mask = mask_for_structure(&volume, &tree, 101).unwrap();
        assert!(mask.is_empty());
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_unknown_structure() {
        assert!(mask_for_structure(&volume(), &tree(), 4242).is_err());
    }

    #[test]
    fn test_greater_than() {
        let mask = mask_greater_than(&volume(), 1);
        assert_eq!(mask.count(), 2);
        assert!(mask.get([4, 4, 4]));
        assert!(!mask.get([1, 1, 1]));
    }

    #[test]
    fn test_union_shape_mismatch() {
        let a = RegionMask::empty([2, 2, 2]);
        let b = RegionMask::empty([2, 2, 3]);
        assert!(matches!(a.union(&b), Err(VolumeError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_selection_intersects() {
        let selection = LabelSelection::Labels(HashSet::from([1, 5]));
        assert!(selection.intersects(&[5, 9]));
        assert!(!selection.intersects(&[9]));
        assert!(!LabelSelection::AllForeground.intersects(&[]));
    }
}
