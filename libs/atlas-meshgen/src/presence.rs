//! # Voxel Presence
//!
//! Per-run side table recording which structures have voxels in the
//! annotation volume. The tree itself stays immutable, so one tree can be
//! reused across volumes.

use atlas_structures::StructureTree;
use std::collections::{BTreeSet, HashMap};

/// Presence flags for every node of a tree against one volume.
#[derive(Debug, Clone, Default)]
pub struct VoxelPresence {
    /// Node carries its own label in the volume
    own: HashMap<u32, bool>,
    /// Node or any descendant carries a label in the volume
    subtree: HashMap<u32, bool>,
}

impl VoxelPresence {
    /// Annotates every tree node from the set of labels present.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let presence = VoxelPresence::compute(&tree, &volume.labels());
    /// assert!(presence.subtree_has_voxels(tree.root_id()));
    /// ```
    pub fn compute(tree: &StructureTree, labels: &BTreeSet<u32>) -> Self {
        let order = tree.preorder();
        let own: HashMap<u32, bool> = order.iter().map(|&id| (id, labels.contains(&id))).collect();

        // Reverse preorder visits children before parents
        let mut subtree = own.clone();
        for &id in order.iter().rev() {
            if !subtree[&id] {
                continue;
            }
            if let Ok(Some(parent)) = tree.parent(id) {
                subtree.insert(parent, true);
            }
        }

        Self { own, subtree }
    }

    /// Returns true if the structure's own label is present.
    pub fn has_own_voxels(&self, id: u32) -> bool {
        self.own.get(&id).copied().unwrap_or(false)
    }

    /// Returns true if the structure or any descendant is present.
    pub fn subtree_has_voxels(&self, id: u32) -> bool {
        self.subtree.get(&id).copied().unwrap_or(false)
    }

    /// Number of structures whose own label is present.
    pub fn labeled_count(&self) -> usize {
        self.own.values().filter(|&&v| v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_structures::StructureRecord;

    fn tree() -> StructureTree {
        StructureTree::from_records(&[
            StructureRecord::new(999, "root", "root", [0, 0, 0], vec![999]),
            StructureRecord::new(101, "P", "parent", [0, 0, 0], vec![999, 101]),
            StructureRecord::new(1, "A", "a", [0, 0, 0], vec![999, 101, 1]),
            StructureRecord::new(5, "B", "b", [0, 0, 0], vec![999, 101, 5]),
            StructureRecord::new(7, "E", "empty", [0, 0, 0], vec![999, 7]),
            StructureRecord::new(8, "F", "empty child", [0, 0, 0], vec![999, 7, 8]),
        ])
        .unwrap()
    }

    #[test]
    fn test_own_and_subtree_flags() {
        let presence = VoxelPresence::compute(&tree(), &BTreeSet::from([5]));
        assert!(presence.has_own_voxels(5));
        assert!(!presence.has_own_voxels(101));
        assert!(presence.subtree_has_voxels(101));
        assert!(presence.subtree_has_voxels(999));
        assert!(!presence.subtree_has_voxels(1));
        assert!(!presence.subtree_has_voxels(7));
        assert_eq!(presence.labeled_count(), 1);
    }

    #[test]
    fn test_labels_outside_tree_are_ignored() {
        let presence = VoxelPresence::compute(&tree(), &BTreeSet::from([4242]));
        assert!(!presence.subtree_has_voxels(999));
        assert!(!presence.has_own_voxels(4242));
    }

    #[test]
    fn test_same_tree_two_volumes() {
        let tree = tree();
        let a = VoxelPresence::compute(&tree, &BTreeSet::from([8]));
        let b = VoxelPresence::compute(&tree, &BTreeSet::from([1]));
        assert!(a.subtree_has_voxels(7));
        assert!(!b.subtree_has_voxels(7));
    }
}
