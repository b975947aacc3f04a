//! # Structure Tree
//!
//! Immutable region hierarchy built from a validated structure list.
//!
//! ## Construction
//!
//! 1. Check per-record invariants (paths, unique ids and acronyms)
//! 2. Find the single root (path of length one, acronym `root`)
//! 3. Build a parent → children adjacency map in one pass
//! 4. Breadth-first walk from the root with an explicit queue
//!
//! Nodes live in an arena indexed by position; children are kept sorted by
//! id so every traversal is deterministic. No traversal recurses, so deep
//! hierarchies cannot exhaust the stack.


use crate::error::{StructureError, StructureResult};
use crate::record::{check_consistency, StructureRecord};
use config::constants::ROOT_ACRONYM;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use tracing::debug;

/// A node of the structure arena.
#[derive(Debug, Clone)]
struct TreeNode {
    record: StructureRecord,
    parent: Option<usize>,
    /// Arena indices, sorted by structure id
    children: Vec<usize>,
    /// Distance from the root (root is 0)
    level: usize,
}

/// Navigable hierarchy of atlas structures.
///
/// # Example
///
/// ```rust
/// use atlas_structures::{StructureRecord, StructureTree};
///
/// let records = vec![
///     StructureRecord::new(999, "root", "root", [255, 255, 255], vec![999]),
///     StructureRecord::new(101, "P", "parent", [1, 1, 1], vec![999, 101]),
///     StructureRecord::new(5, "B", "b", [1, 1, 1], vec![999, 101, 5]),
///     StructureRecord::new(1, "A", "a", [1, 1, 1], vec![999, 101, 1]),
/// ];
/// let tree = StructureTree::from_records(&records).unwrap();
///
/// assert_eq!(tree.root_id(), 999);
/// assert_eq!(tree.children(101).unwrap(), vec![1, 5]);
/// assert_eq!(tree.depth(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StructureTree {
    nodes: Vec<TreeNode>,
    index: HashMap<u32, usize>,
}

impl StructureTree {
    /// Builds and validates the tree from a flat structure list.
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] if the list is empty, has zero or
    /// multiple roots, a misnamed root, duplicate ids or acronyms, a path
    /// that does not end in its own id, a missing parent, or records whose
    /// parent chain never reaches the root.
    pub fn from_records(records: &[StructureRecord]) -> StructureResult<Self> {
        check_consistency(records)?;

        let roots: Vec<&StructureRecord> = records.iter().filter(|r| r.is_root_path()).collect();
        let root = match roots.as_slice() {
            [] => return Err(StructureError::NoRoot),
            [root] => *root,
            _ => {
                let mut ids: Vec<u32> = roots.iter().map(|r| r.id).collect();
                ids.sort_unstable();
                return Err(StructureError::MultipleRoots { ids });
            }
        };
        if root.acronym != ROOT_ACRONYM {
            return Err(StructureError::RootAcronym {
                id: root.id,
                acronym: root.acronym.clone(),
            });
        }

        let known: HashMap<u32, &StructureRecord> = records.iter().map(|r| (r.id, r)).collect();

        // Parent id -> child records, in one pass
        let mut adjacency: HashMap<u32, Vec<&StructureRecord>> = HashMap::new();
        for record in records {
            if let Some(parent) = record.parent_id() {
                if !known.contains_key(&parent) {
                    return Err(StructureError::MissingParent {
                        id: record.id,
                        parent,
                    });
                }
                adjacency.entry(parent).or_default().push(record);
            }
        }
        for children in adjacency.values_mut() {
            children.sort_unstable_by_key(|r| r.id);
        }

        let mut nodes: Vec<TreeNode> = Vec::with_capacity(records.len());
        let mut index: HashMap<u32, usize> = HashMap::with_capacity(records.len());
        let mut queue: VecDeque<(&StructureRecord, Option<usize>, usize)> = VecDeque::new();
        queue.push_back((root, None, 0));

        while let Some((record, parent, level)) = queue.pop_front() {
            let slot = nodes.len();
            nodes.push(TreeNode {
                record: record.clone(),
                parent,
                children: Vec::new(),
                level,
            });
            index.insert(record.id, slot);
            if let Some(parent) = parent {
                nodes[parent].children.push(slot);
            }
            if let Some(children) = adjacency.get(&record.id) {
                for &child in children {
                    queue.push_back((child, Some(slot), level + 1));
                }
            }
        }

        if nodes.len() != records.len() {
            let mut ids: Vec<u32> = records
                .iter()
                .map(|r| r.id)
                .filter(|id| !index.contains_key(id))
                .collect();
            ids.sort_unstable();
            return Err(StructureError::Unreachable { ids });
        }

        let tree = Self { nodes, index };
        debug!(
            structures = tree.size(),
            depth = tree.depth(),
            root = tree.root_id(),
            "built structure tree"
        );
        Ok(tree)
    }

    /// Looks up the arena slot for an id.
    fn slot(&self, id: u32) -> StructureResult<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(StructureError::UnknownStructure { id })
    }

    /// Returns the number of structures in the tree.
    #[inline]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the maximum node level (a lone root has depth 0).
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// Returns the root structure id.
    #[inline]
    pub fn root_id(&self) -> u32 {
        // Slot 0 is always the root: the breadth-first build starts there
        self.nodes[0].record.id
    }

    /// Returns true if the id belongs to the tree.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns true if the id is the root.
    #[inline]
    pub fn is_root(&self, id: u32) -> bool {
        self.root_id() == id
    }

    /// Returns the record for an id.
    pub fn record(&self, id: u32) -> StructureResult<&StructureRecord> {
        Ok(&self.nodes[self.slot(id)?].record)
    }

    /// Returns the id of a structure by acronym.
    pub fn id_for_acronym(&self, acronym: &str) -> Option<u32> {
        self.nodes
            .iter()
            .find(|n| n.record.acronym == acronym)
            .map(|n| n.record.id)
    }

    /// Returns the parent id, `None` for the root.
    pub fn parent(&self, id: u32) -> StructureResult<Option<u32>> {
        let slot = self.slot(id)?;
        Ok(self.nodes[slot].parent.map(|p| self.nodes[p].record.id))
    }

    /// Returns the direct children ids, sorted.
    pub fn children(&self, id: u32) -> StructureResult<Vec<u32>> {
        let slot = self.slot(id)?;
        Ok(self.nodes[slot]
            .children
            .iter()
            .map(|&c| self.nodes[c].record.id)
            .collect())
    }

    /// Returns the distance from the root (root is 0).
    pub fn level(&self, id: u32) -> StructureResult<usize> {
        Ok(self.nodes[self.slot(id)?].level)
    }

    /// Returns the ancestors of a structure, root first, excluding itself.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_eq!(tree.ancestors(1129)?, vec![997, 8, 343]);
    /// ```
    pub fn ancestors(&self, id: u32) -> StructureResult<Vec<u32>> {
        let mut chain = Vec::new();
        let mut current = self.nodes[self.slot(id)?].parent;
        while let Some(slot) = current {
            chain.push(self.nodes[slot].record.id);
            current = self.nodes[slot].parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Collects arena slots of a subtree in pre-order with an explicit stack.
    fn subtree_slots(&self, slot: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![slot];
        while let Some(current) = stack.pop() {
            order.push(current);
            for &child in self.nodes[current].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Returns the ids of a structure and all of its descendants.
    pub fn subtree(&self, id: u32) -> StructureResult<BTreeSet<u32>> {
        let slot = self.slot(id)?;
        Ok(self
            .subtree_slots(slot)
            .into_iter()
            .map(|s| self.nodes[s].record.id)
            .collect())
    }

    /// Returns the ids of all descendants, excluding the structure itself.
    pub fn descendants(&self, id: u32) -> StructureResult<BTreeSet<u32>> {
        let mut ids = self.subtree(id)?;
        ids.remove(&id);
        Ok(ids)
    }

    /// Returns the terminal (childless) descendants of a structure, sorted.
    ///
    /// The structure itself is never included, even when it is a leaf.
    pub fn leaves(&self, id: u32) -> StructureResult<Vec<u32>> {
        let slot = self.slot(id)?;
        let mut leaves: Vec<u32> = self
            .subtree_slots(slot)
            .into_iter()
            .filter(|&s| s != slot && self.nodes[s].children.is_empty())
            .map(|s| self.nodes[s].record.id)
            .collect();
        leaves.sort_unstable();
        Ok(leaves)
    }

    /// Returns every id in pre-order depth-first order from the root.
    pub fn preorder(&self) -> Vec<u32> {
        self.subtree_slots(0)
            .into_iter()
            .map(|s| self.nodes[s].record.id)
            .collect()
    }

    /// Iterates records in pre-order depth-first order from the root.
    pub fn records(&self) -> impl Iterator<Item = &StructureRecord> + '_ {
        self.subtree_slots(0)
            .into_iter()
            .map(move |s| &self.nodes[s].record)
    }
}

impl fmt::Display for StructureTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in self.subtree_slots(0) {
            let node = &self.nodes[slot];
            writeln!(f, "{}{}", "  ".repeat(node.level), node.record.tag())?;
        }
        Ok(())
    }
}
