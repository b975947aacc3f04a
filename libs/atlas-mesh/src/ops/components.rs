//! # Connected Components
//!
//! Splits a mesh into vertex-connected pieces with a union-find.

use crate::mesh::Mesh;

/// Returns the triangle indices of every connected component, ordered by
/// first appearance.
pub fn connected_components(mesh: &Mesh) -> Vec<Vec<usize>> {
    let mut sets = DisjointSet::new(mesh.vertex_count());
    for tri in mesh.triangles() {
        sets.union(tri[0] as usize, tri[1] as usize);
        sets.union(tri[1] as usize, tri[2] as usize);
    }

    let mut slot_of_root = vec![usize::MAX; mesh.vertex_count()];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for (index, tri) in mesh.triangles().iter().enumerate() {
        let root = sets.find(tri[0] as usize);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = components.len();
            components.push(Vec::new());
        }
        components[slot_of_root[root]].push(index);
    }
    components
}

/// Keeps only the component with the most triangles.
///
/// Ties go to the component that appears first.
pub fn largest_component(mesh: &Mesh) -> Mesh {
    let components = connected_components(mesh);
    if components.len() <= 1 {
        return mesh.clone();
    }

    let mut best = &components[0];
    for component in &components[1..] {
        if component.len() > best.len() {
            best = component;
        }
    }

    let triangles = best.iter().map(|&t| mesh.triangle(t)).collect();
    let mut result = Mesh::from_parts(mesh.vertices().to_vec(), triangles);
    result.compact();
    result
}

// =============================================================================
// UNION-FIND
// =============================================================================

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            // Path halving
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
