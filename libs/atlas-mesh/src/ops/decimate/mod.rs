//! # Quadric Edge-Collapse Decimation
//!
//! Reduces a mesh to a target fraction of its vertices while keeping the
//! surface closed and manifold.
//!
//! ## Algorithm
//!
//! Garland-Heckbert quadric error metrics:
//!
//! 1. Accumulate a plane quadric per vertex from its incident faces
//! 2. Score every edge by the error of its optimal collapse position
//! 3. Repeatedly pop the cheapest edge and collapse it, unless:
//!    a. the link condition fails (collapse would pinch the surface)
//!    b. a surrounding face would flip or degenerate
//! 4. Stale heap entries are detected by per-vertex version stamps
//!
//! Ties are broken by vertex ids, so the result is deterministic.

use crate::mesh::Mesh;
use config::constants::{
    DECIMATION_MIN_NORMAL_ALIGNMENT, EPSILON, MIN_DECIMATED_VERTICES, VERTEX_MERGE_EPSILON,
};
use glam::{DMat3, DVec3};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};
use tracing::debug;


/// Decimates a mesh to `fraction` of its vertex count.
///
/// `fraction >= 1.0` returns the mesh unchanged. The target never drops
/// below a tetrahedron. Decimation stops early when no remaining collapse
/// is topologically safe.
///
/// # Example
///
/// ```rust,ignore
/// let reduced = decimate(&mesh, 0.6);
/// assert!(reduced.vertex_count() <= mesh.vertex_count());
/// ```
pub fn decimate(mesh: &Mesh, fraction: f64) -> Mesh {
    let original = mesh.vertex_count();
    if fraction >= 1.0 || original <= MIN_DECIMATED_VERTICES {
        return mesh.clone();
    }
    let target = ((original as f64 * fraction).round() as usize).max(MIN_DECIMATED_VERTICES);
    if target >= original {
        return mesh.clone();
    }

    let mut state = CollapseState::new(mesh);
    state.run(target);
    let result = state.into_mesh();

    debug!(
        from = original,
        to = result.vertex_count(),
        target,
        "decimated mesh"
    );
    result
}

// =============================================================================
// QUADRIC
// =============================================================================

/// Symmetric 4x4 error quadric, upper triangle stored row-major.
#[derive(Debug, Clone, Copy, Default)]
struct Quadric([f64; 10]);

impl Quadric {
    fn from_plane(normal: DVec3, d: f64) -> Self {
        let (a, b, c) = (normal.x, normal.y, normal.z);
        Self([
            a * a,
            a * b,
            a * c,
            a * d,
            b * b,
            b * c,
            b * d,
            c * c,
            c * d,
            d * d,
        ])
    }

    fn add(&self, other: &Quadric) -> Quadric {
        let mut sum = self.0;
        for (s, o) in sum.iter_mut().zip(other.0) {
            *s += o;
        }
        Quadric(sum)
    }

    fn error(&self, p: DVec3) -> f64 {
        let q = &self.0;
        let (x, y, z) = (p.x, p.y, p.z);
        q[0] * x * x
            + 2.0 * q[1] * x * y
            + 2.0 * q[2] * x * z
            + 2.0 * q[3] * x
            + q[4] * y * y
            + 2.0 * q[5] * y * z
            + 2.0 * q[6] * y
            + q[7] * z * z
            + 2.0 * q[8] * z
            + q[9]
    }

    /// Position minimizing the error, if the system is well conditioned.
    fn optimum(&self) -> Option<DVec3> {
        let q = &self.0;
        let a = DMat3::from_cols(
            DVec3::new(q[0], q[1], q[2]),
            DVec3::new(q[1], q[4], q[5]),
            DVec3::new(q[2], q[5], q[7]),
        );
        if a.determinant().abs() < 1e-9 {
            return None;
        }
        Some(a.inverse() * DVec3::new(-q[3], -q[6], -q[8]))
    }
}

// =============================================================================
// COLLAPSE CANDIDATES
// =============================================================================

#[derive(Debug)]
struct Candidate {
    cost: f64,
    u: u32,
    v: u32,
    position: DVec3,
    stamp_u: u32,
    stamp_v: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed so the max-heap pops the cheapest edge
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.u.cmp(&self.u))
            .then_with(|| other.v.cmp(&self.v))
    }
}

// =============================================================================
// COLLAPSE STATE
// =============================================================================

struct CollapseState {
    positions: Vec<DVec3>,
    quadrics: Vec<Quadric>,
    faces: Vec<[u32; 3]>,
    face_alive: Vec<bool>,
    /// Alive faces incident to each vertex
    vertex_faces: Vec<Vec<usize>>,
    vertex_alive: Vec<bool>,
    stamps: Vec<u32>,
    alive_vertices: usize,
    heap: BinaryHeap<Candidate>,
}

impl CollapseState {
    fn new(mesh: &Mesh) -> Self {
        let n = mesh.vertex_count();
        let faces = mesh.triangles().to_vec();
        let mut quadrics = vec![Quadric::default(); n];
        let mut vertex_faces = vec![Vec::new(); n];

        for (index, tri) in faces.iter().enumerate() {
            let [p0, p1, p2] = mesh.corners(*tri);
            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            let plane = Quadric::from_plane(normal, -normal.dot(p0));
            for &v in tri {
                quadrics[v as usize] = quadrics[v as usize].add(&plane);
                vertex_faces[v as usize].push(index);
            }
        }

        let vertex_alive: Vec<bool> = vertex_faces.iter().map(|f| !f.is_empty()).collect();
        let alive_vertices = vertex_alive.iter().filter(|&&a| a).count();

        let mut state = Self {
            positions: mesh.vertices().to_vec(),
            quadrics,
            face_alive: vec![true; faces.len()],
            faces,
            vertex_faces,
            vertex_alive,
            stamps: vec![0; n],
            alive_vertices,
            heap: BinaryHeap::new(),
        };

        let mut edges = BTreeSet::new();
        for tri in &state.faces {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                edges.insert((a.min(b), a.max(b)));
            }
        }
        for (u, v) in edges {
            state.push_candidate(u, v);
        }
        state
    }

    fn push_candidate(&mut self, u: u32, v: u32) {
        let q = self.quadrics[u as usize].add(&self.quadrics[v as usize]);
        let pu = self.positions[u as usize];
        let pv = self.positions[v as usize];
        let mid = (pu + pv) * 0.5;

        // Optimal point, falling back to the best of endpoints and midpoint
        let position = q
            .optimum()
            .filter(|p| p.distance(mid) <= 2.0 * pu.distance(pv) + EPSILON)
            .unwrap_or_else(|| {
                [pu, pv, mid]
                    .into_iter()
                    .min_by(|a, b| q.error(*a).total_cmp(&q.error(*b)))
                    .unwrap_or(mid)
            });

        self.heap.push(Candidate {
            cost: q.error(position).max(0.0),
            u,
            v,
            position,
            stamp_u: self.stamps[u as usize],
            stamp_v: self.stamps[v as usize],
        });
    }

    fn run(&mut self, target: usize) {
        while self.alive_vertices > target {
            let Some(candidate) = self.heap.pop() else {
                break;
            };
            let (u, v) = (candidate.u as usize, candidate.v as usize);
            if !self.vertex_alive[u]
                || !self.vertex_alive[v]
                || self.stamps[u] != candidate.stamp_u
                || self.stamps[v] != candidate.stamp_v
            {
                continue;
            }
            if self.can_collapse(candidate.u, candidate.v, candidate.position) {
                self.collapse(candidate.u, candidate.v, candidate.position);
            }
        }
    }

    fn neighbors(&self, v: u32) -> BTreeSet<u32> {
        self.vertex_faces[v as usize]
            .iter()
            .flat_map(|&f| self.faces[f])
            .filter(|&w| w != v)
            .collect()
    }

    fn shared_faces(&self, u: u32, v: u32) -> Vec<usize> {
        self.vertex_faces[u as usize]
            .iter()
            .copied()
            .filter(|&f| self.faces[f].contains(&v))
            .collect()
    }

    fn can_collapse(&self, u: u32, v: u32, position: DVec3) -> bool {
        let shared = self.shared_faces(u, v);
        if shared.is_empty() {
            return false;
        }

        // Link condition: common neighbors are exactly the shared faces' apexes
        let (nu, nv) = (self.neighbors(u), self.neighbors(v));
        let common: Vec<u32> = nu.intersection(&nv).copied().collect();
        if common.len() != shared.len() {
            return false;
        }

        // Collapsing a tetrahedron, or an apex of valence 3, leaves a flat sheet
        if self.alive_vertices <= MIN_DECIMATED_VERTICES {
            return false;
        }
        if nu.union(&nv).filter(|&&w| w != u && w != v).count() < 3 {
            return false;
        }
        if common.iter().any(|&w| self.neighbors(w).len() <= 3) {
            return false;
        }

        for &w in &[u, v] {
            for &f in &self.vertex_faces[w as usize] {
                if shared.contains(&f) {
                    continue;
                }
                let tri = self.faces[f];
                let before = self.face_normal(tri, None);
                let after = self.face_normal(tri, Some((w, position)));
                let after_len = after.length();
                if after_len < VERTEX_MERGE_EPSILON {
                    return false;
                }
                let before_len = before.length();
                if before_len > EPSILON
                    && before.dot(after) / (before_len * after_len) < DECIMATION_MIN_NORMAL_ALIGNMENT
                {
                    return false;
                }
            }
        }
        true
    }

    fn face_normal(&self, tri: [u32; 3], moved: Option<(u32, DVec3)>) -> DVec3 {
        let p = tri.map(|i| match moved {
            Some((m, position)) if m == i => position,
            _ => self.positions[i as usize],
        });
        (p[1] - p[0]).cross(p[2] - p[0])
    }

    fn collapse(&mut self, u: u32, v: u32, position: DVec3) {
        for f in self.shared_faces(u, v) {
            self.face_alive[f] = false;
            for w in self.faces[f] {
                self.vertex_faces[w as usize].retain(|&g| g != f);
            }
        }

        let moved = std::mem::take(&mut self.vertex_faces[v as usize]);
        for &f in &moved {
            for index in self.faces[f].iter_mut() {
                if *index == v {
                    *index = u;
                }
            }
        }
        self.vertex_faces[u as usize].extend(moved);

        self.positions[u as usize] = position;
        self.quadrics[u as usize] = self.quadrics[u as usize].add(&self.quadrics[v as usize]);
        self.vertex_alive[v as usize] = false;
        self.alive_vertices -= 1;
        self.stamps[u as usize] += 1;

        for w in self.neighbors(u) {
            self.push_candidate(u.min(w), u.max(w));
        }
    }

    fn into_mesh(self) -> Mesh {
        let triangles = self
            .faces
            .into_iter()
            .zip(self.face_alive)
            .filter_map(|(tri, alive)| alive.then_some(tri))
            .collect();
        let mut mesh = Mesh::from_parts(self.positions, triangles);
        mesh.compact();
        mesh
    }
}
