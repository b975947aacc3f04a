//! # Mesh Data Structure
//!
//! Indexed triangle mesh with the geometric queries used to check
//! extracted region surfaces.

use config::constants::{EPSILON, VERTEX_MERGE_EPSILON};
use glam::DVec3;
use std::collections::HashMap;

/// A triangle mesh with vertices and indices.
///
/// Coordinates are in voxel index space until scaled by a resolution.
/// Triangles are wound counter-clockwise when seen from outside, so a closed
/// surface has positive [`Mesh::signed_volume`].
///
/// # Example
///
/// ```rust
/// use atlas_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
    /// Optional vertex normals
    normals: Option<Vec<DVec3>>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            normals: None,
        }
    }

    /// Creates a mesh from existing buffers.
    pub fn from_parts(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
            normals: None,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a mutable reference to the vertices.
    ///
    /// Invalidates cached normals.
    pub fn vertices_mut(&mut self) -> &mut [DVec3] {
        self.normals = None;
        &mut self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the triangle at the given index.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        self.triangles[index]
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn corners(&self, tri: [u32; 3]) -> [DVec3; 3] {
        [self.vertex(tri[0]), self.vertex(tri[1]), self.vertex(tri[2])]
    }

    /// Returns the vertex normals, if computed.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Computes area-weighted vertex normals.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![DVec3::ZERO; self.vertices.len()];

        for tri in &self.triangles {
            let [v0, v1, v2] = self.corners(*tri);
            let normal = (v1 - v0).cross(v2 - v0);

            normals[tri[0] as usize] += normal;
            normals[tri[1] as usize] += normal;
            normals[tri[2] as usize] += normal;
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }

        self.normals = Some(normals);
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(&first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        self.vertices[1..]
            .iter()
            .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Scales every vertex per axis.
    ///
    /// Used to convert voxel coordinates into physical units.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// // 25 micron isotropic atlas
    /// mesh.scale(DVec3::splat(25.0));
    /// ```
    pub fn scale(&mut self, factors: DVec3) {
        for v in &mut self.vertices {
            *v *= factors;
        }
        if factors.x * factors.y * factors.z < 0.0 {
            // Mirroring flips orientation
            for tri in &mut self.triangles {
                tri.swap(1, 2);
            }
        }
        self.normals = None;
    }

    /// Merges another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );
        self.normals = None;
    }

    /// Signed enclosed volume (divergence theorem).
    ///
    /// Positive for closed surfaces with outward-facing triangles.
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let [v0, v1, v2] = self.corners(*tri);
                v0.dot(v1.cross(v2))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Total triangle area.
    pub fn surface_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let [v0, v1, v2] = self.corners(*tri);
                0.5 * (v1 - v0).cross(v2 - v0).length()
            })
            .sum()
    }

    /// Returns true if every directed edge is matched by exactly one
    /// opposite edge, i.e. the surface is closed and consistently oriented.
    pub fn is_watertight(&self) -> bool {
        if self.triangles.is_empty() {
            return false;
        }
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for tri in &self.triangles {
            for k in 0..3 {
                *directed.entry((tri[k], tri[(k + 1) % 3])).or_default() += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Ray-parity point containment test for closed meshes.
    pub fn contains_point(&self, point: DVec3) -> bool {
        // Skewed direction avoids grazing edges of axis-aligned surfaces
        let direction = DVec3::new(1.0, 0.000_123_7, 0.000_071_3).normalize();
        let hits = self
            .triangles
            .iter()
            .filter(|tri| ray_hits_triangle(point, direction, self.corners(**tri)))
            .count();
        hits % 2 == 1
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No degenerate triangles (repeated index or zero area)
    ///
    /// Returns true if valid.
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.triangles.iter().all(|tri| {
            if tri.iter().any(|&i| i >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            let [v0, v1, v2] = self.corners(*tri);
            (v1 - v0).cross(v2 - v0).length() >= VERTEX_MERGE_EPSILON
        })
    }

    /// Drops vertices no triangle references and renumbers the rest.
    pub fn compact(&mut self) {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len());

        for tri in &mut self.triangles {
            for index in tri.iter_mut() {
                let slot = &mut remap[*index as usize];
                if *slot == u32::MAX {
                    *slot = vertices.len() as u32;
                    vertices.push(self.vertices[*index as usize]);
                }
                *index = *slot;
            }
        }

        self.vertices = vertices;
        self.normals = None;
    }
}

/// Möller-Trumbore intersection for rays leaving `origin` (t > 0).
fn ray_hits_triangle(origin: DVec3, direction: DVec3, [v0, v1, v2]: [DVec3; 3]) -> bool {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return false;
    }
    let inv = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = s.cross(edge1);
    let v = direction.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    edge2.dot(q) * inv > EPSILON
}
