//! # Isosurface Extraction (Marching Tetrahedra)
//!
//! Extracts the boundary of a binary mask as a closed triangle surface.
//!
//! ## Algorithm
//!
//! 1. Treat every voxel center as a grid sample (1 inside, 0 outside)
//! 2. Split each grid cube into six tetrahedra along its main diagonal
//!    (Kuhn split; neighboring cubes agree on their shared faces)
//! 3. Place a vertex on every tetrahedron edge whose samples straddle the
//!    threshold, shared between tetrahedra through a grid-edge key
//! 4. Emit one triangle (1 or 3 inside) or two triangles (2 inside) per
//!    tetrahedron, oriented from inside to outside
//!
//! Samples outside the mask are background, which caps the surface where a
//! region touches the volume border. Tetrahedra have no ambiguous cases, so
//! the output is always a closed, consistently oriented 2-manifold.

use crate::mesh::Mesh;
use atlas_volume::RegionMask;
use glam::DVec3;
use std::collections::HashMap;
use tracing::debug;


/// Grid point in voxel index space; may lie one step outside the mask.
type GridPoint = [i64; 3];

/// The six tetrahedra of a unit cube, as corner bit masks (x=1, y=2, z=4).
///
/// Each walks from corner 0 to corner 7 adding one axis at a time.
const KUHN_TETRAHEDRA: [[u8; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Extracts the surface of a mask at `threshold`.
///
/// Vertices are in voxel index coordinates. Returns an empty mesh for an
/// empty mask.
///
/// # Example
///
/// ```rust,ignore
/// let mesh = extract_isosurface(&mask, ISOSURFACE_THRESHOLD);
/// assert!(mesh.is_watertight());
/// ```
pub fn extract_isosurface(mask: &RegionMask, threshold: f64) -> Mesh {
    let Some((lo, hi)) = foreground_bounds(mask) else {
        return Mesh::new();
    };

    let mut builder = SurfaceBuilder::new(mask, threshold);
    // Cubes whose corners can touch the foreground, including the background cap
    for x in lo[0] - 1..=hi[0] {
        for y in lo[1] - 1..=hi[1] {
            for z in lo[2] - 1..=hi[2] {
                builder.march_cube([x, y, z]);
            }
        }
    }

    let mesh = builder.finish();
    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "extracted isosurface"
    );
    mesh
}

/// Returns the inclusive bounding box of foreground voxels.
fn foreground_bounds(mask: &RegionMask) -> Option<(GridPoint, GridPoint)> {
    let mut bounds: Option<(GridPoint, GridPoint)> = None;
    for ((x, y, z), &set) in mask.data().indexed_iter() {
        if !set {
            continue;
        }
        let p = [x as i64, y as i64, z as i64];
        bounds = Some(match bounds {
            None => (p, p),
            Some((lo, hi)) => (
                [lo[0].min(p[0]), lo[1].min(p[1]), lo[2].min(p[2])],
                [hi[0].max(p[0]), hi[1].max(p[1]), hi[2].max(p[2])],
            ),
        });
    }
    bounds
}

// =============================================================================
// SURFACE BUILDER
// =============================================================================

struct SurfaceBuilder<'a> {
    mask: &'a RegionMask,
    threshold: f64,
    mesh: Mesh,
    /// Grid edge (sorted endpoints) to mesh vertex
    edge_vertices: HashMap<(GridPoint, GridPoint), u32>,
}

impl<'a> SurfaceBuilder<'a> {
    fn new(mask: &'a RegionMask, threshold: f64) -> Self {
        Self {
            mask,
            threshold,
            mesh: Mesh::new(),
            edge_vertices: HashMap::new(),
        }
    }

    fn finish(self) -> Mesh {
        self.mesh
    }

    fn sample(&self, p: GridPoint) -> f64 {
        if p.iter().any(|&c| c < 0) {
            return 0.0;
        }
        let set = self.mask.get([p[0] as usize, p[1] as usize, p[2] as usize]);
        if set {
            1.0
        } else {
            0.0
        }
    }

    fn march_cube(&mut self, origin: GridPoint) {
        let mut corners = [[0i64; 3]; 8];
        let mut values = [0.0f64; 8];
        for (bits, corner) in corners.iter_mut().enumerate() {
            *corner = [
                origin[0] + (bits & 1) as i64,
                origin[1] + ((bits >> 1) & 1) as i64,
                origin[2] + ((bits >> 2) & 1) as i64,
            ];
            values[bits] = self.sample(*corner);
        }

        let inside = values.map(|v| v > self.threshold);
        if inside.iter().all(|&i| i) || inside.iter().all(|&i| !i) {
            return;
        }

        for tet in KUHN_TETRAHEDRA {
            let points = tet.map(|c| corners[c as usize]);
            let samples = tet.map(|c| values[c as usize]);
            self.march_tetrahedron(points, samples);
        }
    }

    fn march_tetrahedron(&mut self, points: [GridPoint; 4], samples: [f64; 4]) {
        let (inner, outer): (Vec<usize>, Vec<usize>) =
            (0..4).partition(|&k| samples[k] > self.threshold);

        let crossings: Vec<(usize, usize)> = match (inner.len(), outer.len()) {
            (1, 3) => outer.iter().map(|&o| (inner[0], o)).collect(),
            (3, 1) => inner.iter().map(|&i| (i, outer[0])).collect(),
            // Quad in cyclic order around the tetrahedron
            (2, 2) => vec![
                (inner[0], outer[0]),
                (inner[0], outer[1]),
                (inner[1], outer[1]),
                (inner[1], outer[0]),
            ],
            _ => return,
        };

        let outward = centroid(&points, &outer) - centroid(&points, &inner);
        let ids: Vec<u32> = crossings
            .iter()
            .map(|&(i, o)| self.edge_vertex(points[i], points[o], samples[i], samples[o]))
            .collect();

        self.emit(ids[0], ids[1], ids[2], outward);
        if ids.len() == 4 {
            self.emit(ids[0], ids[2], ids[3], outward);
        }
    }

    fn edge_vertex(&mut self, a: GridPoint, b: GridPoint, fa: f64, fb: f64) -> u32 {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&index) = self.edge_vertices.get(&key) {
            return index;
        }
        let t = (self.threshold - fa) / (fb - fa);
        let pa = to_dvec(a);
        let position = pa + (to_dvec(b) - pa) * t;
        let index = self.mesh.add_vertex(position);
        self.edge_vertices.insert(key, index);
        index
    }

    fn emit(&mut self, a: u32, b: u32, c: u32, outward: DVec3) {
        let [pa, pb, pc] = [self.mesh.vertex(a), self.mesh.vertex(b), self.mesh.vertex(c)];
        let normal = (pb - pa).cross(pc - pa);
        if normal.dot(outward) < 0.0 {
            self.mesh.add_triangle(a, c, b);
        } else {
            self.mesh.add_triangle(a, b, c);
        }
    }
}

fn to_dvec(p: GridPoint) -> DVec3 {
    DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

fn centroid(points: &[GridPoint; 4], subset: &[usize]) -> DVec3 {
    let sum: DVec3 = subset.iter().map(|&k| to_dvec(points[k])).sum();
    sum / subset.len() as f64
}
