//! # Taubin Smoothing
//!
//! Alternating shrink (λ) and inflate (μ) Laplacian passes with uniform
//! neighbor weights. Unlike plain Laplacian smoothing the volume stays
//! close to the original.

use crate::mesh::Mesh;
use config::constants::{TAUBIN_LAMBDA, TAUBIN_MU};
use glam::DVec3;
use rayon::prelude::*;

/// Smooths a mesh in place with `iterations` λ/μ pass pairs.
///
/// Connectivity is unchanged; only vertex positions move.
pub fn smooth_taubin(mesh: &mut Mesh, iterations: u32) {
    if iterations == 0 || mesh.is_empty() {
        return;
    }
    let adjacency = vertex_adjacency(mesh);

    for _ in 0..iterations {
        laplacian_pass(mesh, &adjacency, TAUBIN_LAMBDA);
        laplacian_pass(mesh, &adjacency, TAUBIN_MU);
    }
}

fn laplacian_pass(mesh: &mut Mesh, adjacency: &[Vec<u32>], weight: f64) {
    let current = mesh.vertices();
    let next: Vec<DVec3> = current
        .par_iter()
        .zip(adjacency.par_iter())
        .map(|(&p, neighbors)| {
            if neighbors.is_empty() {
                return p;
            }
            let sum: DVec3 = neighbors.iter().map(|&n| current[n as usize]).sum();
            let average = sum / neighbors.len() as f64;
            p + (average - p) * weight
        })
        .collect();
    mesh.vertices_mut().copy_from_slice(&next);
}

/// Sorted, deduplicated one-ring of every vertex.
fn vertex_adjacency(mesh: &Mesh) -> Vec<Vec<u32>> {
    let mut adjacency = vec![Vec::new(); mesh.vertex_count()];
    for tri in mesh.triangles() {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}
