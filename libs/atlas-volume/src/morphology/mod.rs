//! # Binary Morphology
//!
//! Hole filling, dilation, erosion and closing on [`RegionMask`]s.
//!
//! All operators use the 6-connected cross structuring element. Dilation and
//! erosion are computed by OR/AND-ing axis-shifted views of the mask, so one
//! iteration is six whole-array passes with no per-voxel neighbor lookups.
//!
//! Voxels outside the array are background. [`close`] pads the mask before
//! dilating so that erosion does not eat into regions touching the border.

use crate::mask::RegionMask;
use ndarray::{s, Array3, Axis, Zip};
use std::collections::VecDeque;
use tracing::trace;


const NEIGHBORS: [[isize; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

/// Fills enclosed background cavities.
///
/// A background voxel is a hole if it is not 6-connected to the array
/// border through other background voxels.
pub fn fill_holes(mask: &RegionMask) -> RegionMask {
    let data = mask.data();
    let (nx, ny, nz) = data.dim();
    if data.is_empty() {
        return mask.clone();
    }

    let mut outside = Array3::from_elem((nx, ny, nz), false);
    let mut queue = VecDeque::new();

    for ((x, y, z), &set) in data.indexed_iter() {
        let on_border = x == 0 || y == 0 || z == 0 || x == nx - 1 || y == ny - 1 || z == nz - 1;
        if on_border && !set {
            outside[[x, y, z]] = true;
            queue.push_back([x, y, z]);
        }
    }

    while let Some([x, y, z]) = queue.pop_front() {
        for offset in NEIGHBORS {
            let Some(next) = step([x, y, z], offset, [nx, ny, nz]) else {
                continue;
            };
            if !data[next] && !outside[next] {
                outside[next] = true;
                queue.push_back(next);
            }
        }
    }

    RegionMask::new(outside.mapv(|v| !v))
}

/// Dilates the mask `iterations` times.
pub fn dilate(mask: &RegionMask, iterations: u32) -> RegionMask {
    let mut current = mask.data().clone();
    for _ in 0..iterations {
        current = dilate_once(&current);
    }
    RegionMask::new(current)
}

/// Erodes the mask `iterations` times; out-of-bounds voxels count as background.
pub fn erode(mask: &RegionMask, iterations: u32) -> RegionMask {
    let mut current = mask.data().clone();
    for _ in 0..iterations {
        current = erode_once(&current);
    }
    RegionMask::new(current)
}

/// Morphological closing: `iterations` dilations followed by as many erosions.
///
/// The mask is padded with `iterations + 1` background voxels per side so the
/// result matches closing on an unbounded background, then cropped back.
pub fn close(mask: &RegionMask, iterations: u32) -> RegionMask {
    if iterations == 0 {
        return mask.clone();
    }
    let width = iterations as usize + 1;
    trace!(iterations, width, "closing mask");

    let padded = RegionMask::new(pad(mask.data(), width));
    let closed = erode(&dilate(&padded, iterations), iterations);
    RegionMask::new(crop(closed.data(), width))
}

/// Surrounds an array with `width` background voxels on every side.
pub fn pad(data: &Array3<bool>, width: usize) -> Array3<bool> {
    let (nx, ny, nz) = data.dim();
    let mut padded = Array3::from_elem((nx + 2 * width, ny + 2 * width, nz + 2 * width), false);
    padded
        .slice_mut(s![width..width + nx, width..width + ny, width..width + nz])
        .assign(data);
    padded
}

/// Removes `width` voxels from every side.
pub fn crop(data: &Array3<bool>, width: usize) -> Array3<bool> {
    let (nx, ny, nz) = data.dim();
    let end = |n: usize| n.saturating_sub(width).max(width);
    data.slice(s![width..end(nx), width..end(ny), width..end(nz)])
        .to_owned()
}

// =============================================================================
// SHIFTED-VIEW KERNELS
// =============================================================================

fn dilate_once(input: &Array3<bool>) -> Array3<bool> {
    let mut out = input.clone();
    for axis in 0..3 {
        let axis = Axis(axis);
        let n = input.len_of(axis);
        if n < 2 {
            continue;
        }
        // Voxel i picks up i-1 and i+1
        Zip::from(out.slice_axis_mut(axis, (1..n).into()))
            .and(input.slice_axis(axis, (0..n - 1).into()))
            .for_each(|o, &i| *o |= i);
        Zip::from(out.slice_axis_mut(axis, (0..n - 1).into()))
            .and(input.slice_axis(axis, (1..n).into()))
            .for_each(|o, &i| *o |= i);
    }
    out
}

fn erode_once(input: &Array3<bool>) -> Array3<bool> {
    let mut out = input.clone();
    for axis in 0..3 {
        let axis = Axis(axis);
        let n = input.len_of(axis);
        if n == 0 {
            continue;
        }
        out.index_axis_mut(axis, 0).fill(false);
        out.index_axis_mut(axis, n - 1).fill(false);
        if n < 2 {
            continue;
        }
        Zip::from(out.slice_axis_mut(axis, (1..n).into()))
            .and(input.slice_axis(axis, (0..n - 1).into()))
            .for_each(|o, &i| *o &= i);
        Zip::from(out.slice_axis_mut(axis, (0..n - 1).into()))
            .and(input.slice_axis(axis, (1..n).into()))
            .for_each(|o, &i| *o &= i);
    }
    out
}

fn step(index: [usize; 3], offset: [isize; 3], shape: [usize; 3]) -> Option<[usize; 3]> {
    let mut next = [0usize; 3];
    for k in 0..3 {
        let v = index[k].checked_add_signed(offset[k])?;
        if v >= shape[k] {
            return None;
        }
        next[k] = v;
    }
    Some(next)
}
