//! # Mesh Operations
//!
//! Post-processing applied to extracted surfaces: component filtering,
//! decimation and smoothing.

pub mod components;
pub mod decimate;
pub mod smooth;

pub use components::{connected_components, largest_component};
pub use decimate::decimate;
pub use smooth::smooth_taubin;
