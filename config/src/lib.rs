//! # Config Crate
//!
//! Centralized configuration constants for the atlas meshing pipeline.
//! Every tunable number used by structure validation, mask building,
//! surface extraction and the batch orchestrator is defined here so the
//! library crates stay free of scattered literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_DECIMATE_FRACTION, ISOSURFACE_THRESHOLD};
//!
//! // Binary masks are surfaced half way between background and foreground
//! assert_eq!(ISOSURFACE_THRESHOLD, 0.5);
//!
//! // Decimation keeps a fraction of the original vertices
//! assert!(DEFAULT_DECIMATE_FRACTION > 0.0 && DEFAULT_DECIMATE_FRACTION <= 1.0);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **No State**: Only `const` items and pure helpers
//! - **Atlas Compatible**: Defaults match the established atlas packaging layout

pub mod constants;

#[cfg(test)]
mod tests;
