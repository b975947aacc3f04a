//! # Atlas Structures
//!
//! Flat structure records and the region hierarchy built from them.
//!
//! ## Architecture
//!
//! ```text
//! structures.json → Vec<StructureRecord> → StructureTree
//! ```
//!
//! Validation is exhaustive and happens before any volume work: a structure
//! list with zero or several roots, duplicate ids or acronyms, or a path whose
//! parent is missing is rejected with a [`StructureError`].
//!
//! ## Usage
//!
//! ```rust
//! use atlas_structures::{StructureRecord, StructureTree};
//!
//! let records = vec![
//!     StructureRecord::new(999, "root", "root", [255, 255, 255], vec![999]),
//!     StructureRecord::new(101, "P", "parent", [200, 10, 10], vec![999, 101]),
//!     StructureRecord::new(1, "C1", "child one", [10, 200, 10], vec![999, 101, 1]),
//! ];
//! let tree = StructureTree::from_records(&records).unwrap();
//! assert_eq!(tree.size(), 3);
//! assert_eq!(tree.ancestors(1).unwrap(), vec![999, 101]);
//! ```

pub mod error;
pub mod record;
pub mod tree;

pub use error::{StructureError, StructureResult};
pub use record::{
    check_consistency, read_structures_json, structures_from_json_str, write_structures_json,
    StructureRecord,
};
pub use tree::StructureTree;
