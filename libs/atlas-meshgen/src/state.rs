//! # Node State
//!
//! Lifecycle of one structure during a run:
//!
//! ```text
//! Pending → MaskBuilt → MeshAttempted → Registered
//!    │          │             │
//!    └──────────┴─────────────┴──→ Skipped(reason)
//! ```
//!
//! `Skipped` and `Registered` are terminal. No state moves backward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a structure ended without a registered mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Neither the structure nor any descendant has voxels
    NoLabels,
    /// The subtree mask has no foreground voxels
    EmptyMask,
    /// No usable surface survived extraction
    Degenerate { message: String },
    /// The mesh file is absent after the run
    MissingFile,
    /// The mesh file is below the minimum size
    Undersized { bytes: u64 },
    /// The task errored or panicked
    Failed { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoLabels => write!(f, "no labels found"),
            SkipReason::EmptyMask => write!(f, "empty mask"),
            SkipReason::Degenerate { message } => write!(f, "degenerate mesh: {message}"),
            SkipReason::MissingFile => write!(f, "no mesh file exists"),
            SkipReason::Undersized { bytes } => write!(f, "mesh file too small ({bytes} bytes)"),
            SkipReason::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

/// Per-node position in the run lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeState {
    Pending,
    MaskBuilt,
    MeshAttempted,
    Skipped(SkipReason),
    Registered,
}

impl NodeState {
    fn rank(&self) -> u8 {
        match self {
            NodeState::Pending => 0,
            NodeState::MaskBuilt => 1,
            NodeState::MeshAttempted => 2,
            NodeState::Skipped(_) | NodeState::Registered => 3,
        }
    }

    /// Returns true for `Skipped` and `Registered`.
    pub fn is_terminal(&self) -> bool {
        self.rank() == 3
    }

    /// Returns true if `next` is a forward transition from this state.
    pub fn can_advance(&self, next: &NodeState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    /// Moves to `next`, or returns the unchanged state if the move would go
    /// backward or leave a terminal state.
    pub fn advance(self, next: NodeState) -> Result<NodeState, NodeState> {
        if self.can_advance(&next) {
            Ok(next)
        } else {
            Err(self)
        }
    }

    /// Returns the skip reason of a skipped node.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            NodeState::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let state = NodeState::Pending
            .advance(NodeState::MaskBuilt)
            .and_then(|s| s.advance(NodeState::MeshAttempted))
            .and_then(|s| s.advance(NodeState::Registered))
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_skip_from_any_live_state() {
        for state in [NodeState::Pending, NodeState::MaskBuilt, NodeState::MeshAttempted] {
            assert!(state.can_advance(&NodeState::Skipped(SkipReason::EmptyMask)));
        }
    }

    #[test]
    fn test_no_backward_or_terminal_moves() {
        assert!(!NodeState::MeshAttempted.can_advance(&NodeState::MaskBuilt));
        assert!(!NodeState::MaskBuilt.can_advance(&NodeState::MaskBuilt));
        assert_eq!(
            NodeState::Registered.advance(NodeState::Skipped(SkipReason::MissingFile)),
            Err(NodeState::Registered)
        );
        let skipped = NodeState::Skipped(SkipReason::NoLabels);
        assert!(!skipped.can_advance(&NodeState::Registered));
        assert_eq!(skipped.skip_reason(), Some(&SkipReason::NoLabels));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            SkipReason::Undersized { bytes: 100 }.to_string(),
            "mesh file too small (100 bytes)"
        );
    }
}
