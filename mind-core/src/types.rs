//! Core type definitions for the MIND runtime.
//!
//! Identifiers, the [`Hint`] returned by queries, and the read-only
//! introspection snapshots. Snapshots are projections computed at call time;
//! they carry no identity of their own.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Identifier of a slot within one memory state.
///
/// Allocated sequentially per state, so two states fed the same update
/// sequence assign the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Handle to a memory state living in a [`Runtime`](crate::runtime::Runtime) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub u64);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Query result
// ---------------------------------------------------------------------------

/// Result of a query: the closest known pattern and how much to trust it.
///
/// Hints are recomputed on every query and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    /// Copy of the matched slot's vector, `None` when nothing matched.
    pub vector: Option<Vec<f32>>,
    /// Length of `vector` (0 when nothing matched).
    pub dim: usize,
    /// Derived confidence in \[0, 1\].
    pub confidence: f64,
}

impl Hint {
    /// The empty hint returned when no slot matches.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            vector: None,
            dim: 0,
            confidence: 0.0,
        }
    }

    /// Whether a slot matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.vector.is_some()
    }
}

// ---------------------------------------------------------------------------
// Introspection snapshots
// ---------------------------------------------------------------------------

/// Basic epistemic state of the most recently touched slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plasticity {
    /// Current malleability in \[0.05, 1.0\].
    pub plasticity: f64,
    /// Accumulated resistance to change.
    pub stability: f64,
    /// Slot age (elapsed time since formation).
    pub age: f64,
}

/// Temporal awareness of the most recently touched slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temporal {
    /// Slot age.
    pub age: f64,
    /// Current plasticity.
    pub plasticity: f64,
    /// Plasticity change at the last reinforcement (≤ 0).
    pub velocity: f64,
    /// How settled the slot is, in \[0, 1).
    pub maturity: f64,
    /// Slot age at its most recent reinforcement.
    pub last_reinforcement_age: f64,
    /// Time elapsed between the last two touches of the slot.
    pub time_since_reinforcement: f64,
    /// State-wide count of update calls.
    pub total_updates: u64,
    /// Reinforcements of this slot.
    pub total_reinforcements: u64,
}

/// Calibration signal for an external confidence-calibration consumer.
///
/// Carries no memory content, only meta-cognitive state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Slot age.
    pub age: f64,
    /// Current plasticity.
    pub plasticity: f64,
    /// Plasticity change at the last reinforcement.
    pub velocity: f64,
    /// How settled the slot is, in \[0, 1).
    pub maturity: f64,
    /// Share of the slot's observations that were reinforcements.
    pub reinforcement_ratio: f64,
}
