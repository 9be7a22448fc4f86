//! Plasticity Decay: the reinforcement transition of a memory slot.
//!
//! Every time a slot is reinforced it becomes a little more stable and a
//! little less plastic:
//!
//! ```text
//!   Δs = ln(1 + n) / (1 + Δt)                       stability gain
//!   p' = ε + (p − ε) · (1 + k·s) / (1 + k·(s + Δs))  plasticity decay
//!   m  = x / (1 + x),   x = n² / (1 + age)          maturity
//! ```
//!
//! Where:
//!   n  = reinforcements of the slot (including this one)
//!   Δt = time since the slot was last touched
//!   ε  = mercy floor (0.05), k = plasticity decay constant
//!
//! Frequent, recent reinforcement compounds stability fastest. The decay
//! factors telescope, so `p = ε + (p₀ − ε) / (1 + k·s)` for total stability
//! `s`: plasticity is a strictly decreasing function of stability that only
//! reaches the floor in the limit. The hyperbolic shape also keeps
//! `plasticity × stability` increasing in `s`, which is what eviction ranks by.
//!
//! Everything here is pure: no clock, no randomness, so identical update
//! sequences give bit-identical profiles.

use serde::{Deserialize, Serialize};

/// Plasticity floor. No slot ever drops below this.
pub const MERCY_FLOOR: f64 = 0.05;

/// Plasticity decay constant `k` (per unit of stability).
pub const PLASTICITY_DECAY: f64 = 0.5;

/// Largest maturity value; maturity never reaches 1.
pub const MATURITY_CEILING: f64 = 1.0 - f64::EPSILON;

/// The decaying profile carried by every slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Openness to reshaping, in \[`MERCY_FLOOR`, 1.0\].
    pub plasticity: f64,
    /// Accumulated resistance to change; never decreases.
    pub stability: f64,
    /// Elapsed time since the slot was formed.
    pub age: f64,
    /// Plasticity change at the last reinforcement.
    pub velocity: f64,
    /// How settled the slot is, in \[0, 1).
    pub maturity: f64,
    /// `age` at the most recent reinforcement.
    pub last_reinforcement_age: f64,
    /// Elapsed time between the last two touches.
    pub time_since_reinforcement: f64,
    /// Reinforcements of this slot.
    pub total_reinforcements: u64,
    /// Updates that touched this slot, creation included.
    pub observations: u64,
}

impl Profile {
    /// Profile of a freshly created slot.
    ///
    /// `initial_plasticity` is clamped into \[`MERCY_FLOOR`, 1.0\].
    #[must_use]
    pub fn new(initial_plasticity: f64) -> Self {
        Self {
            plasticity: clamp_plasticity(initial_plasticity),
            stability: 0.0,
            age: 0.0,
            velocity: 0.0,
            maturity: 0.0,
            last_reinforcement_age: 0.0,
            time_since_reinforcement: 0.0,
            total_reinforcements: 0,
            observations: 1,
        }
    }

    /// Apply one reinforcement after `elapsed` time since the previous touch.
    #[must_use]
    pub fn reinforce(&self, elapsed: f64) -> Self {
        let n = self.total_reinforcements + 1;
        let age = self.age + elapsed;
        let gain = stability_gain(n, elapsed);
        let plasticity = decayed_plasticity(self.plasticity, self.stability, gain);

        Self {
            plasticity,
            stability: self.stability + gain,
            age,
            velocity: plasticity - self.plasticity,
            maturity: maturity(n, age),
            last_reinforcement_age: age,
            time_since_reinforcement: elapsed,
            total_reinforcements: n,
            observations: self.observations + 1,
        }
    }

    /// Confidence of a match with the given similarity against this profile.
    #[must_use]
    pub fn confidence(&self, similarity: f64) -> f64 {
        confidence(similarity, self.plasticity, self.stability)
    }

    /// Share of this slot's observations that were reinforcements.
    #[must_use]
    pub fn reinforcement_ratio(&self) -> f64 {
        reinforcement_ratio(self.total_reinforcements, self.observations)
    }

    /// Score used to rank slots for eviction (lower goes first).
    #[must_use]
    pub fn retention_score(&self) -> f64 {
        self.plasticity * self.stability
    }
}

/// Stability gained by the `n`-th reinforcement, `elapsed` after the previous touch.
#[must_use]
pub fn stability_gain(n: u64, elapsed: f64) -> f64 {
    (1.0 + n as f64).ln() / (1.0 + elapsed.max(0.0))
}

/// Plasticity after a slot at `stability` gains `gain` more, floored at
/// [`MERCY_FLOOR`].
#[must_use]
pub fn decayed_plasticity(plasticity: f64, stability: f64, gain: f64) -> f64 {
    let excess = (plasticity - MERCY_FLOOR).max(0.0);
    let before = 1.0 + PLASTICITY_DECAY * stability.max(0.0);
    let after = before + PLASTICITY_DECAY * gain.max(0.0);
    clamp_plasticity(MERCY_FLOOR + excess * (before / after))
}

/// Maturity after `n` reinforcements over `age` elapsed time.
#[must_use]
pub fn maturity(n: u64, age: f64) -> f64 {
    let n = n as f64;
    let x = n * n / (1.0 + age.max(0.0));
    (x / (1.0 + x)).min(MATURITY_CEILING)
}

/// `reinforcements / max(1, observations)`.
#[must_use]
pub fn reinforcement_ratio(reinforcements: u64, observations: u64) -> f64 {
    reinforcements as f64 / observations.max(1) as f64
}

/// Confidence = similarity × (1 − plasticity) × s / (1 + s).
///
/// Zero for a never-reinforced slot (stability 0); grows as stability rises
/// and plasticity falls. Always in \[0, 1\].
#[must_use]
pub fn confidence(similarity: f64, plasticity: f64, stability: f64) -> f64 {
    let similarity = similarity.clamp(0.0, 1.0);
    let settledness = 1.0 - clamp_plasticity(plasticity);
    let stability = stability.max(0.0);
    let weight = stability / (1.0 + stability);
    (similarity * settledness * weight).clamp(0.0, 1.0)
}

fn clamp_plasticity(plasticity: f64) -> f64 {
    plasticity.clamp(MERCY_FLOOR, 1.0)
}
