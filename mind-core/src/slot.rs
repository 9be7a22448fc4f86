//! Memory slot: one learned pattern.
//!
//! A slot pairs a stored vector with a decaying [`Profile`]. It is created
//! when an embedding matches nothing, reinforced when a later embedding
//! matches it, and only goes away through eviction, `reset`, or the state
//! being dropped.

use serde::{Deserialize, Serialize};

use crate::decay::Profile;
use crate::types::SlotId;

/// A stored (embedding, decay-profile) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub(crate) id: SlotId,
    pub(crate) vector: Vec<f32>,
    pub(crate) profile: Profile,
    /// State clock reading at the slot's last touch.
    pub(crate) touched_at: f64,
}

impl Slot {
    /// Create a slot holding `vector`, formed at state clock `formed_at`.
    #[must_use]
    pub fn new(id: SlotId, vector: Vec<f32>, initial_plasticity: f64, formed_at: f64) -> Self {
        Self {
            id,
            vector,
            profile: Profile::new(initial_plasticity),
            touched_at: formed_at,
        }
    }

    /// Reinforce the slot with `embedding` observed at state clock `now`.
    ///
    /// The stored vector moves toward the input by the current plasticity
    /// (`v ← v·(1 − p) + x·p`), then the profile takes one decay step.
    pub fn reinforce(&mut self, embedding: &[f32], now: f64) {
        let p = self.profile.plasticity;
        for (v, &x) in self.vector.iter_mut().zip(embedding) {
            *v = (f64::from(*v) * (1.0 - p) + f64::from(x) * p) as f32;
        }

        let elapsed = (now - self.touched_at).max(0.0);
        self.profile = self.profile.reinforce(elapsed);
        self.touched_at = now;
    }

    /// Slot identifier.
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Stored vector.
    #[must_use]
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Current decay profile.
    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// State clock reading at the last touch.
    #[must_use]
    pub fn touched_at(&self) -> f64 {
        self.touched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_unreinforced() {
        let slot = Slot::new(SlotId(0), vec![1.0, 0.0], 1.0, 0.0);
        assert_eq!(slot.profile().total_reinforcements, 0);
        assert_eq!(slot.profile().stability, 0.0);
        assert_eq!(slot.vector(), &[1.0, 0.0]);
    }

    #[test]
    fn full_plasticity_adopts_input() {
        let mut slot = Slot::new(SlotId(0), vec![1.0, 0.0], 1.0, 0.0);
        slot.reinforce(&[0.9, 0.1], 1.0);
        assert_eq!(slot.vector(), &[0.9, 0.1]);
    }

    #[test]
    fn identical_input_leaves_vector_unchanged() {
        let original = vec![0.3, -0.7, 0.25, 0.5];
        let mut slot = Slot::new(SlotId(0), original.clone(), 1.0, 0.0);
        for i in 1..50 {
            slot.reinforce(&original, f64::from(i));
        }
        assert_eq!(slot.vector(), original.as_slice());
    }

    #[test]
    fn elapsed_time_is_measured_from_last_touch() {
        let mut slot = Slot::new(SlotId(0), vec![1.0], 1.0, 0.0);
        slot.reinforce(&[1.0], 2.0);
        slot.reinforce(&[1.0], 5.0);
        assert!((slot.profile().age - 5.0).abs() < f64::EPSILON);
        assert!((slot.profile().time_since_reinforcement - 3.0).abs() < f64::EPSILON);
        assert!((slot.touched_at() - 5.0).abs() < f64::EPSILON);
    }
}
