//! Capacity eviction.
//!
//! When a state is full and an embedding matches no slot, one slot makes
//! room for the new pattern. The victim is the least-established slot:
//!
//! ```text
//! Score = plasticity × stability
//! ```
//!
//! **Lower** scores are evicted first. A never-reinforced slot scores 0, so
//! an established memory is never dropped to admit a one-off. Ties go to the
//! earliest slot in the list (the oldest creation).

use ordered_float::OrderedFloat;

use crate::slot::Slot;

/// Compute the eviction priority score for a slot.
#[must_use]
pub fn eviction_score(slot: &Slot) -> f64 {
    slot.profile().retention_score()
}

/// Index of the slot to evict, or `None` if `slots` is empty.
#[must_use]
pub fn select_victim(slots: &[Slot]) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .min_by_key(|(_, slot)| OrderedFloat(eviction_score(slot)))
        .map(|(index, _)| index)
}
