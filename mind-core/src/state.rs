//! The memory state: a capacity-bounded collection of slots.
//!
//! A [`MemoryState`] learns from a stream of `(embedding, delta_t)`
//! observations. Each update either reinforces the closest matching slot or
//! stores the embedding as a new slot (evicting the least-established slot
//! when full). Queries are read-only and return a [`Hint`] whose confidence is
//! derived from the matched slot's profile.
//!
//! ```
//! use std::sync::Arc;
//! use mind_core::{MemoryConfig, MemoryState, MindConfig};
//!
//! let config = Arc::new(MindConfig::with_memory(MemoryConfig::new(4, 8)));
//! let mut state = MemoryState::new(config)?;
//! for _ in 0..10 {
//!     state.update(&[1.0, 0.0, 0.0, 0.0], 1.0)?;
//! }
//! assert_eq!(state.slot_count(), 1);
//! assert!(state.query(&[1.0, 0.0, 0.0, 0.0])?.confidence > 0.0);
//! # Ok::<(), mind_core::MindError>(())
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::MindConfig;
use crate::error::{MindError, Result};
use crate::eviction;
use crate::matcher;
use crate::persistence::{self, StateImage};
use crate::slot::Slot;
use crate::types::{Calibration, Hint, Plasticity, SlotId, Temporal};

/// Accumulated memory of one learner.
///
/// Not internally synchronized: mutation takes `&mut self`, reads take
/// `&self`. The runtime wraps each state in a lock.
#[derive(Debug, Clone)]
pub struct MemoryState {
    config: Arc<MindConfig>,
    slots: Vec<Slot>,
    cumulative_age: f64,
    total_updates: u64,
    total_reinforcements: u64,
    last_touched: Option<SlotId>,
    next_slot_id: u64,
}

impl MemoryState {
    /// Create an empty state sharing `config`.
    ///
    /// Slot storage for the full capacity is reserved up front.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Config`] if the configuration is invalid, or
    /// [`MindError::Allocation`] if slot storage cannot be reserved.
    pub fn new(config: Arc<MindConfig>) -> Result<Self> {
        config.validate()?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(config.memory.max_memory_slots)?;

        Ok(Self {
            config,
            slots,
            cumulative_age: 0.0,
            total_updates: 0,
            total_reinforcements: 0,
            last_touched: None,
            next_slot_id: 0,
        })
    }

    // ------------------------------------------------------------------
    // Learning
    // ------------------------------------------------------------------

    /// Feed one observation.
    ///
    /// Reinforces the best-matching slot, or stores `embedding` as a new slot.
    /// At capacity the least-established slot is evicted first.
    ///
    /// # Errors
    ///
    /// Validation errors ([`MindError::DimensionMismatch`],
    /// [`MindError::NonFiniteEmbedding`], [`MindError::InvalidDeltaT`]) and
    /// [`MindError::Allocation`] are returned before any state is touched.
    pub fn update(&mut self, embedding: &[f32], delta_t: f64) -> Result<()> {
        self.validate_embedding(embedding)?;
        if !(delta_t > 0.0 && delta_t.is_finite()) {
            return Err(MindError::InvalidDeltaT(delta_t));
        }

        let now = self.cumulative_age + delta_t;

        if let Some(m) = matcher::best_match(embedding, self.slots.iter().map(Slot::vector)) {
            let slot = &mut self.slots[m.index];
            slot.reinforce(embedding, now);
            self.total_reinforcements += 1;
            self.last_touched = Some(slot.id);
            debug!(
                slot = %slot.id,
                similarity = m.similarity,
                plasticity = slot.profile.plasticity,
                stability = slot.profile.stability,
                "Reinforced slot"
            );
        } else {
            let mut vector = Vec::new();
            vector.try_reserve_exact(embedding.len())?;
            vector.extend_from_slice(embedding);

            if self.slots.len() >= self.config.memory.max_memory_slots {
                self.evict_one();
            }

            let id = SlotId(self.next_slot_id);
            self.next_slot_id += 1;
            // A new slot's life starts with the interval it was observed in.
            let slot = Slot::new(
                id,
                vector,
                self.config.memory.initial_plasticity,
                self.cumulative_age,
            );
            self.slots.push(slot);
            self.last_touched = Some(id);
            debug!(slot = %id, slots = self.slots.len(), "Created slot");
        }

        self.cumulative_age = now;
        self.total_updates += 1;
        Ok(())
    }

    fn evict_one(&mut self) {
        if let Some(index) = eviction::select_victim(&self.slots) {
            let victim = self.slots.remove(index);
            if self.last_touched == Some(victim.id) {
                self.last_touched = None;
            }
            debug!(
                slot = %victim.id,
                score = eviction::eviction_score(&victim),
                "Evicted slot"
            );
        }
    }

    /// Discard all slots and counters, returning to the freshly created state.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.cumulative_age = 0.0;
        self.total_updates = 0;
        self.total_reinforcements = 0;
        self.last_touched = None;
        self.next_slot_id = 0;
        debug!("State reset");
    }

    // ------------------------------------------------------------------
    // Recall
    // ------------------------------------------------------------------

    /// Find the closest known pattern. Read-only.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `embedding` has the wrong dimension or
    /// non-finite components.
    pub fn query(&self, embedding: &[f32]) -> Result<Hint> {
        self.validate_embedding(embedding)?;

        let Some(m) = matcher::best_match(embedding, self.slots.iter().map(Slot::vector)) else {
            return Ok(Hint::empty());
        };

        let slot = &self.slots[m.index];
        Ok(Hint {
            vector: Some(slot.vector.clone()),
            dim: slot.vector.len(),
            confidence: slot.profile.confidence(m.similarity),
        })
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Plasticity snapshot of the most recently touched slot.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::NoData`] if no slot has been touched.
    pub fn plasticity(&self) -> Result<Plasticity> {
        let p = self.touched()?.profile;
        Ok(Plasticity {
            plasticity: p.plasticity,
            stability: p.stability,
            age: p.age,
        })
    }

    /// Temporal snapshot of the most recently touched slot.
    ///
    /// `total_updates` is state-wide; every other field is the slot's.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::NoData`] if no slot has been touched.
    pub fn temporal(&self) -> Result<Temporal> {
        let p = self.touched()?.profile;
        Ok(Temporal {
            age: p.age,
            plasticity: p.plasticity,
            velocity: p.velocity,
            maturity: p.maturity,
            last_reinforcement_age: p.last_reinforcement_age,
            time_since_reinforcement: p.time_since_reinforcement,
            total_updates: self.total_updates,
            total_reinforcements: p.total_reinforcements,
        })
    }

    /// Calibration signal of the most recently touched slot.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::NoData`] if no slot has been touched.
    pub fn calibration(&self) -> Result<Calibration> {
        let p = self.touched()?.profile;
        Ok(Calibration {
            age: p.age,
            plasticity: p.plasticity,
            velocity: p.velocity,
            maturity: p.maturity,
            reinforcement_ratio: p.reinforcement_ratio(),
        })
    }

    fn touched(&self) -> Result<&Slot> {
        let id = self.last_touched.ok_or(MindError::NoData)?;
        self.slots.iter().find(|s| s.id == id).ok_or(MindError::NoData)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the full state to `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Io`] or [`MindError::Serialization`] on failure;
    /// the destination is left as it was.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save(path.as_ref(), &self.image(), &self.config)
    }

    /// Replace this state with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::FileNotFound`], [`MindError::Io`] or
    /// [`MindError::Corrupt`]; on error the state is unchanged.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = persistence::load(path.as_ref(), &self.config)?;
        self.restore(image);
        Ok(())
    }

    pub(crate) fn image(&self) -> StateImage<'_> {
        StateImage {
            cumulative_age: self.cumulative_age,
            total_updates: self.total_updates,
            total_reinforcements: self.total_reinforcements,
            next_slot_id: self.next_slot_id,
            last_touched: self.last_touched,
            slots: self.slots.as_slice().into(),
        }
    }

    fn restore(&mut self, image: StateImage<'static>) {
        self.slots.clear();
        self.slots.extend(image.slots.into_owned());
        self.cumulative_age = image.cumulative_age;
        self.total_updates = image.total_updates;
        self.total_reinforcements = image.total_reinforcements;
        self.last_touched = image.last_touched;
        self.next_slot_id = image.next_slot_id;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of live slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Live slots in creation order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Sum of every `delta_t` accepted by `update`.
    #[must_use]
    pub fn cumulative_age(&self) -> f64 {
        self.cumulative_age
    }

    /// Number of accepted `update` calls.
    #[must_use]
    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }

    /// Number of updates that reinforced an existing slot.
    #[must_use]
    pub fn total_reinforcements(&self) -> u64 {
        self.total_reinforcements
    }

    /// The shared configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<MindConfig> {
        &self.config
    }

    fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        let expected = self.config.memory.embedding_dim;
        if embedding.len() != expected {
            return Err(MindError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        if let Some(index) = embedding.iter().position(|x| !x.is_finite()) {
            return Err(MindError::NonFiniteEmbedding { index });
        }
        Ok(())
    }
}
