//! The runtime: an arena of memory states sharing one configuration.
//!
//! A [`Runtime`] owns its states; callers address them by [`StateId`] and
//! resolve an id to a [`SharedState`] handle for reading or learning. Several
//! runtimes with different configurations can coexist in one process.
//!
//! ```
//! use mind_core::{MemoryConfig, Runtime};
//!
//! let runtime = Runtime::new(MemoryConfig::new(4, 8))?;
//! let id = runtime.create_state()?;
//! runtime.state(id)?.write().update(&[1.0, 0.0, 0.0, 0.0], 1.0)?;
//! assert_eq!(runtime.state(id)?.read().slot_count(), 1);
//! runtime.destroy_state(id)?;
//! # Ok::<(), mind_core::MindError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{MemoryConfig, MindConfig};
use crate::error::{MindError, Result};
use crate::state::MemoryState;
use crate::types::StateId;

/// A state handle: shared ownership, many readers or one writer.
pub type SharedState = Arc<RwLock<MemoryState>>;

/// State arena with a shared, validated configuration.
///
/// `Send + Sync`; states can be created and resolved from any thread.
#[derive(Debug)]
pub struct Runtime {
    config: RwLock<Arc<MindConfig>>,
    states: RwLock<HashMap<StateId, SharedState>>,
    next_state: AtomicU64,
}

impl Runtime {
    /// Create a runtime with the given memory parameters and default
    /// persistence settings.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Config`] if the parameters are invalid.
    pub fn new(memory: MemoryConfig) -> Result<Self> {
        Self::from_config(MindConfig::with_memory(memory))
    }

    /// Create a runtime from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Config`] if the configuration is invalid.
    pub fn from_config(config: MindConfig) -> Result<Self> {
        config.validate()?;
        info!(
            embedding_dim = config.memory.embedding_dim,
            max_memory_slots = config.memory.max_memory_slots,
            "Runtime created"
        );
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            states: RwLock::new(HashMap::new()),
            next_state: AtomicU64::new(1),
        })
    }

    /// The configuration new states are created with.
    #[must_use]
    pub fn config(&self) -> Arc<MindConfig> {
        Arc::clone(&self.config.read())
    }

    /// Replace the memory parameters.
    ///
    /// Live states share the configuration, so this is only allowed while the
    /// runtime holds none.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Config`] if `memory` is invalid or any state is
    /// alive; the runtime is unchanged.
    pub fn reconfigure(&self, memory: MemoryConfig) -> Result<()> {
        memory.validate()?;

        let states = self.states.read();
        if !states.is_empty() {
            return Err(MindError::Config(format!(
                "cannot reconfigure with {} live state(s)",
                states.len()
            )));
        }

        let mut config = self.config.write();
        let persistence = config.persistence;
        *config = Arc::new(MindConfig {
            memory,
            persistence,
        });
        info!(
            embedding_dim = memory.embedding_dim,
            max_memory_slots = memory.max_memory_slots,
            "Runtime reconfigured"
        );
        Ok(())
    }

    /// Allocate a fresh, empty state.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Allocation`] if slot storage cannot be reserved.
    pub fn create_state(&self) -> Result<StateId> {
        let mut states = self.states.write();
        let state = MemoryState::new(self.config())?;

        let id = StateId(self.next_state.fetch_add(1, Ordering::Relaxed));
        states.insert(id, Arc::new(RwLock::new(state)));
        debug!(state = %id, live = states.len(), "State created");
        Ok(id)
    }

    /// Resolve a state id.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::UnknownState`] if `id` was never issued or has been
    /// destroyed.
    pub fn state(&self, id: StateId) -> Result<SharedState> {
        self.states
            .read()
            .get(&id)
            .cloned()
            .ok_or(MindError::UnknownState(id))
    }

    /// Remove a state from the arena.
    ///
    /// Handles already resolved keep the state alive until they are dropped,
    /// but the id no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::UnknownState`] if `id` is not live.
    pub fn destroy_state(&self, id: StateId) -> Result<()> {
        let mut states = self.states.write();
        states.remove(&id).ok_or(MindError::UnknownState(id))?;
        debug!(state = %id, live = states.len(), "State destroyed");
        Ok(())
    }

    /// Number of live states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.read().len()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let live = self.states.get_mut().len();
        if live > 0 {
            warn!(live, "Runtime dropped with live states");
        }
    }
}
