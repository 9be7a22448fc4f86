//! Configuration for the MIND runtime.
//!
//! Maps directly to `mind.toml`:
//!
//! ```toml
//! [memory]
//! embedding_dim = 384
//! max_memory_slots = 1024
//! initial_plasticity = 1.0
//!
//! [persistence]
//! checksum_enabled = true
//! sync_on_save = true
//! ```
//!
//! The `[memory]` section is fixed once a runtime hands out states; every
//! state derived from the runtime reads the same shared copy.

use serde::{Deserialize, Serialize};

use crate::error::{MindError, Result};

/// Top-level MIND configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MindConfig {
    /// Embedding shape, capacity and starting plasticity.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// State file settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl MindConfig {
    /// Build a configuration around the given memory parameters, with default
    /// persistence settings.
    #[must_use]
    pub fn with_memory(memory: MemoryConfig) -> Self {
        Self {
            memory,
            persistence: PersistenceConfig::default(),
        }
    }

    /// Load configuration from a TOML string and validate it.
    ///
    /// # Errors
    /// Returns `MindError::Config` if the TOML is invalid or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| MindError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate every section.
    ///
    /// # Errors
    /// Returns `MindError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.memory.validate()
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Memory shape and learning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Length of every embedding passed to `update` / `query`.
    #[serde(default = "default_384")]
    pub embedding_dim: usize,
    /// Maximum number of live slots per state.
    #[serde(default = "default_1024")]
    pub max_memory_slots: usize,
    /// Plasticity assigned to newly created slots, in (0, 1].
    #[serde(default = "default_1_0")]
    pub initial_plasticity: f64,
}

impl MemoryConfig {
    /// Create a memory configuration with the default initial plasticity.
    #[must_use]
    pub fn new(embedding_dim: usize, max_memory_slots: usize) -> Self {
        Self {
            embedding_dim,
            max_memory_slots,
            initial_plasticity: 1.0,
        }
    }

    /// Check the invariants a runtime relies on.
    ///
    /// # Errors
    /// Returns `MindError::Config` if `embedding_dim` or `max_memory_slots` is
    /// zero, or `initial_plasticity` lies outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(MindError::Config("embedding_dim must be positive".to_string()));
        }
        if self.max_memory_slots == 0 {
            return Err(MindError::Config("max_memory_slots must be positive".to_string()));
        }
        // Written so that NaN fails too.
        if !(self.initial_plasticity > 0.0 && self.initial_plasticity <= 1.0) {
            return Err(MindError::Config(format!(
                "initial_plasticity must be in (0, 1], got {}",
                self.initial_plasticity
            )));
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            max_memory_slots: 1024,
            initial_plasticity: 1.0,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Verify the payload CRC-32 on load and reject files that do not match.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
    /// `fsync` the temporary file before it replaces the destination.
    #[serde(default = "default_true")]
    pub sync_on_save: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            checksum_enabled: true,
            sync_on_save: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_1_0() -> f64 { 1.0 }
fn default_384() -> usize { 384 }
fn default_1024() -> usize { 1024 }
