//! # MIND Core Library
//!
//! A cognitive runtime: an embedding-addressed associative memory that learns
//! from a stream of observations and reports how sure it is about what it
//! recalls.
//!
//! - **Runtime**: an arena of independent memory states sharing one
//!   validated configuration ([`Runtime`]).
//! - **Memory state**: a capacity-bounded set of slots, each an embedding
//!   plus a decaying plasticity/stability profile ([`MemoryState`]).
//! - **Matching**: cosine similarity against a fixed acceptance threshold
//!   ([`matcher`]).
//! - **Decay**: reinforcement makes slots more stable and less plastic, down
//!   to a mercy floor ([`decay`]).
//! - **Introspection**: plasticity, temporal and calibration snapshots of
//!   the last touched slot ([`types`]).
//! - **Persistence**: versioned, checksummed state files written atomically
//!   ([`persistence`]).
//!
//! ## Quick start
//!
//! ```
//! use mind_core::{MemoryConfig, Runtime};
//!
//! let runtime = Runtime::new(MemoryConfig::new(4, 8))?;
//! let id = runtime.create_state()?;
//! let state = runtime.state(id)?;
//!
//! for _ in 0..10 {
//!     state.write().update(&[1.0, 0.0, 0.0, 0.0], 1.0)?;
//! }
//! let hint = state.read().query(&[1.0, 0.0, 0.0, 0.0])?;
//! assert!(hint.confidence > 0.0);
//! # Ok::<(), mind_core::MindError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod decay;
pub mod error;
pub mod eviction;
pub mod matcher;
pub mod persistence;
pub mod runtime;
pub mod slot;
pub mod state;
pub mod types;

pub use config::{MemoryConfig, MindConfig, PersistenceConfig};
pub use decay::MERCY_FLOOR;
pub use error::{MindError, Result, Status};
pub use matcher::MATCH_THRESHOLD;
pub use runtime::{Runtime, SharedState};
pub use slot::Slot;
pub use state::MemoryState;
pub use types::*;

/// Version of this crate.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
