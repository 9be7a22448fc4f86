//! Error types for the MIND core library.
//!
//! Every fallible operation returns [`MindError`]. Callers on the far side of
//! a foreign boundary usually only want a number, so each error also maps to a
//! stable [`Status`] code (zero is success).

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::StateId;

/// Top-level error type for all MIND operations.
#[derive(Error, Debug)]
pub enum MindError {
    /// Configuration failed validation (or cannot be changed right now).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An embedding did not have the configured dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Configured `embedding_dim`.
        expected: usize,
        /// Length of the rejected embedding.
        actual: usize,
    },

    /// `delta_t` was zero, negative, or not finite.
    #[error("Invalid time step: delta_t must be positive and finite, got {0}")]
    InvalidDeltaT(f64),

    /// An embedding component was NaN or infinite.
    #[error("Embedding component {index} is not finite")]
    NonFiniteEmbedding {
        /// Position of the first offending component.
        index: usize,
    },

    /// Slot storage could not be allocated.
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Introspection was requested before any slot was touched.
    #[error("No slot data: the state has not been updated since creation or reset")]
    NoData,

    /// A state handle does not resolve to a live state.
    #[error("Unknown state handle: {0}")]
    UnknownState(StateId),

    /// The state file to load does not exist.
    #[error("State file not found: {}", path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Persisted data is malformed or incompatible with the live configuration.
    #[error("Corrupt state data: {0}")]
    Corrupt(String),

    /// Encoding the state failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, MindError>;

/// Numeric status codes for callers that cannot carry a rich error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// Success.
    Ok = 0,
    /// Bad configuration, dimension, `delta_t` or embedding value.
    Validation = 1,
    /// Allocation failure while creating a runtime or state.
    Allocation = 2,
    /// Read or write failure.
    Io = 3,
    /// Nothing to load at the given path.
    FileNotFound = 4,
    /// Malformed or incompatible persisted data.
    Corrupt = 5,
    /// No slot has been touched yet.
    NoData = 6,
    /// The state handle is not (or no longer) valid.
    InvalidHandle = 7,
}

impl Status {
    /// The raw integer code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Status of an operation result.
    #[must_use]
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => e.status(),
        }
    }
}

impl MindError {
    /// The status code this error maps to.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Config(_)
            | Self::DimensionMismatch { .. }
            | Self::InvalidDeltaT(_)
            | Self::NonFiniteEmbedding { .. } => Status::Validation,
            Self::Allocation(_) => Status::Allocation,
            Self::NoData => Status::NoData,
            Self::UnknownState(_) => Status::InvalidHandle,
            Self::FileNotFound { .. } => Status::FileNotFound,
            Self::Corrupt(_) => Status::Corrupt,
            Self::Serialization(_) | Self::Io(_) => Status::Io,
        }
    }

    /// Whether the caller passed bad input (state is guaranteed untouched).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.status() == Status::Validation
    }
}
