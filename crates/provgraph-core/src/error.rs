//! Error taxonomy for the conversion pipeline.
//!
//! Only failures of the injected key-value store are fatal: once a run is
//! configured to use it, every later phase depends on it. Everything
//! per-record (missing fields, unknown event types, unresolvable endpoint
//! references, duplicate node IDs) is recovered locally — the record is
//! dropped, logged, and accounted for in [`crate::counters::Counters`].

use thiserror::Error;

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The configured key-value store could not be opened.
    #[error("node store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// A store operation failed mid-run.
    #[error("store operation failed: {message}")]
    Store { message: String },

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
