//! Error types for the score ledger.
//!
//! Every fallible operation returns a [`ChainError`]. Failure is never
//! swallowed inside the store: ignoring a write error is a decision the
//! caller makes, not one the store makes for them.

use thiserror::Error;

/// Errors that can occur while recording or persisting runs.
///
/// Note what is *not* here: a tampered chain. Verification findings are
/// data returned to the caller, never errors.
#[derive(Debug, Error)]
pub enum ChainError {
    /// `append` was called with a level below 1.
    #[error("level must be at least 1, got {0}")]
    InvalidLevel(u32),

    /// `append` was called with a negative or non-finite duration.
    #[error("duration must be a non-negative finite number of seconds, got {0}")]
    InvalidDuration(f64),

    /// Reading or writing the store file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the store to JSON failed.
    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type ChainResult<T> = Result<T, ChainError>;
