//! Error types for the relay core.
//!
//! [`RelayError`] covers failures reported by the chat transport.

use thiserror::Error;

/// Top-level error for the relay.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Bot error: {0}")]
    Bot(String),
}

/// Result type for core operations; uses [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;
