//! Error taxonomy for the sync core.
//!
//! Everything below the HTTP layer returns [`Error`]; the handlers log the
//! detail and answer with a fixed message.

use thiserror::Error;

/// Sync and persistence errors
#[derive(Debug, Error)]
pub enum Error {
    /// Shared secret missing or wrong
    #[error("Unauthorized")]
    Unauthorized,

    /// The active storage strategy could not be reached
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: &'static str, reason: String },

    /// Stored JSON could not be decoded, or the document could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No usable storage strategy, e.g. the fallback directory is not writable
    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    /// Startup configuration is malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn unavailable(backend: &'static str, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
