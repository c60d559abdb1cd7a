//! Engine error types.

use staysync_feeds::FeedError;
use thiserror::Error;

use crate::auth::AuthError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine.
///
/// `Fetch` and `Parse` are confined to a single feed; the sync orchestrator
/// records them as that source's failure instead of returning them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A feed could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(FeedError),

    /// A feed payload is not a calendar document.
    #[error("parse error: {0}")]
    Parse(FeedError),

    /// Admission input was rejected. Nothing was persisted.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// The persistent store failed or is unavailable.
    #[error("store error: {0}")]
    Store(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("authorization error: {0}")]
    Auth(#[from] AuthError),
}

impl EngineError {
    /// Creates a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Returns true for errors confined to one feed.
    pub fn is_feed_error(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Parse(_))
    }
}

impl From<FeedError> for EngineError {
    fn from(err: FeedError) -> Self {
        if err.is_parse() {
            Self::Parse(err)
        } else {
            Self::Fetch(err)
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}
