//! Error types for the mood pipeline.

use thiserror::Error;

/// Result type for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while processing a frame.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The landmark provider returned a set missing a required index.
    /// This is a collaborator contract violation, not a "no face" outcome.
    #[error("Landmark index {0} missing from provider output")]
    MissingLandmark(usize),

    #[error("Landmark provider failed: {0}")]
    Provider(String),
}

impl EngineError {
    /// Create a provider failure error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}
