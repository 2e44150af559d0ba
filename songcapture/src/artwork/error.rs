//! Artwork resolution errors.

use thiserror::Error;

use crate::provider::ProviderError;

/// Why an artwork locator could not be resolved.
///
/// Cloneable so every caller coalesced onto one fetch receives the same
/// failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid artwork locator: {0}")]
    InvalidKey(String),

    #[error("Failed to decode artwork: {0}")]
    DecodeFailure(String),

    #[error("Artwork transport error: {0}")]
    Transport(#[from] ProviderError),

    #[error("Artwork read failed: {0}")]
    Io(String),

    #[error("Artwork request cancelled")]
    Cancelled,

    #[error("Artwork task failed: {0}")]
    TaskFailed(String),
}

impl ResolveError {
    /// True for failures that retrying the same locator cannot fix.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidKey(_) | ResolveError::DecodeFailure(_)
        )
    }
}
