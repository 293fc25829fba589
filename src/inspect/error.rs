//! Inspection errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for inspection operations.
pub type InspectResult<T> = Result<T, InspectError>;

/// Errors surfaced by the inspection engine.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The token names no commit, or is not a valid revision at all.
    #[error("invalid reference: {token}")]
    InvalidReference { token: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl InspectError {
    pub(crate) fn invalid_reference(token: impl Into<String>) -> Self {
        InspectError::InvalidReference { token: token.into() }
    }

    /// Check if the caller handed in a token that names nothing.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, InspectError::InvalidReference { .. })
    }

    /// Check if the object store is damaged. These are never retried.
    pub fn is_corruption(&self) -> bool {
        matches!(self, InspectError::Storage(e) if e.is_corruption())
    }
}

impl From<crate::storage::InvalidPathError> for InspectError {
    fn from(err: crate::storage::InvalidPathError) -> Self {
        InspectError::Storage(StorageError::InvalidPath(err))
    }
}
