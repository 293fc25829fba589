//! Storage layer error types
//!
//! All errors that can occur while reading the object store or the working
//! directory are defined here. We use `thiserror` for ergonomic error
//! definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::InvalidPathError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// the revision string is malformed, ambiguous, or names a non-commit
    #[error("invalid revision '{spec}': {reason}")]
    InvalidRevision { spec: String, reason: String },

    /// an id we were handed (or read from another object) has no object
    /// behind it. This means the store is corrupt, not that the caller
    /// asked for something that doesn't exist.
    #[error("missing {kind} object {id}")]
    MissingObject { kind: &'static str, id: String },

    /// invalid repository-relative path
    #[error("invalid path: {0}")]
    InvalidPath(#[from] InvalidPathError),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// error while walking the working directory
    #[error("working directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// repo is not initialized
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// repo has no working directory
    #[error("repository is bare: {0}")]
    BareRepository(PathBuf),
}

impl StorageError {
    /// check if this error indicates a damaged object store
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::MissingObject { .. })
    }

    /// map a git2 lookup failure for `id`, separating a missing object from
    /// every other kind of failure
    pub(crate) fn lookup(kind: &'static str, id: impl ToString, err: git2::Error) -> Self {
        if err.code() == git2::ErrorCode::NotFound {
            StorageError::MissingObject {
                kind,
                id: id.to_string(),
            }
        } else {
            StorageError::Git(err)
        }
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
