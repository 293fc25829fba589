//! core type-safe wrappers around git primitives for the storage layer.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::Oid;
use serde::{Deserialize, Serialize};

/// This makes sure we don't accidentally pass a blob ID where a commit ID
/// is expected. The inner Oid is only accessible within the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitId(pub(crate) Oid);

impl CommitId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    /// raw Oid (for internal use only)
    pub(crate) fn raw(&self) -> Oid {
        self.0
    }

    /// parse CommitId from a full hex string
    pub fn from_hex(hex: &str) -> Result<Self, git2::Error> {
        Oid::from_str(hex).map(CommitId)
    }

    /// short form of the commit ID
    pub fn short(&self) -> String {
        self.0.to_string()[..7].to_string()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Git blob identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobId(pub(crate) Oid);

impl BlobId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    pub(crate) fn raw(&self) -> Oid {
        self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Git tree identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub(crate) Oid);

impl TreeId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    pub(crate) fn raw(&self) -> Oid {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated repository-relative path.
///
/// Paths are what callers hand us from the outside, so they are checked
/// before they ever touch a tree lookup or the working directory.
///
/// Valid paths:
/// - non-empty, forward-slash separated
/// - no leading or trailing slash, no empty segments
/// - no `.` or `..` segments, no backslashes, no NUL bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoPath(String);

impl RepoPath {
    /// create a new RepoPath, validating the input
    pub fn new(path: impl Into<String>) -> Result<Self, InvalidPathError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), InvalidPathError> {
        if path.is_empty() {
            return Err(InvalidPathError::Empty);
        }

        if path.starts_with('/') {
            return Err(InvalidPathError::Absolute(path.to_string()));
        }

        if let Some(position) = path.find(['\\', '\0']) {
            let char = path[position..].chars().next().unwrap_or('\0');
            return Err(InvalidPathError::InvalidCharacter { char, position });
        }

        for segment in path.split('/') {
            match segment {
                "" => return Err(InvalidPathError::EmptySegment(path.to_string())),
                "." | ".." => return Err(InvalidPathError::Traversal(path.to_string())),
                _ => {}
            }
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// the path as a relative filesystem path
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// join onto a working directory root
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.as_path())
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error type for invalid repository paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidPathError {
    Empty,
    Absolute(String),
    EmptySegment(String),
    Traversal(String),
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for InvalidPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "path cannot be empty"),
            Self::Absolute(path) => write!(f, "path must be relative: '{}'", path),
            Self::EmptySegment(path) => write!(f, "path has an empty segment: '{}'", path),
            Self::Traversal(path) => write!(f, "path may not contain '.' or '..': '{}'", path),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
        }
    }
}

impl std::error::Error for InvalidPathError {}

/// represents a change in a diff between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub path: String,
    pub status: ChangeStatus,
}

/// the type of change in a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ChangeStatus::Added => "A",
            ChangeStatus::Removed => "D",
            ChangeStatus::Modified => "M",
        };
        write!(f, "{}", tag)
    }
}
