//! storage layer for gitscope
//!
//! this module is a read-mostly abstraction over git. The inspection engine
//! uses this API and never touches git2 directly.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GitRepository                           │
//! │   (scoped handles: resolve, commits, snapshots, blobs)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌──────────────┬──────┴───────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐
//!  │   refs    │  │  commit   │  │   tree    │  │  workdir  │
//!  │ (resolve) │  │ (history) │  │(snapshots)│  │(live files)│
//!  └───────────┘  └───────────┘  └───────────┘  └───────────┘
//!                                      │
//!                                      ▼
//!                                ┌───────────┐
//!                                │   blob    │
//!                                │  (bytes)  │
//!                                └───────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use gitscope::storage::{GitRepository, RepoPath};
//!
//! let repo = GitRepository::open("./project")?;
//! let head = repo.head()?.expect("at least one commit");
//!
//! let snapshot = repo.snapshot_at(head)?;
//! let readme = repo.fetch_path(head, &RepoPath::new("README.md")?)?;
//! ```

mod blob;
mod commit;
mod error;
mod refs;
mod repository;
mod tree;
mod types;
mod workdir;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public API
pub use blob::{decode_text, hash_bytes};
pub use commit::{CommitInfo, HistoryIterator};
pub use error::{StorageError, StorageResult};
pub use repository::GitRepository;
pub use tree::{Snapshot, SnapshotIter, TreeHandle};
pub use types::{BlobId, Change, ChangeStatus, CommitId, InvalidPathError, RepoPath, TreeId};
pub use workdir::WorkingDirectory;

// Re-export for internal use by other modules
pub(crate) use commit::get_commit;
pub(crate) use refs::RefManager;
