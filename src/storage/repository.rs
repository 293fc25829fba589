//!   Core Git repository wrapper.
//!
//!  This is the object store accessor the rest of the crate goes through.
//!  It never holds a `git2::Repository` between calls: every operation
//!  opens its own handle through `with_repo`, and the handle is dropped when
//!  the closure returns, on the error path as much as the success path.
//!  Readers therefore always see the store's current state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Repository;
use tracing::debug;

use crate::storage::blob;
use crate::storage::commit::{self, CommitInfo};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::refs::RefManager;
use crate::storage::tree::{Snapshot, TreeHandle};
use crate::storage::types::{BlobId, CommitId, RepoPath, TreeId};

/// The main Git repository wrapper.
///
/// Cheap to clone and safe to share across threads: it only carries the
/// location of the repository, never an open handle.
#[derive(Clone)]
pub struct GitRepository {
    inner: Arc<GitRepositoryInner>,
}

struct GitRepositoryInner {
    path: PathBuf,
}

impl GitRepository {
    /// Open an existing repository.
    ///
    /// The repository is opened once to check it is there, then released.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| StorageError::NotInitialized(path.to_path_buf()))?;
        if repo.is_bare() {
            return Err(StorageError::BareRepository(path.to_path_buf()));
        }
        drop(repo);

        Ok(Self {
            inner: Arc::new(GitRepositoryInner {
                path: path.to_path_buf(),
            }),
        })
    }

    /// Get the repository path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Execute a function with a freshly opened handle to the repository.
    ///
    /// The handle lives exactly as long as the closure. Callers may use
    /// their own error type as long as storage errors convert into it.
    pub fn with_repo<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Repository) -> Result<T, E>,
        E: From<StorageError>,
    {
        let repo = Repository::open(&self.inner.path)
            .map_err(|_| StorageError::NotInitialized(self.inner.path.clone()))?;
        debug!(path = %self.inner.path.display(), "opened repository handle");
        f(&repo)
    }

    // ==================== Object Store Operations ====================

    /// Resolve a revision string; `None` when it names nothing.
    pub fn resolve(&self, spec: &str) -> StorageResult<Option<CommitId>> {
        self.with_repo(|repo| RefManager::resolve(repo, spec))
    }

    /// Get the current HEAD commit, `None` before the first commit.
    pub fn head(&self) -> StorageResult<Option<CommitId>> {
        self.with_repo(RefManager::head_commit)
    }

    /// Get information about a commit.
    pub fn get_commit(&self, id: CommitId) -> StorageResult<CommitInfo> {
        self.with_repo(|repo| commit::get_commit(repo, id))
    }

    /// Load a blob's bytes.
    pub fn read_blob(&self, id: BlobId) -> StorageResult<Vec<u8>> {
        self.with_repo(|repo| blob::read_blob(repo, id))
    }

    /// Expand a tree into a snapshot.
    pub fn snapshot(&self, tree_id: TreeId) -> StorageResult<Snapshot> {
        self.with_repo(|repo| TreeHandle::find(repo, tree_id)?.enumerate())
    }

    /// Expand the tree of a commit into a snapshot.
    pub fn snapshot_at(&self, commit_id: CommitId) -> StorageResult<Snapshot> {
        self.with_repo(|repo| commit::get_tree_at_commit(repo, commit_id)?.enumerate())
    }

    /// Fetch the bytes at a path in a commit's tree.
    pub fn fetch_path(&self, commit_id: CommitId, path: &RepoPath) -> StorageResult<Option<Vec<u8>>> {
        self.with_repo(|repo| commit::get_tree_at_commit(repo, commit_id)?.fetch_path(repo, path))
    }

    /// Get commit history starting at a commit, newest first.
    pub fn history(&self, from: CommitId, limit: Option<usize>) -> StorageResult<Vec<CommitInfo>> {
        self.with_repo(|repo| {
            let iter = commit::history(repo, from)?;
            match limit {
                Some(n) => iter.take(n).collect(),
                None => iter.collect(),
            }
        })
    }
}
