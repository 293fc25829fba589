//!  tree operations and snapshots.
//!
//! in Git, a tree is a directory. A snapshot is what you get when you
//! expand a root tree all the way down: every file path mapped to the blob
//! holding its content at that point in history.
//!
//! Snapshots are computed on demand and never stored.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;

use git2::{ErrorCode, ObjectType, Repository, Tree, TreeWalkMode, TreeWalkResult};
use tracing::warn;

use crate::storage::blob;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{BlobId, RepoPath, TreeId};

/// name of the store's metadata directory, never part of a snapshot
pub(crate) const GIT_DIR: &str = ".git";

/// A read only handle to a git tree at a specific commit
///
/// think of it as a snapshot that hasn't been expanded yet - it won't
/// change even if new commits are made.
pub struct TreeHandle<'repo> {
    tree: Tree<'repo>,
}

impl<'repo> TreeHandle<'repo> {
    /// create a TreeHandle from a git2::Tree
    pub(crate) fn new(tree: Tree<'repo>) -> Self {
        Self { tree }
    }

    /// look up a tree by id; a missing tree is store corruption
    pub fn find(repo: &'repo Repository, id: TreeId) -> StorageResult<Self> {
        let tree = repo
            .find_tree(id.raw())
            .map_err(|e| StorageError::lookup("tree", id, e))?;
        Ok(Self::new(tree))
    }

    /// get the tree ID
    pub fn id(&self) -> TreeId {
        TreeId::new(self.tree.id())
    }

    /// expand the tree recursively into a path -> blob mapping
    ///
    /// submodule entries are not files and are left out, as is a `.git`
    /// entry at the root. Entries whose names are not UTF-8 are skipped
    /// (directories with their whole subtree) with a warning.
    pub fn enumerate(&self) -> StorageResult<Snapshot> {
        let mut snapshot = Snapshot::default();

        self.tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            // a lossy path could never be looked up again
            let name = match entry.name() {
                Some(name) => name,
                None => {
                    warn!(
                        root,
                        name = %String::from_utf8_lossy(entry.name_bytes()),
                        "skipping tree entry with a non UTF-8 name"
                    );
                    return TreeWalkResult::Skip;
                }
            };
            if root.is_empty() && name == GIT_DIR {
                return TreeWalkResult::Skip;
            }

            if entry.kind() == Some(ObjectType::Blob) {
                snapshot.insert(format!("{}{}", root, name), BlobId::new(entry.id()));
            }
            TreeWalkResult::Ok
        })?;

        Ok(snapshot)
    }

    /// get the blob ID at a path without expanding the whole tree
    ///
    /// returns None when the path doesn't exist or names a directory
    pub fn blob_id_at(&self, path: &RepoPath) -> StorageResult<Option<BlobId>> {
        let entry = match self.tree.get_path(path.as_path()) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Git(e)),
        };

        match entry.kind() {
            Some(ObjectType::Blob) => Ok(Some(BlobId::new(entry.id()))),
            _ => Ok(None),
        }
    }

    /// fetch the bytes stored at a path
    pub fn fetch_path(&self, repo: &Repository, path: &RepoPath) -> StorageResult<Option<Vec<u8>>> {
        match self.blob_id_at(path)? {
            Some(blob_id) => Ok(Some(blob::read_blob(repo, blob_id)?)),
            None => Ok(None),
        }
    }
}

/// A materialized view of a tree: every file path mapped to its blob.
///
/// Paths are repository-relative and forward-slash joined. Iteration is
/// in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<String, BlobId>,
}

impl Snapshot {
    /// an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: String, blob_id: BlobId) {
        self.entries.insert(path, blob_id);
    }

    /// the blob at a path, if present
    pub fn get(&self, path: &str) -> Option<BlobId> {
        self.entries.get(path).copied()
    }

    /// check if a file exists at a path
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// check if any file lives below the directory `prefix` (which must end
    /// with a slash)
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|(path, _)| path.starts_with(prefix))
    }

    /// number of files in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// iterate over (path, blob) pairs in path order
    pub fn iter(&self) -> SnapshotIter<'_> {
        SnapshotIter {
            inner: self.entries.iter(),
        }
    }

    /// all paths, in path order
    pub fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// iterator over the files of a snapshot
pub struct SnapshotIter<'a> {
    inner: btree_map::Iter<'a, String, BlobId>,
}

impl<'a> Iterator for SnapshotIter<'a> {
    type Item = (&'a str, BlobId);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(path, id)| (path.as_str(), *id))
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a str, BlobId);
    type IntoIter = SnapshotIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
