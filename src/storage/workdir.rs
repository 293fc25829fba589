//!  Working directory access.
//!
//! The working state has no commit behind it: it is whatever is on disk
//! right now. This module reads and writes single files there and can
//! expand the whole directory into a `Snapshot`, hashing files the way git
//! would so the result compares directly against tree snapshots.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::storage::blob;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::tree::{Snapshot, GIT_DIR};
use crate::storage::types::{BlobId, InvalidPathError, RepoPath};

/// The live files of a repository.
#[derive(Debug, Clone)]
pub struct WorkingDirectory {
    root: PathBuf,
}

impl WorkingDirectory {
    /// create a WorkingDirectory rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// the working directory of an open repository
    pub fn of(repo: &Repository) -> StorageResult<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| StorageError::BareRepository(repo.path().to_path_buf()))?;
        Ok(Self::new(root))
    }

    /// get the root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// read a file's bytes, or None if there is no file at the path
    ///
    /// a symlink reads as its target path, the bytes git stores for it
    pub fn read_file(&self, path: &RepoPath) -> StorageResult<Option<Vec<u8>>> {
        let full = path.under(&self.root);
        let metadata = match fs::symlink_metadata(&full) {
            Ok(metadata) => metadata,
            Err(e) if is_absent(&e) => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&full)?;
            return Ok(Some(target.to_string_lossy().into_owned().into_bytes()));
        }
        if metadata.is_dir() {
            return Ok(None);
        }
        Ok(Some(fs::read(&full)?))
    }

    /// replace a file's content, creating parent directories as needed
    ///
    /// the write never follows a symlink: a path through a linked
    /// directory, or naming a link itself, is rejected
    pub fn write_file(&self, path: &RepoPath, content: &str) -> StorageResult<()> {
        if path.as_path().starts_with(GIT_DIR) {
            return Err(InvalidPathError::Traversal(path.to_string()).into());
        }

        let mut current = self.root.clone();
        for component in path.as_path().components() {
            current.push(component);
            match fs::symlink_metadata(&current) {
                Ok(metadata) if metadata.file_type().is_symlink() => {
                    return Err(InvalidPathError::Traversal(path.to_string()).into());
                }
                Ok(_) => {}
                // nothing on disk below here, so nothing left to follow
                Err(e) if e.kind() == io::ErrorKind::NotFound => break,
                Err(e) => return Err(StorageError::Io(e)),
            }
        }

        let full = path.under(&self.root);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        debug!(path = %path, bytes = content.len(), "wrote working file");
        Ok(())
    }

    /// expand the working directory into a snapshot
    ///
    /// `tracked` is the snapshot the working state is layered over (HEAD).
    /// Files it tracks are always included. Other files are included only
    /// when `include_untracked` is set and git doesn't ignore them. The
    /// root `.git` directory and nested repositories are skipped.
    pub fn enumerate(
        &self,
        repo: &Repository,
        tracked: &Snapshot,
        include_untracked: bool,
    ) -> StorageResult<Snapshot> {
        let mut snapshot = Snapshot::new();
        let mut walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry?;
            if entry.depth() == 0 {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let file_type = entry.file_type();
            let repo_path = match to_repo_string(relative) {
                Some(repo_path) => repo_path,
                None => {
                    warn!(path = %relative.display(), "skipping working file with a non UTF-8 path");
                    if file_type.is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
            };

            if file_type.is_dir() {
                let skip = (entry.depth() == 1 && entry.file_name() == GIT_DIR)
                    || entry.path().join(GIT_DIR).exists()
                    || (!tracked.has_prefix(&format!("{}/", repo_path))
                        && !self.wants_untracked(repo, relative, include_untracked)?);
                if skip {
                    walker.skip_current_dir();
                }
                continue;
            }

            if !tracked.contains(&repo_path) && !self.wants_untracked(repo, relative, include_untracked)? {
                continue;
            }

            let blob_id = if file_type.is_symlink() {
                // git stores a symlink as a blob holding its target path
                let target = fs::read_link(entry.path())?;
                blob::hash_bytes(target.to_string_lossy().as_bytes())?
            } else {
                BlobId::new(Oid::hash_file(git2::ObjectType::Blob, entry.path())?)
            };
            snapshot.insert(repo_path, blob_id);
        }

        debug!(root = %self.root.display(), files = snapshot.len(), "enumerated working directory");
        Ok(snapshot)
    }

    fn wants_untracked(&self, repo: &Repository, relative: &Path, include_untracked: bool) -> StorageResult<bool> {
        if !include_untracked {
            return Ok(false);
        }
        Ok(!repo.status_should_ignore(relative)?)
    }
}

/// join path components with forward slashes, None if any is not UTF-8
fn to_repo_string(path: &Path) -> Option<String> {
    path.components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("/"))
}

// a missing file, or a path running through a regular file
fn is_absent(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
}
