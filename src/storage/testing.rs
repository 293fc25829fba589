//! Repository fixtures shared by the unit tests.

use std::fs;
use std::path::Path;

use git2::{Repository, Signature, Time};
use tempfile::TempDir;

use crate::storage::types::CommitId;

/// Initialize an empty repository with a working directory.
pub(crate) fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Write files into the working directory, stage them and commit on HEAD.
pub(crate) fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> CommitId {
    commit_changes(repo, files, &[], message, None)
}

/// Like `commit_files`, with a fixed commit time in seconds since the epoch.
pub(crate) fn commit_files_at(
    repo: &Repository,
    files: &[(&str, &str)],
    message: &str,
    seconds: i64,
) -> CommitId {
    commit_changes(repo, files, &[], message, Some(seconds))
}

/// Write and remove files, then commit the result on HEAD.
pub(crate) fn commit_changes(
    repo: &Repository,
    writes: &[(&str, &str)],
    removes: &[&str],
    message: &str,
    seconds: Option<i64>,
) -> CommitId {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();

    for (path, content) in writes {
        write_file(&workdir, path, content);
        index.add_path(Path::new(path)).unwrap();
    }
    for path in removes {
        fs::remove_file(workdir.join(path)).unwrap();
        index.remove_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = match seconds {
        Some(seconds) => Signature::new("Test", "test@test.com", &Time::new(seconds, 0)).unwrap(),
        None => Signature::now("Test", "test@test.com").unwrap(),
    };

    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap();
    CommitId::new(oid)
}

/// Create symlinks in the working directory, stage them and commit on HEAD.
#[cfg(unix)]
pub(crate) fn commit_symlinks(repo: &Repository, links: &[(&str, &str)], message: &str) -> CommitId {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for (link, target) in links {
        std::os::unix::fs::symlink(target, workdir.join(link)).unwrap();
        index.add_path(Path::new(link)).unwrap();
    }
    index.write().unwrap();
    commit_changes(repo, &[], &[], message, None)
}

/// Write a file below `root`, creating parent directories.
pub(crate) fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}
