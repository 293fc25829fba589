//!  Reference and revision resolution.
//!
//!  Callers name versions with anything git's revision grammar accepts:
//!  full or abbreviated ids, `HEAD`, branch names, `main~2` and so on.
//!  This module turns those strings into commit ids.

use git2::{ErrorCode, ObjectType, Repository};
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::CommitId;

/// Resolves references and revision strings.
pub struct RefManager;

impl RefManager {
    /// Resolve a revision string to the commit it names.
    ///
    /// Returns `Ok(None)` when the revision is well formed but names nothing,
    /// including `HEAD` on a repository without commits. Malformed or
    /// ambiguous revisions, and revisions naming a tree or blob, are errors.
    pub fn resolve(repo: &Repository, spec: &str) -> StorageResult<Option<CommitId>> {
        let object = match repo.revparse_single(spec) {
            Ok(object) => object,
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => {
                debug!(spec, "revision not found");
                return Ok(None);
            }
            Err(e) if matches!(e.code(), ErrorCode::InvalidSpec | ErrorCode::Ambiguous) => {
                return Err(StorageError::InvalidRevision {
                    spec: spec.to_string(),
                    reason: e.message().to_string(),
                });
            }
            Err(e) => return Err(StorageError::Git(e)),
        };

        // annotated tags peel through to their commit
        let commit = object.peel(ObjectType::Commit).map_err(|_| StorageError::InvalidRevision {
            spec: spec.to_string(),
            reason: format!("names a {} rather than a commit", kind_name(object.kind())),
        })?;

        let id = CommitId::new(commit.id());
        debug!(spec, commit = %id.short(), "resolved revision");
        Ok(Some(id))
    }

    /// Get the commit HEAD points at, or `None` for an unborn HEAD.
    pub fn head_commit(repo: &Repository) -> StorageResult<Option<CommitId>> {
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(StorageError::Git(e)),
        };

        let commit = head.peel_to_commit()?;
        Ok(Some(CommitId::new(commit.id())))
    }
}

fn kind_name(kind: Option<ObjectType>) -> &'static str {
    match kind {
        Some(ObjectType::Tree) => "tree",
        Some(ObjectType::Blob) => "blob",
        Some(ObjectType::Tag) => "tag",
        Some(ObjectType::Commit) => "commit",
        _ => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{commit_files, init_repo};

    #[test]
    fn test_head_of_empty_repository() {
        let (_dir, repo) = init_repo();
        assert_eq!(RefManager::head_commit(&repo).unwrap(), None);
        assert_eq!(RefManager::resolve(&repo, "HEAD").unwrap(), None);
    }

    #[test]
    fn test_resolve_full_and_abbreviated() {
        let (_dir, repo) = init_repo();
        let c1 = commit_files(&repo, &[("a.txt", "one\n")], "first");

        let full = c1.to_string();
        assert_eq!(RefManager::resolve(&repo, &full).unwrap(), Some(c1));
        assert_eq!(RefManager::resolve(&repo, &full[..10]).unwrap(), Some(c1));
        assert_eq!(RefManager::resolve(&repo, "HEAD").unwrap(), Some(c1));
        assert_eq!(RefManager::head_commit(&repo).unwrap(), Some(c1));
    }

    #[test]
    fn test_resolve_branch_and_ancestry() {
        let (_dir, repo) = init_repo();
        let c1 = commit_files(&repo, &[("a.txt", "one\n")], "first");
        let c2 = commit_files(&repo, &[("a.txt", "two\n")], "second");

        let commit = repo.find_commit(c2.raw()).unwrap();
        repo.branch("feature", &commit, false).unwrap();

        assert_eq!(RefManager::resolve(&repo, "feature").unwrap(), Some(c2));
        assert_eq!(RefManager::resolve(&repo, "HEAD~1").unwrap(), Some(c1));
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let (_dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "one\n")], "first");

        assert_eq!(RefManager::resolve(&repo, "no-such-branch").unwrap(), None);
        assert_eq!(
            RefManager::resolve(&repo, "0123456789abcdef0123456789abcdef01234567").unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_non_commit_is_invalid() {
        let (_dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "one\n")], "first");

        let result = RefManager::resolve(&repo, "HEAD^{tree}");
        assert!(matches!(result, Err(StorageError::InvalidRevision { .. })));
    }
}
