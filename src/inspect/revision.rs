//! Revision tokens and snapshot resolution.
//!
//! A token either names a commit (anything the revision grammar accepts)
//! or the working state, which has no commit behind it. Resolution turns a
//! token into something that can be read from: a commit's tree or the live
//! working directory.

use std::fmt;

use git2::Repository;
use tracing::debug;

use crate::inspect::error::{InspectError, InspectResult};
use crate::storage::{
    decode_text, get_commit, CommitId, CommitInfo, RefManager, RepoPath, Snapshot, StorageError,
    StorageResult, TreeHandle, TreeId, WorkingDirectory,
};

/// A caller-supplied version name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevisionToken {
    /// The uncommitted state of the working directory.
    WorkingState,
    /// A revision string, passed verbatim to resolution.
    Revision(String),
}

impl RevisionToken {
    /// Parse a raw token. `working_state_token` is the literal naming the
    /// working state; an empty token means `HEAD`.
    /// Anything else passes through verbatim, whitespace included.
    pub fn parse(token: &str, working_state_token: &str) -> Self {
        if token == working_state_token {
            RevisionToken::WorkingState
        } else if token.is_empty() {
            RevisionToken::head()
        } else {
            RevisionToken::Revision(token.to_string())
        }
    }

    pub fn head() -> Self {
        RevisionToken::Revision("HEAD".to_string())
    }

    pub fn is_working_state(&self) -> bool {
        matches!(self, RevisionToken::WorkingState)
    }

    /// Check if this is the literal `HEAD`.
    pub fn is_head(&self) -> bool {
        matches!(self, RevisionToken::Revision(spec) if spec == "HEAD")
    }
}

impl fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionToken::WorkingState => write!(f, "<working state>"),
            RevisionToken::Revision(spec) => write!(f, "{}", spec),
        }
    }
}

/// Whether a snapshot comes from history or from the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Historical,
    WorkingState,
}

/// Where a resolved snapshot reads its files from.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Tree { commit: CommitId, tree: TreeId },
    WorkingDirectory(WorkingDirectory),
}

/// A token resolved for reading.
#[derive(Debug, Clone)]
pub struct ResolvedSnapshot {
    pub source: SnapshotSource,
    pub kind: SourceKind,
}

impl ResolvedSnapshot {
    fn historical(info: &CommitInfo) -> Self {
        Self {
            source: SnapshotSource::Tree {
                commit: info.id,
                tree: info.tree_id,
            },
            kind: SourceKind::Historical,
        }
    }

    fn working(workdir: WorkingDirectory) -> Self {
        Self {
            source: SnapshotSource::WorkingDirectory(workdir),
            kind: SourceKind::WorkingState,
        }
    }

    /// The commit behind a historical snapshot.
    pub fn commit(&self) -> Option<CommitId> {
        match &self.source {
            SnapshotSource::Tree { commit, .. } => Some(*commit),
            SnapshotSource::WorkingDirectory(_) => None,
        }
    }

    /// Read the bytes at a path, `None` when there is no file there.
    pub fn read(&self, repo: &Repository, path: &RepoPath) -> StorageResult<Option<Vec<u8>>> {
        match &self.source {
            SnapshotSource::Tree { tree, .. } => TreeHandle::find(repo, *tree)?.fetch_path(repo, path),
            SnapshotSource::WorkingDirectory(workdir) => workdir.read_file(path),
        }
    }

    /// Read a file as text; a missing file reads as empty.
    pub fn read_text(&self, repo: &Repository, path: &RepoPath) -> StorageResult<String> {
        Ok(self
            .read(repo, path)?
            .map(|bytes| decode_text(&bytes))
            .unwrap_or_default())
    }

    /// Expand into a full snapshot.
    ///
    /// `tracked` only matters for the working state: it is the snapshot the
    /// working directory is layered over.
    pub fn enumerate(
        &self,
        repo: &Repository,
        tracked: Option<&Snapshot>,
        include_untracked: bool,
    ) -> StorageResult<Snapshot> {
        match &self.source {
            SnapshotSource::Tree { tree, .. } => TreeHandle::find(repo, *tree)?.enumerate(),
            SnapshotSource::WorkingDirectory(workdir) => {
                let empty = Snapshot::new();
                workdir.enumerate(repo, tracked.unwrap_or(&empty), include_untracked)
            }
        }
    }
}

/// Resolves tokens against one open repository handle.
pub struct SnapshotResolver<'repo> {
    repo: &'repo Repository,
}

impl<'repo> SnapshotResolver<'repo> {
    pub fn new(repo: &'repo Repository) -> Self {
        Self { repo }
    }

    /// Resolve a revision string to a commit, failing with
    /// `InvalidReference` when it names nothing or is malformed.
    pub fn resolve_commit(&self, spec: &str) -> InspectResult<CommitId> {
        match RefManager::resolve(self.repo, spec) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(InspectError::invalid_reference(spec)),
            Err(StorageError::InvalidRevision { spec, reason }) => {
                debug!(spec = %spec, reason = %reason, "rejected revision");
                Err(InspectError::invalid_reference(spec))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a token for reading.
    pub fn resolve_for_read(&self, token: &RevisionToken) -> InspectResult<ResolvedSnapshot> {
        match token {
            RevisionToken::WorkingState => Ok(ResolvedSnapshot::working(WorkingDirectory::of(self.repo)?)),
            RevisionToken::Revision(spec) => {
                let id = self.resolve_commit(spec)?;
                let info = get_commit(self.repo, id)?;
                Ok(ResolvedSnapshot::historical(&info))
            }
        }
    }

    /// The token to diff a token against.
    ///
    /// The working state diffs against `HEAD`, a commit against its first
    /// parent. A root commit has nothing to diff against.
    pub fn parent_of(&self, token: &RevisionToken) -> InspectResult<Option<RevisionToken>> {
        match token {
            RevisionToken::WorkingState => Ok(Some(RevisionToken::head())),
            RevisionToken::Revision(spec) => {
                let id = self.resolve_commit(spec)?;
                let info = get_commit(self.repo, id)?;
                Ok(info
                    .first_parent()
                    .map(|parent| RevisionToken::Revision(parent.to_string())))
            }
        }
    }

    /// Resolve the parent of a token for reading.
    ///
    /// `None` for a root commit, and for the working state of a repository
    /// without commits. A parent id with no commit behind it is corruption,
    /// not an absent parent.
    pub fn parent_snapshot(&self, token: &RevisionToken) -> InspectResult<Option<ResolvedSnapshot>> {
        let parent = match token {
            RevisionToken::WorkingState => RefManager::head_commit(self.repo)?,
            RevisionToken::Revision(spec) => {
                let id = self.resolve_commit(spec)?;
                get_commit(self.repo, id)?.first_parent()
            }
        };

        match parent {
            Some(id) => Ok(Some(ResolvedSnapshot::historical(&get_commit(self.repo, id)?))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{commit_files, init_repo, write_file};

    #[test]
    fn test_parse() {
        assert_eq!(RevisionToken::parse("unstaged", "unstaged"), RevisionToken::WorkingState);
        assert_eq!(
            RevisionToken::parse(" unstaged ", "unstaged"),
            RevisionToken::Revision(" unstaged ".to_string())
        );
        assert_eq!(RevisionToken::parse(" ", "unstaged"), RevisionToken::Revision(" ".to_string()));
        assert_eq!(RevisionToken::parse("", "unstaged"), RevisionToken::head());
        assert_eq!(
            RevisionToken::parse("main~2", "unstaged"),
            RevisionToken::Revision("main~2".to_string())
        );
        // a custom sentinel frees up the default literal
        assert_eq!(
            RevisionToken::parse("unstaged", "wip"),
            RevisionToken::Revision("unstaged".to_string())
        );
        assert!(RevisionToken::head().is_head());
        assert!(!RevisionToken::WorkingState.is_head());
    }

    #[test]
    fn test_resolve_historical() {
        let (_dir, repo) = init_repo();
        let c1 = commit_files(&repo, &[("a.txt", "one\n")], "first");
        let resolver = SnapshotResolver::new(&repo);

        let resolved = resolver.resolve_for_read(&RevisionToken::head()).unwrap();
        assert_eq!(resolved.kind, SourceKind::Historical);
        assert_eq!(resolved.commit(), Some(c1));

        let path = RepoPath::new("a.txt").unwrap();
        assert_eq!(resolved.read_text(&repo, &path).unwrap(), "one\n");
        let missing = RepoPath::new("b.txt").unwrap();
        assert_eq!(resolved.read_text(&repo, &missing).unwrap(), "");
    }

    #[test]
    fn test_resolve_working_state() {
        let (dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "one\n")], "first");
        write_file(dir.path(), "a.txt", "edited\n");
        let resolver = SnapshotResolver::new(&repo);

        let resolved = resolver.resolve_for_read(&RevisionToken::WorkingState).unwrap();
        assert_eq!(resolved.kind, SourceKind::WorkingState);
        assert_eq!(resolved.commit(), None);

        let path = RepoPath::new("a.txt").unwrap();
        assert_eq!(resolved.read_text(&repo, &path).unwrap(), "edited\n");
    }

    #[test]
    fn test_unknown_and_malformed_tokens() {
        let (_dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "one\n")], "first");
        let resolver = SnapshotResolver::new(&repo);

        let err = resolver
            .resolve_for_read(&RevisionToken::Revision("no-such-branch".to_string()))
            .unwrap_err();
        assert!(matches!(err, InspectError::InvalidReference { ref token } if token == "no-such-branch"));

        let err = resolver
            .resolve_for_read(&RevisionToken::Revision("HEAD^{tree}".to_string()))
            .unwrap_err();
        assert!(err.is_invalid_reference());
    }

    #[test]
    fn test_head_of_empty_repository_is_invalid() {
        let (_dir, repo) = init_repo();
        let resolver = SnapshotResolver::new(&repo);

        assert!(resolver
            .resolve_for_read(&RevisionToken::head())
            .unwrap_err()
            .is_invalid_reference());
        assert!(resolver.parent_snapshot(&RevisionToken::WorkingState).unwrap().is_none());
    }

    #[test]
    fn test_parent_of() {
        let (_dir, repo) = init_repo();
        let c1 = commit_files(&repo, &[("a.txt", "one\n")], "first");
        let c2 = commit_files(&repo, &[("a.txt", "two\n")], "second");
        let resolver = SnapshotResolver::new(&repo);

        assert_eq!(
            resolver.parent_of(&RevisionToken::WorkingState).unwrap(),
            Some(RevisionToken::head())
        );
        assert_eq!(
            resolver
                .parent_of(&RevisionToken::Revision(c2.to_string()))
                .unwrap(),
            Some(RevisionToken::Revision(c1.to_string()))
        );
        assert_eq!(
            resolver
                .parent_of(&RevisionToken::Revision(c1.to_string()))
                .unwrap(),
            None
        );

        let parent = resolver
            .parent_snapshot(&RevisionToken::WorkingState)
            .unwrap()
            .unwrap();
        assert_eq!(parent.commit(), Some(c2));
        let parent = resolver.parent_snapshot(&RevisionToken::head()).unwrap().unwrap();
        assert_eq!(parent.commit(), Some(c1));
    }

    #[test]
    fn test_enumerate_working_state_over_head() {
        let (dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "one\n")], "first");
        write_file(dir.path(), "b.txt", "new\n");
        let resolver = SnapshotResolver::new(&repo);

        let head = resolver.resolve_for_read(&RevisionToken::head()).unwrap();
        let tracked = head.enumerate(&repo, None, true).unwrap();

        let working = resolver.resolve_for_read(&RevisionToken::WorkingState).unwrap();
        let snapshot = working.enumerate(&repo, Some(&tracked), true).unwrap();
        assert_eq!(snapshot.paths(), vec!["a.txt", "b.txt"]);
        assert_eq!(snapshot.get("a.txt"), tracked.get("a.txt"));
    }
}
