//! Inspector - high-level interface for reading repository history.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::inspect::config::InspectorConfig;
use crate::inspect::diff::{diff, diff_changes};
use crate::inspect::error::{InspectError, InspectResult};
use crate::inspect::history::{self, HistoryEntry};
use crate::inspect::revision::{RevisionToken, SnapshotResolver, SourceKind};
use crate::inspect::window::{window, FileVersions};
use crate::storage::{Change, GitRepository, RepoPath, Snapshot, WorkingDirectory};

/// The inspection engine.
///
/// Holds no repository handle: each operation opens one for its own
/// duration. Clones share the configuration and can be used from any
/// thread.
#[derive(Clone)]
pub struct Inspector {
    store: GitRepository,
    config: Arc<InspectorConfig>,
}

impl Inspector {
    /// Open the repository at the given path with default settings.
    pub fn open(path: impl AsRef<Path>) -> InspectResult<Self> {
        Self::open_with_config(InspectorConfig::new(path.as_ref()))
    }

    /// Open a repository with custom configuration.
    pub fn open_with_config(config: InspectorConfig) -> InspectResult<Self> {
        config.validate()?;
        let store = GitRepository::open(&config.repo_path)?;
        debug!(path = %config.repo_path.display(), "opened inspector");

        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Parse a raw token using the configured working-state literal.
    pub fn parse_token(&self, raw: &str) -> RevisionToken {
        RevisionToken::parse(raw, &self.config.working_state_token)
    }

    /// Get the text of a file at a version.
    ///
    /// The working state and `HEAD` read the live working file. Any other
    /// token reads the committed blob. A path with no file, and a token that
    /// names nothing, both read as empty text.
    pub fn get_file_content(&self, token: &RevisionToken, path: &str) -> InspectResult<String> {
        let path = RepoPath::new(path)?;

        self.store.with_repo(|repo| {
            let working = RevisionToken::WorkingState;
            let token = if token.is_head() {
                &working
            } else {
                token
            };

            let snapshot = match SnapshotResolver::new(repo).resolve_for_read(token) {
                Ok(snapshot) => snapshot,
                Err(InspectError::InvalidReference { token }) => {
                    warn!(token = %token, path = %path, "unknown revision, returning empty content");
                    return Ok(String::new());
                }
                Err(e) => return Err(e),
            };

            Ok(snapshot.read_text(repo, &path)?)
        })
    }

    /// Get the before/after view of a file at a version.
    ///
    /// For a commit, the first parent's content (empty for a root commit)
    /// against the commit's, windowed around the differences. For the
    /// working state, `HEAD` against the live file, in full.
    pub fn get_file_versions(&self, token: &RevisionToken, path: &str) -> InspectResult<FileVersions> {
        let path = RepoPath::new(path)?;
        let radius = self.config.context_radius;

        self.store.with_repo(|repo| {
            let resolver = SnapshotResolver::new(repo);
            let target = resolver.resolve_for_read(token)?;
            let modified = target.read_text(repo, &path)?;
            let original = match resolver.parent_snapshot(token)? {
                Some(parent) => parent.read_text(repo, &path)?,
                None => String::new(),
            };

            debug!(token = %token, path = %path, "loaded file versions");
            Ok(match target.kind {
                SourceKind::WorkingState => FileVersions::new(original, modified),
                SourceKind::Historical => window(&original, &modified, radius),
            })
        })
    }

    /// Get the paths that differ between a version and its parent.
    pub fn get_changed_files(&self, token: &RevisionToken) -> InspectResult<Vec<String>> {
        let (base, target) = self.snapshot_pair(token)?;
        Ok(diff(base.as_ref(), &target))
    }

    /// Like `get_changed_files`, with each path classified as added,
    /// removed or modified.
    pub fn get_changes(&self, token: &RevisionToken) -> InspectResult<Vec<Change>> {
        let (base, target) = self.snapshot_pair(token)?;
        Ok(diff_changes(base.as_ref(), &target))
    }

    /// List the working state followed by the commits reachable from HEAD.
    pub fn list_history(&self) -> InspectResult<Vec<HistoryEntry>> {
        self.store.with_repo(|repo| history::list_history(repo, &self.config))
    }

    /// Replace a file's content in the working directory.
    pub fn write_working_file(&self, path: &str, content: &str) -> InspectResult<()> {
        let path = RepoPath::new(path)?;
        self.store.with_repo(|repo| {
            WorkingDirectory::of(repo)?.write_file(&path, content)?;
            Ok(())
        })
    }

    fn snapshot_pair(&self, token: &RevisionToken) -> InspectResult<(Option<Snapshot>, Snapshot)> {
        let include_untracked = self.config.include_untracked;

        self.store.with_repo(|repo| {
            let resolver = SnapshotResolver::new(repo);
            let target = resolver.resolve_for_read(token)?;
            let base = match resolver.parent_snapshot(token)? {
                Some(parent) => Some(parent.enumerate(repo, None, include_untracked)?),
                None => None,
            };
            let target = target.enumerate(repo, base.as_ref(), include_untracked)?;

            debug!(
                token = %token,
                base_files = base.as_ref().map_or(0, Snapshot::len),
                target_files = target.len(),
                "expanded snapshots"
            );
            Ok((base, target))
        })
    }
}
