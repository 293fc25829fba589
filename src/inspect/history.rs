//! History listing.

use chrono::{DateTime, Local};
use git2::Repository;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inspect::config::InspectorConfig;
use crate::inspect::diff::diff;
use crate::inspect::error::InspectResult;
use crate::storage::{get_commit, CommitId, CommitInfo, HistoryIterator, RefManager, Snapshot, TreeHandle};

/// One selectable version in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Commit summary, or the working-state label.
    pub label: String,
    /// Token that names this version in the other operations.
    pub token: String,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Paths changed against the first parent; None for the working state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl HistoryEntry {
    /// The synthetic entry for uncommitted changes.
    pub fn working_state(config: &InspectorConfig) -> Self {
        Self {
            label: config.working_state_label.clone(),
            token: config.working_state_token.clone(),
            timestamp: Local::now(),
            author: None,
            message: None,
            files: None,
        }
    }

    pub fn from_commit(info: &CommitInfo, files: Vec<String>) -> Self {
        Self {
            label: info.summary().to_string(),
            token: info.id.to_string(),
            timestamp: info.local_time(),
            author: Some(info.author_name.clone()),
            message: Some(info.message.clone()),
            files: Some(files),
        }
    }

    /// Check if this entry names the working state rather than a commit.
    pub fn is_working_state(&self) -> bool {
        self.author.is_none() && self.message.is_none()
    }
}

/// List the working state followed by every commit reachable from HEAD,
/// newest first.
pub fn list_history(repo: &Repository, config: &InspectorConfig) -> InspectResult<Vec<HistoryEntry>> {
    let mut entries = vec![HistoryEntry::working_state(config)];

    let head = match RefManager::head_commit(repo)? {
        Some(head) => head,
        None => {
            debug!("unborn HEAD, history holds only the working state");
            return Ok(entries);
        }
    };

    let mut commits = HistoryIterator::new(repo, head)?;
    if config.first_parent_history {
        commits = commits.first_parent_only()?;
    }
    let mut snapshots = SnapshotCache::default();
    for info in commits {
        let info = info?;
        let files = snapshots.changed_files(repo, &info)?;
        entries.push(HistoryEntry::from_commit(&info, files));
    }

    debug!(commits = entries.len() - 1, "listed history");
    Ok(entries)
}

/// Holds the last parent snapshot expanded.
///
/// On a linear stretch the walk visits a commit and then its parent, so the
/// parent's snapshot becomes the next commit's own.
#[derive(Default)]
struct SnapshotCache {
    slot: Option<(CommitId, Snapshot)>,
}

impl SnapshotCache {
    fn changed_files(&mut self, repo: &Repository, info: &CommitInfo) -> InspectResult<Vec<String>> {
        let target = match self.slot.take() {
            Some((id, snapshot)) if id == info.id => snapshot,
            _ => TreeHandle::find(repo, info.tree_id)?.enumerate()?,
        };

        let files = match info.first_parent() {
            Some(parent) => {
                let tree_id = get_commit(repo, parent)?.tree_id;
                let base = TreeHandle::find(repo, tree_id)?.enumerate()?;
                let files = diff(Some(&base), &target);
                self.slot = Some((parent, base));
                files
            }
            None => diff(None, &target),
        };
        Ok(files)
    }
}
