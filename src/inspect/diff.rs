//! Snapshot differ.
//!
//! Both snapshots iterate in path order, so the diff is a single merge-join
//! over the two. A path is changed when it was added, removed, or maps to a
//! different blob on each side. Identical blob ids mean identical content,
//! so no file is ever read here.

use std::cmp::Ordering;

use crate::storage::{Change, ChangeStatus, Snapshot};

/// Classify every path that differs between `base` and `target`.
///
/// A `None` base stands for "nothing before": every target path is added.
pub fn diff_changes(base: Option<&Snapshot>, target: &Snapshot) -> Vec<Change> {
    let empty = Snapshot::new();
    let base = base.unwrap_or(&empty);

    let mut old = base.iter().peekable();
    let mut new = target.iter().peekable();
    let mut changes = Vec::new();

    loop {
        let change = match (old.peek().copied(), new.peek().copied()) {
            (None, None) => break,
            (Some((path, _)), None) => {
                old.next();
                Some(change(path, ChangeStatus::Removed))
            }
            (None, Some((path, _))) => {
                new.next();
                Some(change(path, ChangeStatus::Added))
            }
            (Some((old_path, old_id)), Some((new_path, new_id))) => match old_path.cmp(new_path) {
                Ordering::Less => {
                    old.next();
                    Some(change(old_path, ChangeStatus::Removed))
                }
                Ordering::Greater => {
                    new.next();
                    Some(change(new_path, ChangeStatus::Added))
                }
                Ordering::Equal => {
                    old.next();
                    new.next();
                    (old_id != new_id).then(|| change(new_path, ChangeStatus::Modified))
                }
            },
        };
        changes.extend(change);
    }

    changes
}

/// The changed paths between `base` and `target`, each listed once.
pub fn diff(base: Option<&Snapshot>, target: &Snapshot) -> Vec<String> {
    diff_changes(base, target)
        .into_iter()
        .map(|change| change.path)
        .collect()
}

fn change(path: &str, status: ChangeStatus) -> Change {
    Change {
        path: path.to_string(),
        status,
    }
}
