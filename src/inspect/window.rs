//! Windowed before/after view of a file.
//!
//! Lines are compared position by position, not aligned. An insertion or
//! deletion shifts every later line, which then shows up as changed. Each
//! differing line keeps `context_radius` lines around it; everything outside
//! those windows is dropped from both sides.

use serde::{Deserialize, Serialize};

/// The two sides of a file shown for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersions {
    pub original: String,
    pub modified: String,
}

impl FileVersions {
    pub fn new(original: impl Into<String>, modified: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            modified: modified.into(),
        }
    }
}

/// Split text into lines on `\n`, dropping trailing empty lines.
///
/// Empty text has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Restrict `old` and `new` to the regions around their differing lines.
pub fn window(old: &str, new: &str, context_radius: usize) -> FileVersions {
    // an added file is shown in full
    if old.is_empty() {
        return FileVersions::new("", new);
    }

    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let total = old_lines.len().max(new_lines.len());

    let mut retained = vec![false; total];
    let mut any_changed = false;
    for position in 0..total {
        if line_at(&old_lines, position) == line_at(&new_lines, position) {
            continue;
        }
        any_changed = true;
        let start = position.saturating_sub(context_radius);
        let end = position.saturating_add(context_radius).min(total - 1);
        for keep in &mut retained[start..=end] {
            *keep = true;
        }
    }

    if !any_changed || retained.iter().all(|keep| *keep) {
        return FileVersions::new(old, new);
    }

    FileVersions::new(
        snippet(&old_lines, &retained),
        snippet(&new_lines, &retained),
    )
}

// positions past the end compare as empty lines
fn line_at<'a>(lines: &[&'a str], position: usize) -> &'a str {
    lines.get(position).copied().unwrap_or("")
}

fn snippet(lines: &[&str], retained: &[bool]) -> String {
    lines
        .iter()
        .zip(retained)
        .filter(|(_, keep)| **keep)
        .map(|(line, _)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> Vec<String> {
        (1..=count).map(|n| format!("line {}", n)).collect()
    }

    #[test]
    fn test_split_lines() {
        assert!(split_lines("").is_empty());
        assert!(split_lines("\n\n").is_empty());
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_identical_texts_unchanged() {
        for text in ["", "x", "1\n2\n3\n", "a\n\n\nb\n\n"] {
            for radius in [0, 1, 3, 100] {
                assert_eq!(window(text, text, radius), FileVersions::new(text, text));
            }
        }
    }

    #[test]
    fn test_added_file_shown_in_full() {
        assert_eq!(window("", "a\nb\nc\n", 0), FileVersions::new("", "a\nb\nc\n"));
        assert_eq!(window("", "", 3), FileVersions::new("", ""));
    }

    #[test]
    fn test_short_file_returned_in_full() {
        let result = window("1\n2\n3\n", "1\nX\n3\n", 3);
        assert_eq!(result, FileVersions::new("1\n2\n3\n", "1\nX\n3\n"));
    }

    #[test]
    fn test_trailing_newline_only_difference() {
        assert_eq!(window("a\nb", "a\nb\n", 0), FileVersions::new("a\nb", "a\nb\n"));
    }

    #[test]
    fn test_long_file_is_windowed() {
        let old = numbered(20);
        let mut new = old.clone();
        new[9] = "changed".to_string();

        let result = window(&old.join("\n"), &new.join("\n"), 2);
        assert_eq!(result.original, "line 8\nline 9\nline 10\nline 11\nline 12");
        assert_eq!(result.modified, "line 8\nline 9\nchanged\nline 11\nline 12");
    }

    #[test]
    fn test_radius_zero() {
        let old = "a\nb\nc\n";
        let new = "a\nB\nc\n";
        assert_eq!(window(old, new, 0), FileVersions::new("b", "B"));
    }

    #[test]
    fn test_separate_windows_are_concatenated() {
        let old = numbered(30);
        let mut new = old.clone();
        new[2] = "first".to_string();
        new[26] = "second".to_string();

        let result = window(&old.join("\n"), &new.join("\n"), 1);
        assert_eq!(result.original, "line 2\nline 3\nline 4\nline 26\nline 27\nline 28");
        assert_eq!(result.modified, "line 2\nfirst\nline 4\nline 26\nsecond\nline 28");
    }

    #[test]
    fn test_deleted_file() {
        let old = numbered(10).join("\n");
        let result = window(&old, "", 2);
        // every position differs, so the whole file is retained
        assert_eq!(result, FileVersions::new(old.clone(), ""));
    }

    #[test]
    fn test_appended_lines_only_exist_on_one_side() {
        let old = numbered(10);
        let mut new = old.clone();
        new.push("extra".to_string());

        let result = window(&old.join("\n"), &new.join("\n"), 1);
        assert_eq!(result.original, "line 10");
        assert_eq!(result.modified, "line 10\nextra");
    }

    #[test]
    fn test_insertion_shifts_later_lines() {
        let old = numbered(10);
        let mut new = old.clone();
        new.insert(7, "inserted".to_string());

        let result = window(&old.join("\n"), &new.join("\n"), 0);
        assert_eq!(result.original, "line 8\nline 9\nline 10");
        assert_eq!(result.modified, "inserted\nline 8\nline 9\nline 10");
    }
}
