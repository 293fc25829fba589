//! Inspector configuration.

use std::path::PathBuf;

use crate::inspect::error::{InspectError, InspectResult};

/// Token that names the uncommitted working state.
pub const DEFAULT_WORKING_STATE_TOKEN: &str = "unstaged";

/// Label of the synthetic working-state history entry.
pub const DEFAULT_WORKING_STATE_LABEL: &str = "Uncommitted changes";

/// Lines of context kept on each side of a differing line.
pub const DEFAULT_CONTEXT_RADIUS: usize = 3;

/// Inspector configuration options.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Path to the repository's working directory.
    pub repo_path: PathBuf,
    /// Context lines kept around each differing line.
    pub context_radius: usize,
    /// Literal that callers use to name the working state.
    pub working_state_token: String,
    /// Label of the working-state history entry.
    pub working_state_label: String,
    /// Include untracked, non-ignored files in the working state.
    pub include_untracked: bool,
    /// Follow only first parents when listing history.
    pub first_parent_history: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            context_radius: DEFAULT_CONTEXT_RADIUS,
            working_state_token: DEFAULT_WORKING_STATE_TOKEN.to_string(),
            working_state_label: DEFAULT_WORKING_STATE_LABEL.to_string(),
            include_untracked: true,
            first_parent_history: false,
        }
    }
}

impl InspectorConfig {
    /// Create a new configuration for the repository at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: path.into(),
            ..Default::default()
        }
    }

    /// Set the context radius.
    pub fn context_radius(mut self, value: usize) -> Self {
        self.context_radius = value;
        self
    }

    /// Set the working-state token.
    pub fn working_state_token(mut self, value: impl Into<String>) -> Self {
        self.working_state_token = value.into();
        self
    }

    /// Set the working-state history label.
    pub fn working_state_label(mut self, value: impl Into<String>) -> Self {
        self.working_state_label = value.into();
        self
    }

    /// Set include_untracked flag.
    pub fn include_untracked(mut self, value: bool) -> Self {
        self.include_untracked = value;
        self
    }

    /// Set first_parent_history flag.
    pub fn first_parent_history(mut self, value: bool) -> Self {
        self.first_parent_history = value;
        self
    }

    pub(crate) fn validate(&self) -> InspectResult<()> {
        let token = self.working_state_token.trim();
        if token.is_empty() {
            return Err(InspectError::InvalidConfig(
                "working state token must not be empty".to_string(),
            ));
        }
        // the token must never be mistaken for a revision
        if token == "HEAD" {
            return Err(InspectError::InvalidConfig(
                "working state token must not be HEAD".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InspectorConfig::default();
        assert_eq!(config.context_radius, 3);
        assert_eq!(config.working_state_token, "unstaged");
        assert_eq!(config.working_state_label, "Uncommitted changes");
        assert!(config.include_untracked);
        assert!(!config.first_parent_history);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = InspectorConfig::new("/tmp/repo")
            .context_radius(5)
            .working_state_token("wip")
            .working_state_label("Work in progress")
            .include_untracked(false)
            .first_parent_history(true);

        assert_eq!(config.repo_path, PathBuf::from("/tmp/repo"));
        assert_eq!(config.context_radius, 5);
        assert_eq!(config.working_state_token, "wip");
        assert_eq!(config.working_state_label, "Work in progress");
        assert!(!config.include_untracked);
        assert!(config.first_parent_history);
    }

    #[test]
    fn test_validate_rejects_bad_tokens() {
        assert!(InspectorConfig::default().working_state_token("  ").validate().is_err());
        assert!(InspectorConfig::default().working_state_token("HEAD").validate().is_err());
    }
}
