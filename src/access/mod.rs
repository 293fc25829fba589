//! Access boundary.
//!
//! Callers reach the engine through a `Gateway`, which checks the caller's
//! role against an `AccessPolicy` before delegating. There is one engine;
//! permission tiers are data in the policy, not separate entry points.
//! Authenticating the caller happens elsewhere: the gateway trusts the role
//! it is given.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::inspect::{FileVersions, HistoryEntry, InspectError, Inspector};
use crate::storage::Change;

/// Who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Anonymous,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Anonymous => write!(f, "anonymous"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anonymous" => Ok(Role::Anonymous),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// What a role may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Read,
    Write,
}

/// The operations exposed at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FileContent,
    FileVersions,
    ChangedFiles,
    History,
    WriteWorkingFile,
}

impl Operation {
    /// The capability the operation needs.
    pub fn required(self) -> Capability {
        match self {
            Operation::WriteWorkingFile => Capability::Write,
            _ => Capability::Read,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FileContent => "file content",
            Operation::FileVersions => "file versions",
            Operation::ChangedFiles => "changed files",
            Operation::History => "history",
            Operation::WriteWorkingFile => "write working file",
        };
        write!(f, "{}", name)
    }
}

/// Boundary errors.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{role} may not request {operation}")]
    Denied { role: Role, operation: Operation },

    #[error(transparent)]
    Inspect(#[from] InspectError),
}

impl AccessError {
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessError::Denied { .. })
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

/// Which roles hold which capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    grants: BTreeSet<(Role, Capability)>,
}

impl Default for AccessPolicy {
    /// Anyone may read; only admins may write.
    fn default() -> Self {
        Self::empty()
            .grant(Role::Anonymous, Capability::Read)
            .grant(Role::Admin, Capability::Read)
            .grant(Role::Admin, Capability::Write)
    }
}

impl AccessPolicy {
    /// A policy that allows nothing.
    pub fn empty() -> Self {
        Self {
            grants: BTreeSet::new(),
        }
    }

    pub fn grant(mut self, role: Role, capability: Capability) -> Self {
        self.grants.insert((role, capability));
        self
    }

    pub fn revoke(mut self, role: Role, capability: Capability) -> Self {
        self.grants.remove(&(role, capability));
        self
    }

    pub fn allows(&self, role: Role, operation: Operation) -> bool {
        self.grants.contains(&(role, operation.required()))
    }

    /// Check a call, failing with `Denied` when the role lacks the
    /// capability.
    pub fn check(&self, role: Role, operation: Operation) -> AccessResult<()> {
        if self.allows(role, operation) {
            Ok(())
        } else {
            warn!(role = %role, operation = %operation, "access denied");
            Err(AccessError::Denied { role, operation })
        }
    }
}

/// The permission-checked entry point to an `Inspector`.
///
/// Tokens arrive as raw strings and are parsed with the inspector's
/// working-state literal.
#[derive(Clone)]
pub struct Gateway {
    inspector: Inspector,
    policy: AccessPolicy,
}

impl Gateway {
    pub fn new(inspector: Inspector, policy: AccessPolicy) -> Self {
        Self { inspector, policy }
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn get_file_content(&self, role: Role, token: &str, path: &str) -> AccessResult<String> {
        self.policy.check(role, Operation::FileContent)?;
        let token = self.inspector.parse_token(token);
        Ok(self.inspector.get_file_content(&token, path)?)
    }

    pub fn get_file_versions(&self, role: Role, token: &str, path: &str) -> AccessResult<FileVersions> {
        self.policy.check(role, Operation::FileVersions)?;
        let token = self.inspector.parse_token(token);
        Ok(self.inspector.get_file_versions(&token, path)?)
    }

    pub fn get_changed_files(&self, role: Role, token: &str) -> AccessResult<Vec<String>> {
        self.policy.check(role, Operation::ChangedFiles)?;
        let token = self.inspector.parse_token(token);
        Ok(self.inspector.get_changed_files(&token)?)
    }

    /// Changed files with their classification.
    pub fn get_changes(&self, role: Role, token: &str) -> AccessResult<Vec<Change>> {
        self.policy.check(role, Operation::ChangedFiles)?;
        let token = self.inspector.parse_token(token);
        Ok(self.inspector.get_changes(&token)?)
    }

    pub fn list_history(&self, role: Role) -> AccessResult<Vec<HistoryEntry>> {
        self.policy.check(role, Operation::History)?;
        Ok(self.inspector.list_history()?)
    }

    pub fn write_working_file(&self, role: Role, path: &str, content: &str) -> AccessResult<()> {
        self.policy.check(role, Operation::WriteWorkingFile)?;
        Ok(self.inspector.write_working_file(path, content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{commit_files, init_repo};

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Anonymous".parse::<Role>().unwrap(), Role::Anonymous);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_default_policy() {
        let policy = AccessPolicy::default();
        for operation in [
            Operation::FileContent,
            Operation::FileVersions,
            Operation::ChangedFiles,
            Operation::History,
        ] {
            assert!(policy.allows(Role::Anonymous, operation));
            assert!(policy.allows(Role::Admin, operation));
        }
        assert!(!policy.allows(Role::Anonymous, Operation::WriteWorkingFile));
        assert!(policy.allows(Role::Admin, Operation::WriteWorkingFile));
    }

    #[test]
    fn test_custom_policy() {
        let policy = AccessPolicy::default().revoke(Role::Anonymous, Capability::Read);
        let err = policy.check(Role::Anonymous, Operation::History).unwrap_err();
        assert!(err.is_denied());
        assert_eq!(err.to_string(), "anonymous may not request history");

        assert!(AccessPolicy::empty().check(Role::Admin, Operation::FileContent).is_err());
    }

    #[test]
    fn test_gateway_delegates_after_check() {
        let (dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "1\n")], "first");
        let gateway = Gateway::new(Inspector::open(dir.path()).unwrap(), AccessPolicy::default());

        assert_eq!(gateway.get_file_content(Role::Anonymous, "HEAD", "a.txt").unwrap(), "1\n");
        assert_eq!(gateway.list_history(Role::Anonymous).unwrap().len(), 2);
        assert!(gateway.get_changed_files(Role::Anonymous, "unstaged").unwrap().is_empty());

        let err = gateway
            .write_working_file(Role::Anonymous, "a.txt", "2\n")
            .unwrap_err();
        assert!(err.is_denied());
        // the denied write never reached the working directory
        assert_eq!(gateway.get_file_content(Role::Admin, "unstaged", "a.txt").unwrap(), "1\n");

        gateway.write_working_file(Role::Admin, "a.txt", "2\n").unwrap();
        assert_eq!(gateway.get_changed_files(Role::Admin, "unstaged").unwrap(), vec!["a.txt"]);
        let versions = gateway.get_file_versions(Role::Anonymous, "unstaged", "a.txt").unwrap();
        assert_eq!(versions, FileVersions::new("1\n", "2\n"));
    }

    #[test]
    fn test_gateway_passes_engine_errors_through() {
        let (dir, repo) = init_repo();
        commit_files(&repo, &[("a.txt", "1\n")], "first");
        let gateway = Gateway::new(Inspector::open(dir.path()).unwrap(), AccessPolicy::default());

        let err = gateway.get_changed_files(Role::Admin, "nope").unwrap_err();
        assert!(matches!(err, AccessError::Inspect(ref e) if e.is_invalid_reference()));
        assert_eq!(err.to_string(), "invalid reference: nope");
    }
}
