//! Inspection engine.
//!
//! Turns revision tokens into file contents, changed-file lists, windowed
//! before/after views and a history listing. Everything here reads through
//! the storage layer; the only write is `Inspector::write_working_file`.
//!
//! # Usage
//!
//! ```ignore
//! use gitscope::inspect::{Inspector, RevisionToken};
//!
//! let inspector = Inspector::open("./project")?;
//! for entry in inspector.list_history()? {
//!     let token = inspector.parse_token(&entry.token);
//!     println!("{}: {:?}", entry.label, inspector.get_changed_files(&token)?);
//! }
//! ```

mod config;
mod diff;
mod error;
mod history;
mod inspector;
mod revision;
mod window;

pub use config::{
    InspectorConfig, DEFAULT_CONTEXT_RADIUS, DEFAULT_WORKING_STATE_LABEL, DEFAULT_WORKING_STATE_TOKEN,
};
pub use diff::{diff, diff_changes};
pub use error::{InspectError, InspectResult};
pub use history::HistoryEntry;
pub use inspector::Inspector;
pub use revision::{ResolvedSnapshot, RevisionToken, SnapshotResolver, SnapshotSource, SourceKind};
pub use window::{split_lines, window, FileVersions};
