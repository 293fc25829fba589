//! gitscope - version-history inspection over git
//!
//! This crate answers review questions about a repository: what a file
//! looked like at any commit, which files a commit touched, and what the
//! changed region of a file looks like next to its previous version. The
//! uncommitted working state is addressed like any other version.
//!
//! # Example
//!
//! ```no_run
//! use gitscope::inspect::{Inspector, RevisionToken};
//!
//! let inspector = Inspector::open("./project").unwrap();
//! let changed = inspector.get_changed_files(&RevisionToken::head()).unwrap();
//! for path in &changed {
//!     let versions = inspector.get_file_versions(&RevisionToken::head(), path).unwrap();
//!     println!("{}\n{}", versions.original, versions.modified);
//! }
//! ```

pub mod access;
pub mod inspect;
pub mod storage;
