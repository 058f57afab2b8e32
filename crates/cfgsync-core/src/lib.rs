//! Sync orchestration for cfgsync
//!
//! This crate ties the section engine to the filesystem:
//!
//! - **Configuration**: [`SyncConfig`] replaces process-wide constants
//! - **Discovery**: resolving the active link and listing variants
//! - **Backups**: timestamped snapshots with retention
//! - **SyncEngine**: the `Discover -> Extract -> Merge -> Validate -> Commit | Reject` run
//!
//! # Architecture
//!
//! ```text
//!                 cfgsync-cli
//!                      |
//!                cfgsync-core
//!                      |
//!        +-------------+-------------+
//!        |                           |
//!   cfgsync-sections  ---------> cfgsync-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cfgsync_core::{SyncConfig, SyncEngine};
//!
//! # fn main() -> cfgsync_core::Result<()> {
//! let config = SyncConfig::load("/home/me/.config/leftwm")?;
//! let report = SyncEngine::new(config)?.sync()?;
//! if report.is_rejected() {
//!     for error in report.errors() {
//!         eprintln!("{error}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod config;
pub mod config_set;
pub mod discovery;
pub mod error;
pub mod store;
pub mod sync;

pub use backup::{BackupManager, BackupRecord, BackupStore, Clock, SystemClock};
pub use config::SyncConfig;
pub use config_set::ConfigSet;
pub use discovery::{ActiveResolver, DirectoryScanner, SymlinkResolver, VariantSource};
pub use error::{Error, Result};
pub use store::{DocumentStore, FsDocumentStore};
pub use sync::{
    FileChange, IssueKind, RestoreReport, SectionChange, SectionState, StatusReport, SyncEngine,
    SyncIssue, SyncOptions, SyncReport, VariantStatus, Verdict,
};
