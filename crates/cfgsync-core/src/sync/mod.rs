//! Sync orchestration
//!
//! - **engine**: the `SyncEngine` state machine plus backup maintenance
//! - **report**: verdicts, issues and per-file changes of a run
//! - **status**: read-only directory views and restore outcomes

mod engine;
mod report;
mod status;

pub use engine::{SyncEngine, SyncOptions};
pub use report::{FileChange, IssueKind, SectionChange, SyncIssue, SyncReport, Verdict};
pub use status::{RestoreReport, SectionState, StatusReport, VariantStatus};
