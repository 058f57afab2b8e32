//! Sync run reports
//!
//! A report is the non-error outcome of a run. Operational failures are
//! returned as [`crate::Error`] instead and never produce a report.

use std::fmt;

use cfgsync_sections::{MergeOutcome, ValidationError};
use serde::Serialize;

use crate::backup::BackupRecord;

/// Terminal state of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Verdict {
    /// Every candidate validated; `changed` lists the files written
    Committed { changed: Vec<String> },
    /// Validation failed; nothing was written
    Rejected { errors: Vec<ValidationError> },
    /// Dry run that validated; `changed` lists the files that would be written
    Previewed { changed: Vec<String> },
}

/// Kind of a non-fatal, per-document condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A tracked section is missing from a document
    SectionNotFound,
    /// A section header has no closing line; the document was excluded
    UnterminatedSection,
    /// The pre-write backup failed; the target was excluded
    BackupFailed,
    /// Retention could not be applied after a backup
    PruneFailed,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SectionNotFound => "section not found",
            Self::UnterminatedSection => "unterminated section",
            Self::BackupFailed => "backup failed",
            Self::PruneFailed => "prune failed",
        };
        f.write_str(label)
    }
}

/// A recorded issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncIssue {
    pub file: String,
    /// Section concerned, when the issue is section-specific
    pub section: Option<String>,
    pub kind: IssueKind,
    pub message: String,
}

impl SyncIssue {
    pub fn new(
        file: impl Into<String>,
        section: Option<&str>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            section: section.map(str::to_string),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SyncIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(
                f,
                "{} [{}]: {}: {}",
                self.file, section, self.kind, self.message
            ),
            None => write!(f, "{}: {}: {}", self.file, self.kind, self.message),
        }
    }
}

/// Merge outcome of one section in one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionChange {
    pub section: String,
    pub outcome: MergeOutcome,
}

/// A target whose content changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub file: String,
    /// Sections whose merge changed the document
    pub sections: Vec<SectionChange>,
    /// Unified diff, attached on dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// File name of the active variant
    pub active: String,
    pub verdict: Verdict,
    pub issues: Vec<SyncIssue>,
    /// Backups taken during this run
    pub backups: Vec<BackupRecord>,
    /// Backups removed by retention during this run
    pub pruned: Vec<BackupRecord>,
    /// Targets whose merged content differs from disk
    pub changes: Vec<FileChange>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn is_committed(&self) -> bool {
        matches!(self.verdict, Verdict::Committed { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.verdict, Verdict::Rejected { .. })
    }

    /// Validation errors; empty unless rejected.
    pub fn errors(&self) -> &[ValidationError] {
        match &self.verdict {
            Verdict::Rejected { errors } => errors,
            _ => &[],
        }
    }

    /// Files written, or that would be written on a dry run.
    pub fn changed_files(&self) -> &[String] {
        match &self.verdict {
            Verdict::Committed { changed } | Verdict::Previewed { changed } => changed,
            Verdict::Rejected { .. } => &[],
        }
    }

    /// Whether every variant already matches the active one.
    pub fn is_in_sync(&self) -> bool {
        !self.is_rejected() && self.changes.is_empty()
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &SyncIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }
}
