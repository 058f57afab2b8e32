//! Read-only views of a configuration directory

use cfgsync_sections::SectionStatus;
use serde::Serialize;

use crate::backup::BackupRecord;

/// Presence of one tracked section in one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionState {
    pub section: String,
    #[serde(flatten)]
    pub status: SectionStatus,
    /// Whether the body equals the active one; `None` when not comparable
    pub in_sync: Option<bool>,
}

/// One discovered variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantStatus {
    pub file: String,
    pub active: bool,
    pub sections: Vec<SectionState>,
    /// Number of backups kept for this file
    pub backups: usize,
}

impl VariantStatus {
    /// Whether any section of this variant differs from the active one.
    pub fn is_out_of_sync(&self) -> bool {
        self.sections.iter().any(|s| s.in_sync == Some(false))
    }
}

/// Snapshot of the configuration directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub active: String,
    pub sections: Vec<String>,
    pub variants: Vec<VariantStatus>,
}

/// Outcome of restoring a backup onto its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// The backup that was restored
    pub restored: BackupRecord,
    /// Backup of the content that was overwritten, if the target existed
    pub previous: Option<BackupRecord>,
    /// Backups removed by retention afterwards
    pub pruned: Vec<BackupRecord>,
}
