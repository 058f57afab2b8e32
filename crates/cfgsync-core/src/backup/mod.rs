//! Timestamped backups of configuration variants
//!
//! Before a variant is overwritten its previous content is copied into the
//! backups directory as `<YYYYMMDDHHMMSS>_<file name>`. Each target keeps at
//! most `retention` backups; the oldest are pruned first.

mod manager;

pub use manager::{BackupManager, BackupRecord, Clock, SystemClock, TIMESTAMP_FORMAT};

use crate::Result;

/// Storage for backups.
pub trait BackupStore: Send + Sync {
    /// Save `content` as a new backup of `target`.
    fn backup(&self, target: &str, content: &str) -> Result<BackupRecord>;

    /// Delete the oldest backups of `target` until at most `retention` remain.
    ///
    /// Returns the removed records.
    fn prune(&self, target: &str, retention: usize) -> Result<Vec<BackupRecord>>;

    /// Backups of `target`, oldest first.
    fn list(&self, target: &str) -> Result<Vec<BackupRecord>>;

    /// Every backup, grouped by target and oldest first within a target.
    fn list_all(&self) -> Result<Vec<BackupRecord>>;

    /// The record and saved content of the backup called `name`.
    fn load(&self, name: &str) -> Result<(BackupRecord, String)>;
}
