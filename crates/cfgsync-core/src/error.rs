//! Error types for cfgsync-core
//!
//! Every variant here is operational: it aborts the run it occurs in.
//! Per-document conditions (missing or unterminated sections, failed
//! backups) are recorded as issues in the report instead.

/// Result type for cfgsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cfgsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The active configuration could not be uniquely resolved
    #[error("Cannot resolve the active configuration: {reason}")]
    ActiveUnresolved { reason: String },

    /// Invalid settings
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A backup could not be written
    #[error("Backup of {target} failed: {source}")]
    Backup {
        target: String,
        #[source]
        source: cfgsync_fs::Error,
    },

    /// No backup with this name exists
    #[error("Backup not found: {name}")]
    BackupNotFound { name: String },

    /// Persisting a validated document failed; written files were rolled back
    #[error("Commit failed while writing {file}: {source}")]
    CommitFailed {
        file: String,
        #[source]
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from cfgsync-fs
    #[error(transparent)]
    Fs(#[from] cfgsync_fs::Error),

    /// Section error from cfgsync-sections
    #[error(transparent)]
    Sections(#[from] cfgsync_sections::Error),

    /// Variant pattern failed to compile
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
