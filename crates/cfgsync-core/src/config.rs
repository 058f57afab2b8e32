//! Sync settings
//!
//! Settings live in an optional `cfgsync.toml` (or `.json`, `.yaml`, `.yml`)
//! inside the configuration directory. Every field has a default, so an
//! empty or missing file yields the stock behavior:
//!
//! ```toml
//! active_link = "config.ron"
//! variant_pattern = '^config\..*\.ron$'
//! backups_dir = "config_backups"
//! retention = 5
//! sections = ["keybind", "tags", "window_rules"]
//! missing_section = "skip"
//! lock_file = ".cfgsync.lock"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use cfgsync_fs::{ConfigStore, NormalizedPath};
use cfgsync_sections::{MissingSectionPolicy, validate_section_name};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_ACTIVE_LINK: &str = "config.ron";
pub const DEFAULT_VARIANT_PATTERN: &str = r"^config\..*\.ron$";
pub const DEFAULT_BACKUPS_DIR: &str = "config_backups";
pub const DEFAULT_RETENTION: usize = 5;
pub const DEFAULT_SECTIONS: [&str; 3] = ["keybind", "tags", "window_rules"];
pub const DEFAULT_LOCK_FILE: &str = ".cfgsync.lock";

/// Settings file names probed by [`SyncConfig::load`], in order.
pub const SETTINGS_FILES: [&str; 4] = [
    "cfgsync.toml",
    "cfgsync.json",
    "cfgsync.yaml",
    "cfgsync.yml",
];

/// Settings for a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory holding the variants, the active link and the backups.
    #[serde(skip)]
    pub config_dir: PathBuf,
    /// Name of the symlink selecting the active variant.
    pub active_link: String,
    /// Regex a file name must match to be a variant.
    pub variant_pattern: String,
    /// Backups directory; relative paths are resolved against `config_dir`.
    pub backups_dir: String,
    /// Backups kept per target file.
    pub retention: usize,
    /// Sections propagated from the active variant.
    pub sections: Vec<String>,
    /// What to do with targets lacking a section.
    pub missing_section: MissingSectionPolicy,
    /// Lock marker file, relative to `config_dir`.
    pub lock_file: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            active_link: DEFAULT_ACTIVE_LINK.to_string(),
            variant_pattern: DEFAULT_VARIANT_PATTERN.to_string(),
            backups_dir: DEFAULT_BACKUPS_DIR.to_string(),
            retention: DEFAULT_RETENTION,
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
            missing_section: MissingSectionPolicy::default(),
            lock_file: DEFAULT_LOCK_FILE.to_string(),
        }
    }
}

impl SyncConfig {
    /// Default settings for `config_dir`.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load settings for `config_dir` from the first settings file found in it.
    ///
    /// Falls back to defaults when none exists.
    pub fn load(config_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = NormalizedPath::new(config_dir.as_ref());
        match SETTINGS_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(NormalizedPath::is_file)
        {
            Some(path) => Self::load_from(config_dir, &path),
            None => {
                tracing::debug!(dir = %dir, "no settings file, using defaults");
                Ok(Self::new(config_dir))
            }
        }
    }

    /// Load settings for `config_dir` from an explicit settings file.
    pub fn load_from(config_dir: impl AsRef<Path>, path: &NormalizedPath) -> Result<Self> {
        let mut config: Self = ConfigStore::new().load(path)?;
        config.config_dir = config_dir.as_ref().to_path_buf();
        tracing::debug!(path = %path, "loaded settings");
        Ok(config)
    }

    /// Check the settings for values that would make a run meaningless or unsafe.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(invalid("at least one section must be tracked"));
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            validate_section_name(section)?;
            if !seen.insert(section.as_str()) {
                return Err(invalid(format!("section '{section}' is listed twice")));
            }
        }
        if self.retention == 0 {
            return Err(invalid("retention must keep at least one backup"));
        }
        if self.active_link.is_empty() || self.active_link.contains(['/', '\\']) {
            return Err(invalid(format!(
                "active_link must be a plain file name, got '{}'",
                self.active_link
            )));
        }
        self.variant_regex()?;
        Ok(())
    }

    /// The configuration directory.
    pub fn dir(&self) -> NormalizedPath {
        NormalizedPath::new(&self.config_dir)
    }

    /// Path of the active symlink.
    pub fn active_link_path(&self) -> NormalizedPath {
        self.dir().join(&self.active_link)
    }

    /// Resolved backups directory.
    pub fn backups_path(&self) -> NormalizedPath {
        self.dir().join(&self.backups_dir)
    }

    /// Path of the run lock marker.
    pub fn lock_path(&self) -> NormalizedPath {
        self.dir().join(&self.lock_file)
    }

    /// Compiled variant pattern.
    pub fn variant_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.variant_pattern)?)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        message: message.into(),
    }
}
