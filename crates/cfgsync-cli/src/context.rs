//! Settings resolution for a command invocation
//!
//! Values come from three layers, later ones winning: built-in defaults, the
//! settings file, and command-line flags.

use std::path::PathBuf;

use cfgsync_core::SyncConfig;
use cfgsync_fs::NormalizedPath;
use cfgsync_sections::MissingSectionPolicy;

use crate::error::Result;

/// Flags that override settings file values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub sections: Vec<String>,
    pub retention: Option<usize>,
    pub append_missing: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut SyncConfig) {
        if !self.sections.is_empty() {
            config.sections = self.sections.clone();
        }
        if let Some(retention) = self.retention {
            config.retention = retention;
        }
        if self.append_missing {
            config.missing_section = MissingSectionPolicy::Append;
        }
    }
}

/// Where the configuration lives, as given on the command line
#[derive(Debug, Clone)]
pub struct Context {
    pub dir: PathBuf,
    pub settings: Option<PathBuf>,
}

impl Context {
    /// Context for `dir`, or the current directory when `None`.
    pub fn new(dir: Option<PathBuf>, settings: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        Ok(Self { dir, settings })
    }

    /// Load the settings and apply `overrides`.
    pub fn load(&self, overrides: &Overrides) -> Result<SyncConfig> {
        let mut config = match &self.settings {
            Some(path) => SyncConfig::load_from(&self.dir, &NormalizedPath::new(path))?,
            None => SyncConfig::load(&self.dir)?,
        };
        overrides.apply(&mut config);
        tracing::debug!(dir = %self.dir.display(), ?config, "resolved settings");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn flags_override_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cfgsync.toml"),
            "retention = 9\nsections = [\"tags\"]\n",
        )
        .unwrap();
        let context = Context::new(Some(temp.path().to_path_buf()), None).unwrap();

        let config = context
            .load(&Overrides {
                sections: vec!["keybind".into()],
                retention: None,
                append_missing: true,
            })
            .unwrap();

        assert_eq!(config.sections, vec!["keybind"]);
        assert_eq!(config.retention, 9);
        assert_eq!(config.missing_section, MissingSectionPolicy::Append);
    }

    #[test]
    fn explicit_settings_file() {
        let temp = TempDir::new().unwrap();
        let settings = temp.path().join("elsewhere.yaml");
        fs::write(&settings, "retention: 2\n").unwrap();
        let context = Context::new(Some(temp.path().to_path_buf()), Some(settings)).unwrap();

        let config = context.load(&Overrides::default()).unwrap();

        assert_eq!(config.retention, 2);
        assert_eq!(config.config_dir, temp.path());
    }
}
