//! [`TestConfigDir`] builder for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Backups directory used by the default settings.
pub const BACKUPS_DIR: &str = "config_backups";

/// A temporary configuration directory with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use cfgsync_test_utils::{TestConfigDir, fixtures};
///
/// let dir = TestConfigDir::new();
/// dir.write("config.desktop.ron", fixtures::DESKTOP);
/// dir.write("config.laptop.ron", fixtures::LAPTOP);
/// dir.activate("config.desktop.ron");
/// dir.assert_file_contains("config.ron", "Mod4");
/// ```
pub struct TestConfigDir {
    temp_dir: TempDir,
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `name` inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write `content` to `name`, creating parent directories.
    pub fn write(&self, name: &str, content: &str) -> &Self {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self
    }

    /// Point the `config.ron` symlink at `name`, replacing any existing link.
    #[cfg(unix)]
    pub fn activate(&self, name: &str) -> &Self {
        self.link("config.ron", name)
    }

    /// Create (or replace) the symlink `link` with the relative target `target`.
    #[cfg(unix)]
    pub fn link(&self, link: &str, target: &str) -> &Self {
        let link_path = self.path(link);
        if fs::symlink_metadata(&link_path).is_ok() {
            fs::remove_file(&link_path).unwrap();
        }
        std::os::unix::fs::symlink(target, &link_path).unwrap();
        self
    }

    /// Content of `name`.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, name: &str) -> String {
        let path = self.path(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read {}: {e}", path.display()))
    }

    /// Names in the backups directory ending with `_<target>`, sorted.
    pub fn backups(&self, target: &str) -> Vec<String> {
        let suffix = format!("_{target}");
        let mut names: Vec<String> = match fs::read_dir(self.path(BACKUPS_DIR)) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| name.ends_with(&suffix) && name.len() == 14 + suffix.len())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// Content of every regular file in the root, keyed by name and sorted.
    ///
    /// Symlinks are recorded by their target instead of their content.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = fs::read_dir(self.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let kind = entry.file_type().ok()?;
                if kind.is_symlink() {
                    let target = fs::read_link(entry.path()).ok()?;
                    Some((name, format!("-> {}", target.display())))
                } else if kind.is_file() {
                    Some((name.clone(), self.read(&name)))
                } else {
                    None
                }
            })
            .collect();
        files.sort();
        files
    }

    /// Assert that the file at `name` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, name: &str, content: &str) {
        let file_content = self.read(name);
        assert!(
            file_content.contains(content),
            "File {name} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }

    /// Assert that `name` holds exactly `content`.
    pub fn assert_content(&self, name: &str, content: &str) {
        assert_eq!(self.read(name), content, "unexpected content in {name}");
    }
}
