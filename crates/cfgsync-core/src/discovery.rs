//! Active configuration resolution and variant discovery
//!
//! Both collaborators are traits so the engine can be driven by fakes in
//! tests. The filesystem implementations use direct calls (`read_link`,
//! `read_dir`) rather than shelling out.

use std::fs;
use std::path::{Path, PathBuf};

use cfgsync_fs::{NormalizedPath, io};
use regex::Regex;

use crate::{Error, Result};

/// Resolves which variant is currently active.
pub trait ActiveResolver: Send + Sync {
    /// File name of the active variant.
    fn resolve(&self) -> Result<String>;
}

/// Lists the configuration variants.
pub trait VariantSource: Send + Sync {
    /// Variant file names, sorted.
    fn variants(&self) -> Result<Vec<String>>;
}

/// Resolves the active variant by following a symlink.
#[derive(Debug, Clone)]
pub struct SymlinkResolver {
    dir: NormalizedPath,
    link: String,
}

impl SymlinkResolver {
    /// Resolver for the symlink `<dir>/<link>`.
    pub fn new(dir: NormalizedPath, link: impl Into<String>) -> Self {
        Self {
            dir,
            link: link.into(),
        }
    }

    fn unresolved(&self, reason: impl std::fmt::Display) -> Error {
        Error::ActiveUnresolved {
            reason: format!("{}: {reason}", self.dir.join(&self.link)),
        }
    }
}

impl ActiveResolver for SymlinkResolver {
    fn resolve(&self) -> Result<String> {
        let link_path = self.dir.join(&self.link).to_native();

        let metadata = fs::symlink_metadata(&link_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => self.unresolved("link does not exist"),
            _ => self.unresolved(e),
        })?;
        if !metadata.file_type().is_symlink() {
            return Err(self.unresolved("not a symbolic link"));
        }

        let target = fs::read_link(&link_path).map_err(|e| self.unresolved(e))?;
        let target = if target.is_absolute() {
            target
        } else {
            self.dir.to_native().join(target)
        };

        let name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| self.unresolved("link target has no file name"))?
            .to_string();

        if !same_dir(target.parent(), &self.dir.to_native()) {
            return Err(self.unresolved(format!(
                "link points outside the configuration directory ({})",
                target.display()
            )));
        }

        tracing::debug!(link = %self.link, active = %name, "resolved active configuration");
        Ok(name)
    }
}

fn same_dir(parent: Option<&Path>, dir: &Path) -> bool {
    let canonical = |p: &Path| dunce::canonicalize(p).unwrap_or_else(|_| PathBuf::from(p));
    match parent {
        Some(parent) => canonical(parent) == canonical(dir),
        None => false,
    }
}

/// Finds variants by matching file names in a directory against a pattern.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    dir: NormalizedPath,
    pattern: Regex,
    exclude: Vec<String>,
}

impl DirectoryScanner {
    pub fn new(dir: NormalizedPath, pattern: Regex) -> Self {
        Self {
            dir,
            pattern,
            exclude: Vec::new(),
        }
    }

    /// Never report `name` as a variant, even when it matches.
    ///
    /// Used for the active link, which usually matches the pattern itself.
    pub fn excluding(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }
}

impl VariantSource for DirectoryScanner {
    fn variants(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = io::list_files(&self.dir)?
            .into_iter()
            .map(|entry| entry.name)
            .filter(|name| self.pattern.is_match(name) && !self.exclude.contains(name))
            .collect();
        names.sort();
        tracing::debug!(dir = %self.dir, count = names.len(), "discovered variants");
        Ok(names)
    }
}
