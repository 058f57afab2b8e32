//! Document persistence

use cfgsync_fs::{NormalizedPath, io};
use cfgsync_sections::ConfigDocument;

use crate::Result;

/// Reads and writes whole documents by file name.
pub trait DocumentStore: Send + Sync {
    fn load(&self, name: &str) -> Result<ConfigDocument>;

    fn exists(&self, name: &str) -> bool;

    /// Replace the stored content of `document.name()`.
    fn save(&self, document: &ConfigDocument) -> Result<()>;
}

/// Documents stored as files in the configuration directory.
///
/// Writes go through [`io::write_text`], so each file is replaced atomically.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    dir: NormalizedPath,
}

impl FsDocumentStore {
    pub fn new(dir: NormalizedPath) -> Self {
        Self { dir }
    }
}

impl DocumentStore for FsDocumentStore {
    fn load(&self, name: &str) -> Result<ConfigDocument> {
        Ok(ConfigDocument::load(&self.dir, name)?)
    }

    fn exists(&self, name: &str) -> bool {
        self.dir.join(name).is_file()
    }

    fn save(&self, document: &ConfigDocument) -> Result<()> {
        let path = self.dir.join(document.name());
        io::write_text(&path, &document.to_content())?;
        tracing::info!(path = %path, "wrote configuration");
        Ok(())
    }
}
