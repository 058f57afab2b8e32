//! Advisory run lock
//!
//! Only one sync run may touch a configuration directory at a time. The lock
//! is an exclusive `fs2` lock on a marker file, taken without blocking so a
//! second invocation fails fast instead of queueing behind the first.

use std::fs::{File, OpenOptions};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Guard holding the exclusive lock; released on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: NormalizedPath,
}

impl RunLock {
    /// Try to take the lock at `path`, creating the marker file if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::LockHeld` when another process (or another guard in
    /// this process) already holds the lock.
    pub fn acquire(path: &NormalizedPath) -> Result<Self> {
        let native_path = path.to_native();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native_path)
            .map_err(|e| Error::io(&native_path, e))?;

        file.try_lock_exclusive().map_err(|_| Error::LockHeld {
            path: native_path.clone(),
        })?;

        tracing::debug!(path = %path, "acquired run lock");
        Ok(Self {
            file,
            path: path.clone(),
        })
    }

    /// Path of the lock marker file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        tracing::debug!(path = %self.path, "released run lock");
    }
}
