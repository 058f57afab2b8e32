//! Directory-backed backup store

use std::time::SystemTime;

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

use cfgsync_fs::checksum::{compute_content_checksum, compute_file_checksum};
use cfgsync_fs::{NormalizedPath, io};

use super::BackupStore;
use crate::{Error, Result};

/// Timestamp prefix of a backup file name.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_LEN: usize = 14;

/// Source of backup timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    /// File name of the backed up variant.
    pub target: String,
    /// File name of the backup itself.
    pub name: String,
    pub path: String,
    pub created: NaiveDateTime,
    /// `sha256:<hex>` of the saved content.
    pub checksum: String,
}

/// Backups stored as plain files in one directory.
pub struct BackupManager {
    dir: NormalizedPath,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for BackupManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupManager").field("dir", &self.dir).finish()
    }
}

/// A backup file name split into its parts, plus its mtime for ordering.
struct Entry {
    name: String,
    target: String,
    created: NaiveDateTime,
    modified: SystemTime,
}

impl BackupManager {
    /// Manager for backups under `dir`, using the system clock.
    pub fn new(dir: NormalizedPath) -> Self {
        Self {
            dir,
            clock: Box::new(SystemClock),
        }
    }

    /// Use `clock` for new backup timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn dir(&self) -> &NormalizedPath {
        &self.dir
    }

    /// Backup file name for `target` at `created`.
    pub fn backup_name(target: &str, created: NaiveDateTime) -> String {
        format!("{}_{target}", created.format(TIMESTAMP_FORMAT))
    }

    /// Split a backup file name into its timestamp and target.
    ///
    /// Only names that are exactly 14 digits, `_`, then a non-empty plain
    /// file name qualify.
    pub fn parse_name(name: &str) -> Option<(NaiveDateTime, &str)> {
        let stamp = name.get(..TIMESTAMP_LEN)?;
        if !stamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let target = name.get(TIMESTAMP_LEN..)?.strip_prefix('_')?;
        if target.is_empty() || target.contains(['/', '\\']) {
            return None;
        }
        let created = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        Some((created, target))
    }

    /// Parsed backups, sorted by target, then timestamp, then mtime.
    fn entries(&self) -> cfgsync_fs::Result<Vec<Entry>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries: Vec<Entry> = io::list_files(&self.dir)?
            .into_iter()
            .filter_map(|file| {
                let (created, target) = Self::parse_name(&file.name)?;
                Some(Entry {
                    target: target.to_string(),
                    created,
                    modified: file.modified,
                    name: file.name,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            (&a.target, a.created, a.modified, &a.name).cmp(&(
                &b.target, b.created, b.modified, &b.name,
            ))
        });
        Ok(entries)
    }

    fn entries_for(&self, target: &str) -> cfgsync_fs::Result<Vec<Entry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| entry.target == target)
            .collect())
    }

    fn record(&self, entry: &Entry) -> cfgsync_fs::Result<BackupRecord> {
        let path = self.dir.join(&entry.name);
        Ok(BackupRecord {
            target: entry.target.clone(),
            name: entry.name.clone(),
            checksum: compute_file_checksum(&path)?,
            path: path.as_str().to_string(),
            created: entry.created,
        })
    }

    /// Next free timestamp for `target`, strictly after its newest backup.
    fn next_timestamp(&self, target: &str, existing: &[Entry]) -> NaiveDateTime {
        let now = self.clock.now();
        let mut created = now.with_nanosecond(0).unwrap_or(now);
        if let Some(newest) = existing.iter().map(|entry| entry.created).max()
            && created <= newest
        {
            created = newest + TimeDelta::seconds(1);
        }
        while self.dir.join(&Self::backup_name(target, created)).exists() {
            created += TimeDelta::seconds(1);
        }
        created
    }

    fn write_backup(&self, target: &str, content: &str) -> cfgsync_fs::Result<BackupRecord> {
        io::ensure_dir(&self.dir)?;
        let existing = self.entries_for(target)?;

        let created = self.next_timestamp(target, &existing);
        let name = Self::backup_name(target, created);
        let path = self.dir.join(&name);
        io::write_text(&path, content)?;

        Ok(BackupRecord {
            target: target.to_string(),
            name,
            path: path.as_str().to_string(),
            created,
            checksum: compute_content_checksum(content),
        })
    }
}

impl BackupStore for BackupManager {
    fn backup(&self, target: &str, content: &str) -> Result<BackupRecord> {
        let record = self
            .write_backup(target, content)
            .map_err(|source| Error::Backup {
                target: target.to_string(),
                source,
            })?;
        tracing::info!(file = target, backup = %record.name, "created backup");
        Ok(record)
    }

    fn prune(&self, target: &str, retention: usize) -> Result<Vec<BackupRecord>> {
        let entries = self.entries_for(target)?;
        let excess = entries.len().saturating_sub(retention);
        let mut removed = Vec::with_capacity(excess);

        for entry in &entries[..excess] {
            let record = self.record(entry)?;
            io::remove_file(&self.dir.join(&entry.name))?;
            tracing::info!(file = target, backup = %entry.name, "pruned backup");
            removed.push(record);
        }

        Ok(removed)
    }

    fn list(&self, target: &str) -> Result<Vec<BackupRecord>> {
        let records = self
            .entries_for(target)?
            .iter()
            .map(|entry| self.record(entry))
            .collect::<cfgsync_fs::Result<_>>()?;
        Ok(records)
    }

    fn list_all(&self) -> Result<Vec<BackupRecord>> {
        let records = self
            .entries()?
            .iter()
            .map(|entry| self.record(entry))
            .collect::<cfgsync_fs::Result<_>>()?;
        Ok(records)
    }

    fn load(&self, name: &str) -> Result<(BackupRecord, String)> {
        let not_found = || Error::BackupNotFound {
            name: name.to_string(),
        };
        let (created, target) = Self::parse_name(name).ok_or_else(not_found)?;
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(not_found());
        }

        let content = io::read_text(&path)?;
        let record = BackupRecord {
            target: target.to_string(),
            name: name.to_string(),
            path: path.as_str().to_string(),
            created,
            checksum: compute_content_checksum(&content),
        };
        Ok((record, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Clock returning a fixed sequence of timestamps, then repeating the last.
    struct SteppingClock(Mutex<Vec<NaiveDateTime>>);

    impl SteppingClock {
        fn fixed(at: NaiveDateTime) -> Self {
            Self(Mutex::new(vec![at]))
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> NaiveDateTime {
            let mut times = self.0.lock().unwrap();
            if times.len() > 1 { times.remove(0) } else { times[0] }
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn manager(temp: &TempDir, clock: SteppingClock) -> BackupManager {
        BackupManager::new(NormalizedPath::new(temp.path().join("config_backups")))
            .with_clock(clock)
    }

    #[test]
    fn parse_name_requires_exact_shape() {
        assert_eq!(
            BackupManager::parse_name("20240517093000_config.a.ron"),
            Some((at(9, 30, 0), "config.a.ron"))
        );
        assert_eq!(BackupManager::parse_name("2024051709300_config.a.ron"), None);
        assert_eq!(BackupManager::parse_name("20240517093000config.a.ron"), None);
        assert_eq!(BackupManager::parse_name("20240517093000_"), None);
        assert_eq!(BackupManager::parse_name("20241317093000_config.a.ron"), None);
        assert_eq!(BackupManager::parse_name("notes.txt"), None);
        assert_eq!(BackupManager::parse_name("20240517093000_../config.a.ron"), None);
    }

    #[test]
    fn backup_writes_named_copy() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));

        let record = backups.backup("config.a.ron", "tags: [\n],\n").unwrap();

        assert_eq!(record.name, "20240517093000_config.a.ron");
        assert_eq!(record.target, "config.a.ron");
        assert!(record.checksum.starts_with("sha256:"));
        let saved =
            fs::read_to_string(temp.path().join("config_backups").join(&record.name)).unwrap();
        assert_eq!(saved, "tags: [\n],\n");
    }

    #[test]
    fn same_second_backups_get_distinct_names() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));

        let first = backups.backup("config.a.ron", "1").unwrap();
        let second = backups.backup("config.a.ron", "2").unwrap();
        let third = backups.backup("config.a.ron", "3").unwrap();

        assert_eq!(first.name, "20240517093000_config.a.ron");
        assert_eq!(second.name, "20240517093001_config.a.ron");
        assert_eq!(third.name, "20240517093002_config.a.ron");
    }

    #[test]
    fn clock_going_backwards_keeps_order() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock(Mutex::new(vec![at(10, 0, 0), at(9, 0, 0)])));

        backups.backup("config.a.ron", "new").unwrap();
        let later = backups.backup("config.a.ron", "newer").unwrap();

        assert_eq!(later.created, at(10, 0, 1));
        let listed: Vec<String> = backups
            .list("config.a.ron")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(listed.last(), Some(&later.name));
    }

    #[test]
    fn prune_keeps_newest() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));
        for i in 0..7 {
            backups.backup("config.a.ron", &i.to_string()).unwrap();
        }

        let removed = backups.prune("config.a.ron", 5).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].name, "20240517093000_config.a.ron");
        assert_eq!(removed[1].name, "20240517093001_config.a.ron");

        let kept = backups.list("config.a.ron").unwrap();
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].name, "20240517093002_config.a.ron");
    }

    #[test]
    fn prune_only_touches_its_target() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));
        for _ in 0..3 {
            backups.backup("config.a.ron", "a").unwrap();
            backups.backup("config.aa.ron", "aa").unwrap();
        }

        backups.prune("config.a.ron", 1).unwrap();

        assert_eq!(backups.list("config.a.ron").unwrap().len(), 1);
        assert_eq!(backups.list("config.aa.ron").unwrap().len(), 3);
    }

    #[test]
    fn foreign_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("config_backups");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("README"), "").unwrap();
        fs::write(dir.join("2024_config.a.ron"), "").unwrap();

        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));
        assert!(backups.list_all().unwrap().is_empty());
    }

    #[test]
    fn list_on_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));
        assert!(backups.list("config.a.ron").unwrap().is_empty());
    }

    #[test]
    fn load_returns_content_and_rejects_unknown_names() {
        let temp = TempDir::new().unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));
        let record = backups.backup("config.a.ron", "saved\n").unwrap();

        let (loaded, content) = backups.load(&record.name).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(content, "saved\n");

        assert!(matches!(
            backups.load("20240517093059_config.a.ron"),
            Err(Error::BackupNotFound { .. })
        ));
        assert!(matches!(backups.load("../config.a.ron"), Err(Error::BackupNotFound { .. })));
    }

    #[test]
    fn unwritable_dir_is_backup_error() {
        let temp = TempDir::new().unwrap();
        // A regular file where the directory should be
        fs::write(temp.path().join("config_backups"), "").unwrap();
        let backups = manager(&temp, SteppingClock::fixed(at(9, 30, 0)));

        let result = backups.backup("config.a.ron", "x");
        assert!(
            matches!(result, Err(Error::Backup { ref target, .. }) if target == "config.a.ron")
        );
    }
}
