//! SyncEngine implementation
//!
//! A run moves through `Discover -> Extract -> Merge -> Validate` and ends in
//! either `Commit` or `Reject`. Every phase works on an immutable
//! [`ConfigSet`] snapshot; nothing reaches the disk before all candidates
//! have validated.

use std::collections::BTreeSet;

use cfgsync_fs::RunLock;
use cfgsync_sections::{
    ConfigDocument, MergeOutcome, SectionStatus, extract, merge, probe, validate_all,
    validate_section,
};
use similar::TextDiff;

use crate::backup::{BackupManager, BackupRecord, BackupStore};
use crate::config::SyncConfig;
use crate::config_set::ConfigSet;
use crate::discovery::{ActiveResolver, DirectoryScanner, SymlinkResolver, VariantSource};
use crate::store::{DocumentStore, FsDocumentStore};
use crate::{Error, Result};

use super::report::{FileChange, IssueKind, SectionChange, SyncIssue, SyncReport, Verdict};
use super::status::{RestoreReport, SectionState, StatusReport, VariantStatus};

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Stop after validation: no backups, no writes, diffs in the report.
    pub dry_run: bool,
}

/// Body extracted from the active document for one section.
struct Extracted {
    section: String,
    body: Vec<String>,
}

/// Output of the merge phase.
struct MergePhase {
    /// Active document plus every accepted candidate
    accepted: ConfigSet,
    changes: Vec<FileChange>,
    backups: Vec<BackupRecord>,
}

/// Engine propagating tracked sections from the active variant to the others
///
/// Collaborators default to the filesystem implementations derived from the
/// [`SyncConfig`] and can be swapped with the `with_*` builders.
pub struct SyncEngine {
    config: SyncConfig,
    resolver: Box<dyn ActiveResolver>,
    variants: Box<dyn VariantSource>,
    store: Box<dyn DocumentStore>,
    backups: Box<dyn BackupStore>,
}

impl SyncEngine {
    /// Create an engine for `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` (or a section/regex error) when the
    /// settings do not validate.
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let dir = config.dir();
        let scanner = DirectoryScanner::new(dir.clone(), config.variant_regex()?)
            .excluding(config.active_link.clone());

        Ok(Self {
            resolver: Box::new(SymlinkResolver::new(dir.clone(), config.active_link.clone())),
            variants: Box::new(scanner),
            store: Box::new(FsDocumentStore::new(dir)),
            backups: Box::new(BackupManager::new(config.backups_path())),
            config,
        })
    }

    pub fn with_resolver(mut self, resolver: impl ActiveResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_variant_source(mut self, variants: impl VariantSource + 'static) -> Self {
        self.variants = Box::new(variants);
        self
    }

    pub fn with_store(mut self, store: impl DocumentStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_backup_store(mut self, backups: impl BackupStore + 'static) -> Self {
        self.backups = Box::new(backups);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run a full sync and commit when every candidate validates.
    pub fn sync(&self) -> Result<SyncReport> {
        self.sync_with_options(&SyncOptions::default())
    }

    /// Dry run: report what a sync would change.
    pub fn check(&self) -> Result<SyncReport> {
        self.sync_with_options(&SyncOptions { dry_run: true })
    }

    pub fn sync_with_options(&self, options: &SyncOptions) -> Result<SyncReport> {
        let _lock = if options.dry_run {
            None
        } else {
            Some(self.lock()?)
        };

        let mut issues = Vec::new();

        let (active_name, discovered) = self.discover()?;
        let active = discovered
            .get(&active_name)
            .ok_or_else(|| Error::ActiveUnresolved {
                reason: format!("'{active_name}' was not loaded"),
            })?;
        tracing::info!(
            active = %active_name,
            variants = discovered.len(),
            "discovered configurations"
        );

        let extracted = self.extract_phase(active, &mut issues)?;
        let merged = self.merge_phase(&discovered, active, &extracted, options, &mut issues)?;

        let errors = validate_all(
            active,
            merged.accepted.targets(&active_name),
            &self.config.sections,
        );
        let changed: Vec<String> = merged.changes.iter().map(|c| c.file.clone()).collect();

        let verdict = if !errors.is_empty() {
            tracing::warn!(errors = errors.len(), "validation failed, nothing written");
            Verdict::Rejected { errors }
        } else if options.dry_run {
            tracing::info!(changed = changed.len(), "dry run validated");
            Verdict::Previewed { changed }
        } else {
            if let Err(e) = self.commit(&discovered, &merged.accepted, &changed) {
                self.apply_retention(&merged.backups, &mut issues);
                return Err(e);
            }
            tracing::info!(changed = changed.len(), "sync committed");
            Verdict::Committed { changed }
        };
        // Backups are taken before validation, so every outcome prunes them
        let pruned = self.apply_retention(&merged.backups, &mut issues);

        Ok(SyncReport {
            active: active_name,
            verdict,
            issues,
            backups: merged.backups,
            pruned,
            changes: merged.changes,
            dry_run: options.dry_run,
        })
    }

    fn lock(&self) -> Result<RunLock> {
        Ok(RunLock::acquire(&self.config.lock_path())?)
    }

    /// Resolve the active variant and load every variant.
    fn discover(&self) -> Result<(String, ConfigSet)> {
        let active = self.resolver.resolve()?;
        let names = self.variants.variants()?;

        let matches = names.iter().filter(|name| **name == active).count();
        if matches != 1 {
            return Err(Error::ActiveUnresolved {
                reason: format!(
                    "'{active}' is not one of the discovered variants ({})",
                    names.join(", ")
                ),
            });
        }

        let set = names
            .iter()
            .map(|name| self.store.load(name))
            .collect::<Result<ConfigSet>>()?;
        Ok((active, set))
    }

    /// Pull each tracked section out of the active document.
    ///
    /// Sections that are absent or unterminated in the active document are
    /// recorded and never propagated.
    fn extract_phase(
        &self,
        active: &ConfigDocument,
        issues: &mut Vec<SyncIssue>,
    ) -> Result<Vec<Extracted>> {
        let mut extracted = Vec::new();

        for section in &self.config.sections {
            match probe(active, section)? {
                SectionStatus::Present { .. } => extracted.push(Extracted {
                    section: section.clone(),
                    body: extract(active, section)?,
                }),
                SectionStatus::Absent => {
                    tracing::warn!(
                        file = active.name(),
                        section,
                        "section missing from active configuration"
                    );
                    issues.push(SyncIssue::new(
                        active.name(),
                        Some(section),
                        IssueKind::SectionNotFound,
                        "missing from the active configuration, not propagated",
                    ));
                }
                SectionStatus::Unterminated { header } => {
                    tracing::warn!(
                        file = active.name(),
                        section,
                        header,
                        "unterminated section in active configuration"
                    );
                    issues.push(SyncIssue::new(
                        active.name(),
                        Some(section),
                        IssueKind::UnterminatedSection,
                        format!("opened at line {} and never closed, not propagated", header + 1),
                    ));
                }
            }
        }

        Ok(extracted)
    }

    /// Build a candidate for every target and back up the ones that change.
    fn merge_phase(
        &self,
        discovered: &ConfigSet,
        active: &ConfigDocument,
        extracted: &[Extracted],
        options: &SyncOptions,
        issues: &mut Vec<SyncIssue>,
    ) -> Result<MergePhase> {
        let mut accepted = discovered.clone();
        let mut changes = Vec::new();
        let mut backups = Vec::new();

        for target in discovered.targets(active.name()) {
            let Some((candidate, sections)) = self.merge_target(target, extracted, issues)? else {
                accepted = accepted.without(target.name());
                continue;
            };

            if candidate == *target {
                tracing::debug!(file = target.name(), "already in sync");
                continue;
            }

            if !options.dry_run {
                match self.backups.backup(target.name(), &target.to_content()) {
                    Ok(record) => backups.push(record),
                    Err(e) => {
                        tracing::warn!(
                            file = target.name(),
                            error = %e,
                            "backup failed, excluding file"
                        );
                        issues.push(SyncIssue::new(
                            target.name(),
                            None,
                            IssueKind::BackupFailed,
                            e.to_string(),
                        ));
                        accepted = accepted.without(target.name());
                        continue;
                    }
                }
            }

            changes.push(FileChange {
                file: target.name().to_string(),
                sections,
                diff: options.dry_run.then(|| unified_diff(target, &candidate)),
            });
            accepted = accepted.with_document(candidate);
        }

        Ok(MergePhase {
            accepted,
            changes,
            backups,
        })
    }

    /// Merge every extracted section into `target`.
    ///
    /// Returns `None` when the target has to be excluded.
    fn merge_target(
        &self,
        target: &ConfigDocument,
        extracted: &[Extracted],
        issues: &mut Vec<SyncIssue>,
    ) -> Result<Option<(ConfigDocument, Vec<SectionChange>)>> {
        let mut candidate = target.clone();
        let mut sections = Vec::new();

        for Extracted { section, body } in extracted {
            let merged = match merge(&candidate, section, body, self.config.missing_section) {
                Ok(merged) => merged,
                Err(cfgsync_sections::Error::UnterminatedSection { header, .. }) => {
                    tracing::warn!(
                        file = target.name(),
                        section,
                        header,
                        "unterminated section, excluding file"
                    );
                    issues.push(SyncIssue::new(
                        target.name(),
                        Some(section),
                        IssueKind::UnterminatedSection,
                        format!(
                            "opened at line {} and never closed, file left untouched",
                            header + 1
                        ),
                    ));
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            match merged.outcome {
                MergeOutcome::Skipped => issues.push(SyncIssue::new(
                    target.name(),
                    Some(section),
                    IssueKind::SectionNotFound,
                    "section not present, skipped",
                )),
                outcome if outcome.changed() => sections.push(SectionChange {
                    section: section.clone(),
                    outcome,
                }),
                _ => {}
            }
            candidate = merged.document;
        }

        Ok(Some((candidate, sections)))
    }

    /// Persist the changed candidates, restoring already written files when
    /// a write fails.
    fn commit(&self, original: &ConfigSet, accepted: &ConfigSet, changed: &[String]) -> Result<()> {
        let mut written: Vec<&str> = Vec::new();

        for name in changed {
            let Some(document) = accepted.get(name) else {
                continue;
            };
            if let Err(e) = self.store.save(document) {
                tracing::error!(file = %name, error = %e, "write failed, rolling back");
                self.rollback(original, &written);
                return Err(Error::CommitFailed {
                    file: name.clone(),
                    source: Box::new(e),
                });
            }
            written.push(name);
        }

        Ok(())
    }

    fn rollback(&self, original: &ConfigSet, written: &[&str]) {
        for name in written {
            let Some(document) = original.get(name) else {
                continue;
            };
            match self.store.save(document) {
                Ok(()) => tracing::info!(file = %name, "restored original content"),
                Err(e) => tracing::error!(file = %name, error = %e, "rollback failed"),
            }
        }
    }

    /// Prune the targets backed up in this run down to the retention count.
    fn apply_retention(
        &self,
        taken: &[BackupRecord],
        issues: &mut Vec<SyncIssue>,
    ) -> Vec<BackupRecord> {
        let targets: BTreeSet<&str> = taken.iter().map(|record| record.target.as_str()).collect();
        let mut pruned = Vec::new();

        for target in targets {
            match self.backups.prune(target, self.config.retention) {
                Ok(removed) => pruned.extend(removed),
                Err(e) => {
                    tracing::warn!(file = target, error = %e, "prune failed");
                    issues.push(SyncIssue::new(
                        target,
                        None,
                        IssueKind::PruneFailed,
                        e.to_string(),
                    ));
                }
            }
        }

        pruned
    }

    /// Presence and sync state of every tracked section in every variant.
    pub fn status(&self) -> Result<StatusReport> {
        let (active_name, discovered) = self.discover()?;
        let active = discovered
            .get(&active_name)
            .ok_or_else(|| Error::ActiveUnresolved {
                reason: format!("'{active_name}' was not loaded"),
            })?;

        let mut variants = Vec::with_capacity(discovered.len());
        for document in discovered.documents() {
            let mut sections = Vec::with_capacity(self.config.sections.len());
            for section in &self.config.sections {
                let status = probe(document, section)?;
                let comparable = matches!(status, SectionStatus::Present { .. })
                    && matches!(probe(active, section)?, SectionStatus::Present { .. });
                sections.push(SectionState {
                    section: section.clone(),
                    status,
                    in_sync: comparable
                        .then(|| validate_section(active, document, section).is_none()),
                });
            }
            variants.push(VariantStatus {
                file: document.name().to_string(),
                active: document.name() == active_name,
                sections,
                backups: self.backups.list(document.name())?.len(),
            });
        }

        Ok(StatusReport {
            active: active_name,
            sections: self.config.sections.clone(),
            variants,
        })
    }

    /// Backups of `target`, or of every file when `None`; oldest first.
    pub fn list_backups(&self, target: Option<&str>) -> Result<Vec<BackupRecord>> {
        match target {
            Some(target) => self.backups.list(target),
            None => self.backups.list_all(),
        }
    }

    /// Apply retention to every file with backups.
    pub fn prune_backups(&self, retention: Option<usize>) -> Result<Vec<BackupRecord>> {
        let retention = retention.unwrap_or(self.config.retention);
        if retention == 0 {
            return Err(Error::InvalidConfig {
                message: "retention must keep at least one backup".to_string(),
            });
        }
        let _lock = self.lock()?;

        let all = self.backups.list_all()?;
        let targets: BTreeSet<&str> = all.iter().map(|record| record.target.as_str()).collect();
        let mut pruned = Vec::new();
        for target in targets {
            pruned.extend(self.backups.prune(target, retention)?);
        }
        Ok(pruned)
    }

    /// Write the backup `name` back onto its target file.
    ///
    /// The target's current content is backed up first; if that backup
    /// fails nothing is written.
    pub fn restore_backup(&self, name: &str) -> Result<RestoreReport> {
        let _lock = self.lock()?;
        let (restored, content) = self.backups.load(name)?;

        let previous = if self.store.exists(&restored.target) {
            let current = self.store.load(&restored.target)?;
            Some(self.backups.backup(&restored.target, &current.to_content())?)
        } else {
            None
        };

        self.store
            .save(&ConfigDocument::parse(restored.target.clone(), &content))?;
        tracing::info!(file = %restored.target, backup = %restored.name, "restored backup");

        let pruned = match self.backups.prune(&restored.target, self.config.retention) {
            Ok(pruned) => pruned,
            Err(e) => {
                tracing::warn!(file = %restored.target, error = %e, "prune failed");
                Vec::new()
            }
        };

        Ok(RestoreReport {
            restored,
            previous,
            pruned,
        })
    }
}

fn unified_diff(before: &ConfigDocument, after: &ConfigDocument) -> String {
    let old = before.to_content();
    let new = after.to_content();
    let (old_header, new_header) = (format!("a/{}", before.name()), format!("b/{}", after.name()));
    let diff = TextDiff::from_lines(&old, &new);
    diff.unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string()
}
