//! Backup list, restore and prune commands

use std::collections::BTreeMap;

use colored::Colorize;

use cfgsync_core::{BackupRecord, SyncConfig, SyncEngine};

use crate::error::Result;

/// List backups grouped by file, newest first
pub fn run_list(config: SyncConfig, target: Option<&str>, json: bool) -> Result<()> {
    let engine = SyncEngine::new(config)?;
    let records = engine.list_backups(target)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No backups".dimmed());
        return Ok(());
    }

    let mut by_target: BTreeMap<&str, Vec<&BackupRecord>> = BTreeMap::new();
    for record in &records {
        by_target.entry(&record.target).or_default().push(record);
    }

    for (target, records) in by_target {
        println!("{}:", target.cyan().bold());
        for record in records.iter().rev() {
            println!(
                "   {}  {}  {}",
                record.created.format("%Y-%m-%d %H:%M:%S"),
                record.name,
                short_checksum(&record.checksum).dimmed()
            );
        }
    }
    Ok(())
}

/// Restore a backup onto its file
pub fn run_restore(config: SyncConfig, name: &str) -> Result<()> {
    println!("{} Restoring {}...", "=>".blue().bold(), name.cyan());

    let engine = SyncEngine::new(config)?;
    let report = engine.restore_backup(name)?;

    if let Some(previous) = &report.previous {
        println!("   {} previous content saved as {}", "*".dimmed(), previous.name.dimmed());
    }
    for record in &report.pruned {
        println!("   {} pruned {}", "-".dimmed(), record.name.dimmed());
    }
    println!(
        "{} Restored {} from {}.",
        "OK".green().bold(),
        report.restored.target.cyan(),
        report.restored.name
    );
    Ok(())
}

/// Apply retention to every file's backups
pub fn run_prune(config: SyncConfig, retention: Option<usize>) -> Result<()> {
    let engine = SyncEngine::new(config)?;
    let pruned = engine.prune_backups(retention)?;

    if pruned.is_empty() {
        println!("{} Nothing to prune.", "OK".green().bold());
    } else {
        println!("{} Pruned {} backup(s):", "OK".green().bold(), pruned.len());
        for record in &pruned {
            println!("   {} {}", "-".red(), record.name);
        }
    }
    Ok(())
}

fn short_checksum(checksum: &str) -> &str {
    let hex = checksum.strip_prefix("sha256:").unwrap_or(checksum);
    hex.get(..12).unwrap_or(hex)
}
