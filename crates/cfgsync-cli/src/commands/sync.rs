//! Sync and check command implementations

use colored::Colorize;

use cfgsync_core::{IssueKind, SyncConfig, SyncEngine, SyncOptions, SyncReport, Verdict};

use crate::error::{CliError, Result};

/// Run the sync command
///
/// Exits with an error when validation rejects the run.
pub fn run_sync(config: SyncConfig, dry_run: bool, json: bool) -> Result<()> {
    let engine = SyncEngine::new(config)?;

    if !json {
        let what = if dry_run { "Previewing sync" } else { "Synchronizing sections" };
        println!("{} {}...", "=>".blue().bold(), what);
    }

    let report = engine.sync_with_options(&SyncOptions { dry_run })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_rejected() {
        return Err(CliError::user(format!(
            "Synchronization rejected: {} section(s) failed validation",
            report.errors().len()
        )));
    }
    Ok(())
}

/// Run the check command
///
/// A dry run that fails when any variant would change.
pub fn run_check(config: SyncConfig, json: bool) -> Result<()> {
    let engine = SyncEngine::new(config)?;

    if !json {
        println!("{} Checking configuration variants...", "=>".blue().bold());
    }

    let report = engine.check()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_in_sync() {
        print_issues(&report);
        println!("{} All variants match {}.", "OK".green().bold(), report.active.cyan());
    } else {
        print_report(&report);
    }

    if report.is_rejected() {
        return Err(CliError::user("Merged sections would fail validation"));
    }
    if !report.is_in_sync() {
        return Err(CliError::user(format!(
            "{} variant(s) out of sync; run `cfgsync sync` to update them",
            report.changes.len()
        )));
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("   Active: {}", report.active.cyan());
    print_issues(report);

    match &report.verdict {
        Verdict::Committed { changed } if changed.is_empty() => {
            println!("{} Already synchronized. No changes needed.", "OK".green().bold());
        }
        Verdict::Committed { .. } => {
            println!("{} Synchronization complete:", "OK".green().bold());
            print_changes(report);
            for record in &report.backups {
                println!("   {} backup {}", "*".dimmed(), record.name.dimmed());
            }
            for record in &report.pruned {
                println!("   {} pruned {}", "-".dimmed(), record.name.dimmed());
            }
        }
        Verdict::Previewed { changed } if changed.is_empty() => {
            println!("{} Nothing would change.", "OK".green().bold());
        }
        Verdict::Previewed { .. } => {
            println!("{} Would update:", "DRY-RUN".yellow().bold());
            print_changes(report);
            for change in &report.changes {
                if let Some(diff) = &change.diff {
                    println!();
                    print_diff(diff);
                }
            }
        }
        Verdict::Rejected { errors } => {
            println!("{} Validation failed, nothing written:", "ERROR".red().bold());
            for error in errors {
                println!("   {} {}", "!".red(), error);
            }
        }
    }
}

fn print_changes(report: &SyncReport) {
    for change in &report.changes {
        let sections: Vec<&str> = change.sections.iter().map(|s| s.section.as_str()).collect();
        println!("   {} {} ({})", "+".green(), change.file.cyan(), sections.join(", "));
    }
}

fn print_issues(report: &SyncReport) {
    for issue in &report.issues {
        let label = match issue.kind {
            IssueKind::SectionNotFound => "SKIP".yellow().bold(),
            IssueKind::PruneFailed => "WARN".yellow().bold(),
            IssueKind::UnterminatedSection | IssueKind::BackupFailed => "EXCLUDED".red().bold(),
        };
        println!("{label} {issue}");
    }
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        let line = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{line}");
    }
}
