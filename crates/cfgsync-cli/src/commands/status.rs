//! Status command implementation

use colored::Colorize;

use cfgsync_core::{SectionState, SyncConfig, SyncEngine};
use cfgsync_sections::SectionStatus;

use crate::error::Result;

/// Run the status command
pub fn run_status(config: SyncConfig, json: bool) -> Result<()> {
    let dir = config.dir();
    let engine = SyncEngine::new(config)?;
    let status = engine.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Configuration Status".bold());
    println!();
    println!("{}:      {}", "Path".dimmed(), dir);
    println!("{}:    {}", "Active".dimmed(), status.active.cyan());
    println!("{}:  {}", "Sections".dimmed(), status.sections.join(", "));
    println!();

    println!("{}:", "Variants".bold());
    for variant in &status.variants {
        let marker = if variant.active {
            "*".green().bold()
        } else if variant.is_out_of_sync() {
            "!".yellow().bold()
        } else {
            "+".green()
        };
        let backups = match variant.backups {
            0 => String::new(),
            1 => " (1 backup)".dimmed().to_string(),
            n => format!(" ({n} backups)").dimmed().to_string(),
        };
        println!("  {} {}{}", marker, variant.file.cyan(), backups);
        for state in &variant.sections {
            println!("      {:<16} {}", state.section, describe(state));
        }
    }

    Ok(())
}

fn describe(state: &SectionState) -> colored::ColoredString {
    match (&state.status, state.in_sync) {
        (SectionStatus::Present { lines, .. }, Some(true)) => {
            format!("in sync ({lines} lines)").green()
        }
        (SectionStatus::Present { lines, .. }, Some(false)) => {
            format!("differs ({lines} lines)").yellow()
        }
        (SectionStatus::Present { lines, .. }, None) => {
            format!("present ({lines} lines)").normal()
        }
        (SectionStatus::Absent, _) => "absent".dimmed(),
        (SectionStatus::Unterminated { header }, _) => {
            format!("unterminated (line {})", header + 1).red()
        }
    }
}
