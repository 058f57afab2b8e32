//! cfgsync CLI
//!
//! Propagates tracked sections from the active configuration variant to the
//! others, with backups and validation.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{BackupAction, Cli, Commands};
use context::{Context, Overrides};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} Configuration section sync", "cfgsync".green().bold());
        println!();
        println!("Run {} for available commands.", "cfgsync --help".cyan());
        return Ok(());
    };

    let context = Context::new(cli.dir, cli.config)?;
    execute_command(&context, command)
}

/// Log to stderr: `debug` with `-v`, otherwise `RUST_LOG` or `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("verbose mode enabled");
}

fn execute_command(context: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Sync {
            dry_run,
            json,
            sections,
            retention,
            append_missing,
        } => {
            let overrides = Overrides {
                sections,
                retention,
                append_missing,
            };
            commands::run_sync(context.load(&overrides)?, dry_run, json)
        }
        Commands::Check { json } => {
            commands::run_check(context.load(&Overrides::default())?, json)
        }
        Commands::Status { json } => {
            commands::run_status(context.load(&Overrides::default())?, json)
        }
        Commands::Backups { action } => {
            let config = context.load(&Overrides::default())?;
            match action {
                BackupAction::List { target, json } => {
                    commands::run_list(config, target.as_deref(), json)
                }
                BackupAction::Restore { name } => commands::run_restore(config, &name),
                BackupAction::Prune { retention } => commands::run_prune(config, retention),
            }
        }
    }
}
