//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cfgsync - Keep configuration variants in sync with the active one
#[derive(Parser, Debug)]
#[command(name = "cfgsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory holding the variants (defaults to the current directory)
    #[arg(short, long, global = true, env = "CFGSYNC_DIR")]
    pub dir: Option<PathBuf>,

    /// Settings file (defaults to cfgsync.toml in the configuration directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Propagate tracked sections from the active configuration
    ///
    /// Examples:
    ///   cfgsync sync                      # Sync every tracked section
    ///   cfgsync sync --dry-run            # Show the diffs only
    ///   cfgsync sync --section keybind    # Only propagate keybindings
    Sync {
        /// Preview changes without writing or backing up anything
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Section to propagate (repeatable; overrides the settings file)
        #[arg(short, long = "section")]
        sections: Vec<String>,

        /// Backups kept per file (overrides the settings file)
        #[arg(long)]
        retention: Option<usize>,

        /// Add sections that a variant lacks instead of skipping them
        #[arg(long)]
        append_missing: bool,
    },

    /// Exit non-zero when any variant is out of sync
    Check {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active configuration and the state of every section
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage backups
    Backups {
        #[command(subcommand)]
        action: BackupAction,
    },
}

/// Backup subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    /// List backups, newest first
    List {
        /// Only list backups of this file
        target: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a backup back onto its file
    Restore {
        /// Backup file name, e.g. 20240517093000_config.laptop.ron
        name: String,
    },

    /// Delete old backups beyond the retention count
    Prune {
        /// Backups kept per file (defaults to the configured retention)
        #[arg(long)]
        retention: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parse_sync_flags() {
        let cli = parse(&[
            "cfgsync", "--dir", "/cfg", "sync", "--dry-run", "-s", "keybind", "--section", "tags",
            "--retention", "2", "--append-missing",
        ]);
        assert_eq!(cli.dir, Some(PathBuf::from("/cfg")));
        assert_eq!(
            cli.command,
            Some(Commands::Sync {
                dry_run: true,
                json: false,
                sections: vec!["keybind".into(), "tags".into()],
                retention: Some(2),
                append_missing: true,
            })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["cfgsync", "status", "--json", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Commands::Status { json: true }));
    }

    #[test]
    fn parse_backup_actions() {
        let cli = parse(&["cfgsync", "backups", "restore", "20240101000000_config.a.ron"]);
        assert_eq!(
            cli.command,
            Some(Commands::Backups {
                action: BackupAction::Restore {
                    name: "20240101000000_config.a.ron".into()
                }
            })
        );

        let cli = parse(&["cfgsync", "backups", "list"]);
        assert_eq!(
            cli.command,
            Some(Commands::Backups {
                action: BackupAction::List {
                    target: None,
                    json: false
                }
            })
        );
    }

    #[test]
    fn restore_requires_name() {
        assert!(Cli::try_parse_from(["cfgsync", "backups", "restore"]).is_err());
    }
}
