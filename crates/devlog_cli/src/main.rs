//! Devlog CLI - command-line front end for the commit-to-diary pipeline.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::entries::EntriesAction;
use crate::commands::settings::SettingsAction;
use crate::commands::sync::SyncArgs;
use crate::commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "devlog")]
#[command(version)]
#[command(about = "Turn your pushed commits into diary drafts")]
#[command(
    long_about = "Devlog watches your recent GitHub push activity and turns every commit it \
has not seen before into a draft diary entry. Drafts live only in memory until you save \
them; saved entries are kept in a local database."
)]
#[command(after_long_help = r#"EXAMPLES
    Fetch recent pushes and show the new drafts:
        $ devlog sync

    Save two of them:
        $ devlog sync --save abc123 --save def456

    Keep syncing on the configured interval:
        $ devlog watch

    Stop ingesting a repository:
        $ devlog settings exclude my-org/scratch

CONFIGURATION
    Devlog reads configuration from:
      1. ~/.config/devlog/config.toml (or $XDG_CONFIG_HOME/devlog/config.toml)
      2. ./devlog.toml
      3. Environment variables (DEVLOG_* prefix, e.g., DEVLOG_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    DEVLOG_DATABASE_URL      Database connection string (default: ~/.local/state/devlog/devlog.db)
    DEVLOG_GITHUB_LOGIN      GitHub login whose pushes are ingested
    DEVLOG_GITHUB_TOKEN      GitHub personal access token
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync once and list the new drafts
    Sync(SyncArgs),
    /// Sync now and then periodically until interrupted
    Watch(WatchArgs),
    /// Manage saved entries
    Entries {
        #[command(subcommand)]
        action: EntriesAction,
    },
    /// Show or edit sync settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Drop all tables and reapply migrations
    Fresh {
        /// Confirm that all saved entries will be lost
        #[arg(long)]
        yes: bool,
    },
}

/// Create the parent directory of a `sqlite://` database file.
fn prepare_sqlite_path(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    let db_path = std::path::Path::new(db_path);

    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let shutdown = shutdown::setup_shutdown_handler();

    // Structured logging only when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("devlog=info,devlog_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();
    let cli = Cli::parse();

    // Commands that don't need the database
    match cli.command {
        Commands::Completions { shell } => return commands::meta::handle_completions(shell),
        Commands::Man { output } => return commands::meta::handle_man(output),
        Commands::Settings { action } => {
            return commands::settings::handle_settings(action, &config);
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database location; set DEVLOG_DATABASE_URL")?;
    prepare_sqlite_path(&database_url)?;

    match cli.command {
        Commands::Sync(args) => {
            commands::sync::handle_sync(args, &config, &database_url).await?;
        }
        Commands::Watch(args) => {
            commands::watch::handle_watch(args, &config, &database_url, shutdown).await?;
        }
        Commands::Entries { action } => {
            commands::entries::handle_entries(action, &config, &database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } | Commands::Settings { .. } => {}
    }

    Ok(())
}
