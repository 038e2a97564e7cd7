//! Viewing and editing the sync settings file.

use clap::Subcommand;
use devlog::SyncSettings;
use devlog::settings::MAX_SYNC_INTERVAL_MINUTES;

use crate::commands::shared::load_settings;
use crate::config::Config;

/// Settings subcommands.
#[derive(Subcommand)]
pub(crate) enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Change auto-sync or its interval
    Set {
        /// Turn periodic sync on or off
        #[arg(long)]
        auto_sync: Option<bool>,

        /// Minutes between periodic syncs
        #[arg(
            long,
            value_parser = clap::value_parser!(u64).range(1..=MAX_SYNC_INTERVAL_MINUTES)
        )]
        interval: Option<u64>,
    },
    /// Stop ingesting commits from these repositories (owner/name)
    Exclude {
        #[arg(required = true)]
        repos: Vec<String>,
    },
    /// Resume ingesting commits from these repositories
    Include {
        #[arg(required = true)]
        repos: Vec<String>,
    },
}

/// Apply an edit to `settings`. Returns whether anything changed.
fn apply(settings: &mut SyncSettings, action: SettingsAction) -> bool {
    let before = settings.clone();
    match action {
        SettingsAction::Show => {}
        SettingsAction::Set {
            auto_sync,
            interval,
        } => {
            if let Some(enabled) = auto_sync {
                settings.auto_sync_enabled = enabled;
            }
            if let Some(minutes) = interval {
                settings.sync_interval_minutes = minutes;
            }
        }
        SettingsAction::Exclude { repos } => {
            settings
                .excluded_repos
                .extend(repos.into_iter().map(|r| r.trim().to_string()));
        }
        SettingsAction::Include { repos } => {
            for repo in repos {
                settings.excluded_repos.remove(repo.trim());
            }
        }
    }
    *settings != before
}

pub(crate) fn handle_settings(
    action: SettingsAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut settings, path) = load_settings(config);
    let path = path.ok_or("Could not determine the settings file location")?;

    if apply(&mut settings, action) {
        settings.save(&path)?;
        tracing::info!(path = %path.display(), "Saved sync settings");
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
