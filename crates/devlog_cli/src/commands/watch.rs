//! Watch mode: sync now, then on the configured interval until Ctrl+C.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use devlog::SyncSettings;
use devlog::sync::{TokioScheduler, spawn_auto_sync};
use tokio::sync::watch;

use crate::commands::shared::{OutputFormat, Pipeline, load_settings, open_pipeline, print_drafts};
use crate::config::Config;
use crate::progress::ProgressReporter;

/// How often the settings file is re-read while watching.
const SETTINGS_RELOAD_INTERVAL: Duration = Duration::from_secs(30);

/// Options for `devlog watch`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WatchArgs {
    /// Don't run a sync on startup; wait for the first interval
    #[arg(long)]
    no_initial_sync: bool,
}

pub(crate) async fn handle_watch(
    args: WatchArgs,
    config: &Config,
    database_url: &str,
    shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reporter = ProgressReporter::new();
    let pipeline = open_pipeline(config, database_url, Some(reporter.into_callback())).await?;

    let settings = pipeline.settings();
    tracing::info!(
        interval_minutes = settings.sync_interval_minutes,
        auto_sync = settings.auto_sync_enabled,
        excluded = settings.excluded_repos.len(),
        "Watching for pushes"
    );

    if !args.no_initial_sync {
        pipeline.trigger_sync().await;
    }

    let (_, settings_path) = load_settings(config);
    let reload = settings_path.map(|path| {
        tokio::spawn(reload_settings(
            Arc::clone(&pipeline),
            path,
            shutdown.clone(),
        ))
    });

    spawn_auto_sync(Arc::clone(&pipeline), TokioScheduler, shutdown).await?;
    if let Some(reload) = reload {
        reload.await?;
    }

    print_drafts(&pipeline.drafts(), OutputFormat::Table)?;
    if let Some(error) = pipeline.last_error() {
        tracing::warn!(error = %error, "Last sync failed");
    }
    Ok(())
}

/// Pick up edits to the settings file while the watch runs.
async fn reload_settings(
    pipeline: Arc<Pipeline>,
    path: impl AsRef<Path>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(SETTINGS_RELOAD_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = interval.tick() => {}
        }

        let latest = SyncSettings::load(path.as_ref());
        if latest != pipeline.settings() {
            tracing::info!("Sync settings changed, applying");
            pipeline.update_settings(latest);
        }
    }
}
