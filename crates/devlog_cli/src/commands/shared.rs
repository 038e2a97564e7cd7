//! Pieces shared by the pipeline commands: client and pipeline construction,
//! draft rendering.

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use devlog::github::GitHubClient;
use devlog::http::reqwest_transport::ReqwestTransport;
use devlog::sync::{PipelineConfig, ProgressCallback, SyncOrchestrator};
use devlog::{Identity, SeaOrmEntryStore, SyncSettings, TemporaryDraft, db};

use crate::config::Config;
use crate::progress::short_hash;

pub(crate) type Pipeline = SyncOrchestrator<GitHubClient, SeaOrmEntryStore>;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// The configured GitHub login, which doubles as the entry owner.
pub(crate) fn require_login(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    config.github_login().ok_or_else(|| {
        "No GitHub login configured. Set [github] login in devlog.toml or DEVLOG_GITHUB_LOGIN."
            .into()
    })
}

pub(crate) fn load_settings(config: &Config) -> (SyncSettings, Option<PathBuf>) {
    let path = config.settings_path();
    let settings = path
        .as_deref()
        .map(SyncSettings::load)
        .unwrap_or_default();
    (settings, path)
}

fn github_client(config: &Config) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let transport = ReqwestTransport::with_timeout(config.fetch_timeout())?;
    let client = GitHubClient::new(Arc::new(transport));
    Ok(match &config.github.api_base {
        Some(api_base) => client.with_api_base(api_base.clone()),
        None => client,
    })
}

/// Connect to the database and open the pipeline for the configured login.
pub(crate) async fn open_pipeline(
    config: &Config,
    database_url: &str,
    on_progress: Option<ProgressCallback>,
) -> Result<Arc<Pipeline>, Box<dyn std::error::Error>> {
    let login = require_login(config)?;
    if config.github_token().is_none() {
        tracing::warn!("No GitHub token configured; the events API will reject requests");
    }

    let db = db::connect(database_url).await?;
    let store = SeaOrmEntryStore::new(db);
    let (settings, _) = load_settings(config);

    let pipeline_config = PipelineConfig::new(&login, Identity::new(&login, config.github_token()))
        .with_window_size(config.sync.window_size)
        .with_fetch_timeout(config.fetch_timeout());

    let mut pipeline =
        SyncOrchestrator::open(github_client(config)?, store, pipeline_config, settings).await?;
    if let Some(cb) = on_progress {
        pipeline = pipeline.with_progress(cb);
    }
    Ok(Arc::new(pipeline))
}

/// Table row for a draft.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct DraftRow {
    #[tabled(rename = "Commit")]
    commit: String,
    #[tabled(rename = "Repository")]
    repo: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Pushed")]
    pushed: String,
}

impl From<&TemporaryDraft> for DraftRow {
    fn from(draft: &TemporaryDraft) -> Self {
        Self {
            commit: short_hash(&draft.commit_hash).to_string(),
            repo: draft.commit_repo.clone(),
            title: draft.title.clone(),
            tags: draft.tags.join(", "),
            pushed: draft.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

pub(crate) fn print_drafts(
    drafts: &[TemporaryDraft],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            if drafts.is_empty() {
                println!("No new drafts.");
                return Ok(());
            }
            let rows: Vec<DraftRow> = drafts.iter().map(DraftRow::from).collect();
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(drafts)?);
        }
    }
    Ok(())
}

/// Drafts whose commit hash starts with one of `prefixes`.
pub(crate) fn select_drafts<'a>(
    drafts: &'a [TemporaryDraft],
    prefixes: &[String],
) -> Vec<&'a TemporaryDraft> {
    drafts
        .iter()
        .filter(|d| {
            prefixes
                .iter()
                .any(|p| !p.is_empty() && d.commit_hash.starts_with(&p.to_ascii_lowercase()))
        })
        .collect()
}
