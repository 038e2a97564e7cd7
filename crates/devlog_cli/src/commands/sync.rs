//! One-shot sync: fetch, reconcile, show the new drafts and optionally save
//! some of them.

use console::{Term, style};
use devlog::SyncOutcome;

use crate::commands::shared::{OutputFormat, Pipeline, open_pipeline, print_drafts, select_drafts};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::is_shutdown_requested;

/// Options for `devlog sync`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SyncArgs {
    /// Save the drafts for these commits (hash prefixes) as entries
    #[arg(short, long = "save", value_name = "HASH")]
    save: Vec<String>,

    /// Save every new draft as an entry
    #[arg(short = 'A', long, conflicts_with = "save")]
    save_all: bool,

    /// Output format for the draft listing
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let reporter = ProgressReporter::new();
    let pipeline = open_pipeline(config, database_url, Some(reporter.into_callback())).await?;

    match pipeline.trigger_sync().await {
        SyncOutcome::Completed(_) | SyncOutcome::Skipped => {}
        SyncOutcome::Failed(e) => return Err(Box::new(e)),
    }

    let drafts = pipeline.drafts();
    print_drafts(&drafts, args.output)?;

    let to_save: Vec<_> = if args.save_all {
        drafts.iter().collect()
    } else {
        select_drafts(&drafts, &args.save)
    };
    if !to_save.is_empty() {
        let ids = to_save.iter().map(|d| d.id).collect::<Vec<_>>();
        save_drafts(&pipeline, &ids).await?;
    }

    Ok(())
}

/// Promote drafts one by one, stopping early on Ctrl+C.
pub(crate) async fn save_drafts(
    pipeline: &Pipeline,
    ids: &[uuid::Uuid],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut saved = 0usize;
    let mut failed = 0usize;

    for id in ids {
        if is_shutdown_requested() {
            tracing::warn!(remaining = ids.len() - saved - failed, "Stopping before saving remaining drafts");
            break;
        }
        match pipeline.promote_draft(*id).await {
            Ok(_) => saved += 1,
            Err(e) => {
                failed += 1;
                tracing::debug!(error = %e, "Promotion failed");
            }
        }
    }

    if Term::stdout().is_term() {
        println!(
            "{} Saved {} of {} drafts",
            style("✓").green(),
            saved,
            ids.len()
        );
    } else {
        tracing::info!(saved, failed, "Saved drafts");
    }

    if failed > 0 {
        return Err(format!("{} drafts could not be saved", failed).into());
    }
    Ok(())
}
