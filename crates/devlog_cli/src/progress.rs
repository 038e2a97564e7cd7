//! Progress reporting for sync operations.
//!
//! Two modes, picked by whether stdout is a terminal:
//! - Interactive mode (TTY): short styled status lines on stderr
//! - Logging mode (non-TTY): structured logging using tracing

use console::{Term, style};
use devlog::sync::{ProgressCallback, SyncProgress};

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Styled status lines for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter)
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(reporter) => reporter.handle(event),
            Self::Logging(reporter) => reporter.handle(event),
        }
    }

    /// Box this reporter as an orchestrator progress callback.
    pub fn into_callback(self) -> ProgressCallback {
        Box::new(move |event| self.handle(event))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes one line per notable event to stderr.
pub struct InteractiveReporter {
    term: Term,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, text: String) {
        let _ = self.term.write_line(&text);
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::SyncStarted { owner } => {
                self.line(format!("{} Syncing push events for {}", style("→").cyan(), owner));
            }
            SyncProgress::SyncComplete {
                fetched,
                excluded,
                created,
            } => {
                self.line(format!(
                    "{} {} commits, {} excluded, {} new drafts",
                    style("✓").green(),
                    fetched,
                    excluded,
                    style(created).bold()
                ));
            }
            SyncProgress::SyncFailed { error } => {
                self.line(format!("{} Sync failed: {}", style("✗").red(), error));
            }
            SyncProgress::SyncSkipped { .. } => {
                self.line(format!("{} Sync already running", style("·").dim()));
            }
            SyncProgress::DraftPromoted { commit_hash, .. } => {
                self.line(format!("{} Saved {}", style("✓").green(), short_hash(&commit_hash)));
            }
            SyncProgress::PromotionFailed { commit_hash, error } => {
                self.line(format!(
                    "{} Could not save {}: {}",
                    style("✗").red(),
                    short_hash(&commit_hash),
                    error
                ));
            }
            _ => {}
        }
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::SyncStarted { owner } => {
                tracing::info!(owner = %owner, "Sync started");
            }
            SyncProgress::SyncSkipped { owner } => {
                tracing::debug!(owner = %owner, "Sync skipped, already running");
            }
            SyncProgress::FetchComplete { commits } => {
                tracing::debug!(commits, "Fetch complete");
            }
            SyncProgress::Filtered { kept, excluded } => {
                tracing::debug!(kept, excluded, "Applied exclusions");
            }
            SyncProgress::DraftsCreated { count } => {
                tracing::info!(created = count, "New drafts");
            }
            SyncProgress::SyncComplete {
                fetched,
                excluded,
                created,
            } => {
                tracing::info!(fetched, excluded, created, "Sync complete");
            }
            SyncProgress::SyncFailed { error } => {
                tracing::warn!(error = %error, "Sync failed");
            }
            SyncProgress::AutoSyncPaused => {
                tracing::debug!("Auto-sync disabled, tick ignored");
            }
            SyncProgress::DraftPromoted {
                commit_hash,
                entry_id,
            } => {
                tracing::info!(hash = %commit_hash, entry = %entry_id, "Draft saved");
            }
            SyncProgress::PromotionFailed { commit_hash, error } => {
                tracing::error!(hash = %commit_hash, error = %error, "Failed to save draft");
            }
            SyncProgress::DraftDismissed { commit_hash } => {
                tracing::debug!(hash = %commit_hash, "Draft dismissed");
            }
            _ => {}
        }
    }
}

/// First seven characters of a commit hash.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
