//! Pipeline configuration and sync result types.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::drafts::TemporaryDraft;
use crate::error::PipelineError;
use crate::source::{DEFAULT_WINDOW_SIZE, Identity};

/// Default upper bound on a single upstream fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Explicit configuration handed to the orchestrator at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Owner whose durable entries the drafts are reconciled against.
    pub owner_id: String,
    /// Upstream identity whose events are fetched.
    pub identity: Identity,
    /// Number of upstream events requested per cycle.
    pub window_size: usize,
    /// Caller-imposed timeout on the upstream fetch.
    pub fetch_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(owner_id: impl Into<String>, identity: Identity) -> Self {
        Self {
            owner_id: owner_id.into(),
            identity,
            window_size: DEFAULT_WINDOW_SIZE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }
}

/// Counts from a completed sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Commits returned by the event source.
    pub fetched: usize,
    /// Commits dropped by the exclusion policy.
    pub excluded: usize,
    /// Drafts created.
    pub created: usize,
}

/// Result of one call to `trigger_sync`.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Another sync was in flight; nothing happened.
    Skipped,
    /// The cycle fetched and reconciled successfully.
    Completed(SyncReport),
    /// The cycle aborted; no state besides the last error changed.
    Failed(PipelineError),
}

impl SyncOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn report(&self) -> Option<SyncReport> {
        match self {
            Self::Completed(report) => Some(*report),
            _ => None,
        }
    }
}

/// Read-only view of the pipeline for UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSnapshot {
    pub drafts: Vec<TemporaryDraft>,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub is_syncing: bool,
    pub last_error: Option<String>,
}
