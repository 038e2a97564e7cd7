//! The sync orchestrator: one pipeline per owner.
//!
//! A cycle runs fetch, exclusion, reconciliation and draft insertion in that
//! order. Only the fetch awaits; everything after it runs under the state lock
//! without yielding, so a cycle never interleaves with a promotion's ledger
//! update. Durable hashes are loaded when the orchestrator opens (and on
//! [`SyncOrchestrator::reload_durable`]) and kept current by promotions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::drafts::{DraftStore, TemporaryDraft};
use crate::entries::{DiaryEntry, EntryStore};
use crate::error::{PipelineError, short_error_message};
use crate::reconcile::reconcile;
use crate::settings::SyncSettings;
use crate::source::{EventSource, UpstreamUnavailable, normalize_hash};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{PipelineConfig, PipelineSnapshot, SyncOutcome, SyncReport};

#[derive(Debug, Default)]
struct PipelineState {
    drafts: DraftStore,
    last_sync_time: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Clears the in-flight flag when a cycle ends, however it ends.
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the drafts, the commit ledger and the sync status for one owner.
pub struct SyncOrchestrator<S, E> {
    source: S,
    store: E,
    config: PipelineConfig,
    settings: RwLock<SyncSettings>,
    syncing: AtomicBool,
    state: Mutex<PipelineState>,
    on_progress: Option<ProgressCallback>,
}

impl<S, E> SyncOrchestrator<S, E>
where
    S: EventSource,
    E: EntryStore,
{
    /// Build an orchestrator with an empty durable view.
    ///
    /// Most callers want [`open`](Self::open), which also loads the owner's
    /// stored commit hashes.
    pub fn new(source: S, store: E, config: PipelineConfig, settings: SyncSettings) -> Self {
        Self {
            source,
            store,
            config,
            settings: RwLock::new(settings),
            syncing: AtomicBool::new(false),
            state: Mutex::new(PipelineState::default()),
            on_progress: None,
        }
    }

    /// Build an orchestrator and load the durable commit hashes.
    pub async fn open(
        source: S,
        store: E,
        config: PipelineConfig,
        settings: SyncSettings,
    ) -> Result<Self, PipelineError> {
        let orchestrator = Self::new(source, store, config, settings);
        orchestrator.reload_durable().await?;
        Ok(orchestrator)
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &E {
        &self.store
    }

    /// Re-read the owner's stored commit hashes.
    ///
    /// Drafts for commits that were saved elsewhere in the meantime are
    /// dropped. Returns the number of durable hashes now known.
    pub async fn reload_durable(&self) -> Result<usize, PipelineError> {
        let durable: Vec<(String, Uuid)> = self
            .store
            .commit_hashes(&self.config.owner_id)
            .await?
            .into_iter()
            .map(|(hash, id)| (normalize_hash(&hash), id))
            .collect();
        let count = durable.len();

        let dropped = self.state().drafts.hydrate_durable(durable);
        tracing::debug!(
            owner = %self.config.owner_id,
            durable = count,
            dropped,
            "Loaded durable commit hashes"
        );
        Ok(count)
    }

    pub fn settings(&self) -> SyncSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings. Exclusions apply from the next cycle on.
    pub fn update_settings(&self, settings: SyncSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Run one sync cycle unless one is already in flight.
    ///
    /// A trigger that arrives mid-cycle is dropped and reported as
    /// [`SyncOutcome::Skipped`]. A failed fetch leaves drafts and the last
    /// sync time untouched and records the error.
    pub async fn trigger_sync(&self) -> SyncOutcome {
        let owner = &self.config.owner_id;
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            tracing::debug!(owner = %owner, "Sync already in progress, skipping trigger");
            self.emit(SyncProgress::SyncSkipped {
                owner: owner.clone(),
            });
            return SyncOutcome::Skipped;
        };

        self.emit(SyncProgress::SyncStarted {
            owner: owner.clone(),
        });
        let policy = self.settings().exclusion_policy();

        let fetch = self
            .source
            .fetch_recent_push_events(&self.config.identity, self.config.window_size);
        let events = match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => return self.fail(e.into()),
            Err(_) => {
                let reason = format!(
                    "fetch timed out after {}s",
                    self.config.fetch_timeout.as_secs()
                );
                return self.fail(UpstreamUnavailable::new(reason).into());
            }
        };

        let fetched = events.len();
        self.emit(SyncProgress::FetchComplete { commits: fetched });

        let kept = policy.filter(events);
        let excluded = fetched - kept.len();
        self.emit(SyncProgress::Filtered {
            kept: kept.len(),
            excluded,
        });

        let created = {
            let mut state = self.state();
            let new_drafts = reconcile(
                &kept,
                &state.drafts.durable_hashes(),
                &state.drafts.draft_hashes(),
            );
            let created = state.drafts.insert_many(new_drafts);
            state.last_sync_time = Some(Utc::now());
            state.last_error = None;
            created
        };

        if created > 0 {
            self.emit(SyncProgress::DraftsCreated { count: created });
        }
        self.emit(SyncProgress::SyncComplete {
            fetched,
            excluded,
            created,
        });
        tracing::info!(owner = %owner, fetched, excluded, created, "Sync complete");

        SyncOutcome::Completed(SyncReport {
            fetched,
            excluded,
            created,
        })
    }

    fn fail(&self, error: PipelineError) -> SyncOutcome {
        let message = short_error_message(&error);
        tracing::warn!(owner = %self.config.owner_id, error = %message, "Sync failed");
        self.state().last_error = Some(message.clone());
        self.emit(SyncProgress::SyncFailed { error: message });
        SyncOutcome::Failed(error)
    }

    /// Discard a draft. Its commit may come back as a draft on a later sync.
    pub fn dismiss_draft(&self, id: Uuid) -> Result<TemporaryDraft, PipelineError> {
        let draft = self.state().drafts.dismiss(id)?;
        tracing::debug!(hash = %draft.commit_hash, "Dismissed draft");
        self.emit(SyncProgress::DraftDismissed {
            commit_hash: draft.commit_hash.clone(),
        });
        Ok(draft)
    }

    /// Save a draft as a durable entry.
    ///
    /// The draft is only removed once the store confirms the create. If the
    /// create fails the draft stays listed and can be promoted again.
    pub async fn promote_draft(&self, id: Uuid) -> Result<DiaryEntry, PipelineError> {
        let draft = self.state().drafts.begin_promotion(id)?;

        match self
            .store
            .create(&self.config.owner_id, draft.to_new_entry())
            .await
        {
            Ok(entry) => {
                self.state().drafts.complete_promotion(id, entry.id)?;
                tracing::info!(hash = %draft.commit_hash, entry = %entry.id, "Promoted draft");
                self.emit(SyncProgress::DraftPromoted {
                    commit_hash: draft.commit_hash,
                    entry_id: entry.id,
                });
                Ok(entry)
            }
            Err(e) => {
                if let Err(abort) = self.state().drafts.abort_promotion(id) {
                    tracing::warn!(error = %abort, "Failed to release draft after promotion error");
                }
                let message = short_error_message(&e);
                tracing::warn!(hash = %draft.commit_hash, error = %message, "Promotion failed");
                self.emit(SyncProgress::PromotionFailed {
                    commit_hash: draft.commit_hash,
                    error: message,
                });
                Err(e.into())
            }
        }
    }

    /// Drafts in display order, most recent first.
    pub fn drafts(&self) -> Vec<TemporaryDraft> {
        self.state().drafts.drafts().cloned().collect()
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.state().last_sync_time
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let state = self.state();
        PipelineSnapshot {
            drafts: state.drafts.drafts().cloned().collect(),
            last_sync_time: state.last_sync_time,
            is_syncing: self.is_syncing(),
            last_error: state.last_error.clone(),
        }
    }

    pub(crate) fn emit(&self, event: SyncProgress) {
        emit(self.on_progress.as_ref(), event);
    }

    fn state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
