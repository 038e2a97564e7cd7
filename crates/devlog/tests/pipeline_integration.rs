//! Integration tests for the pipeline against a migrated SQLite store.
//!
//! Key scenarios tested:
//! - Entry store CRUD is scoped to its owner
//! - The unique (owner, commit) constraint holds at the store boundary
//! - Promoted drafts survive a restart and never reappear as drafts
//! - Auto-sync ticks route through the same single-flight entry point

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use devlog::sync::{ManualScheduler, PipelineConfig, SyncOrchestrator, spawn_auto_sync};
use devlog::{
    CommitEvent, EntryPatch, EntryStore, EntryStoreError, EventSource, Identity, NewEntry,
    SeaOrmEntryStore, SyncSettings, UpstreamUnavailable, connect_and_migrate,
};
use tokio::sync::watch;

/// If exceeded, there's likely a hang.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

const OWNER: &str = "octocat";

async fn setup_store() -> Arc<SeaOrmEntryStore> {
    let db = connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Arc::new(SeaOrmEntryStore::new(db))
}

/// Source that always returns the same commits.
struct FixedSource {
    commits: Vec<CommitEvent>,
    calls: AtomicUsize,
}

impl FixedSource {
    fn new(commits: Vec<CommitEvent>) -> Self {
        Self {
            commits,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EventSource for FixedSource {
    async fn fetch_recent_push_events(
        &self,
        _identity: &Identity,
        window_size: usize,
    ) -> Result<Vec<CommitEvent>, UpstreamUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.commits.iter().take(window_size).cloned().collect())
    }
}

fn commits() -> Vec<CommitEvent> {
    let pushed = Utc.with_ymd_and_hms(2026, 10, 5, 11, 0, 0).unwrap();
    vec![
        CommitEvent::new("zzz999", "org/ignored", "feat: secret work", pushed),
        CommitEvent::new("abc123", "org/kept", "feat: add login", pushed),
        CommitEvent::new("def456", "org/kept", "fix: crash on logout\n\nNull session.", pushed),
    ]
}

fn config() -> PipelineConfig {
    PipelineConfig::new(OWNER, Identity::new(OWNER, Some("token".to_string())))
}

fn settings() -> SyncSettings {
    SyncSettings {
        excluded_repos: ["org/ignored".to_string()].into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_entry_store_crud_is_owner_scoped() {
    let store = setup_store().await;

    let entry = store
        .create(
            OWNER,
            NewEntry {
                title: "Wrote the parser".to_string(),
                content: "Recursive descent.".to_string(),
                tags: vec!["notes".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(store.query("someone-else").await.unwrap().is_empty());

    let updated = store
        .update(
            OWNER,
            entry.id,
            EntryPatch {
                title: Some("Finished the parser".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Finished the parser");
    assert_eq!(updated.tags, vec!["notes"]);

    let err = store.delete("someone-else", entry.id).await.unwrap_err();
    assert!(matches!(err, EntryStoreError::NotFound { .. }));

    store.delete(OWNER, entry.id).await.unwrap();
    assert!(store.query(OWNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_commit_is_rejected() {
    let store = setup_store().await;
    let entry = NewEntry {
        title: "feat: add login".to_string(),
        commit_hash: Some("abc123".to_string()),
        commit_repo: Some("org/kept".to_string()),
        ..Default::default()
    };

    store.create(OWNER, entry.clone()).await.unwrap();
    let err = store.create(OWNER, entry.clone()).await.unwrap_err();
    assert!(matches!(err, EntryStoreError::DuplicateCommit { .. }));

    // Another owner may log the same commit.
    store.create("hubot", entry).await.unwrap();
}

#[tokio::test]
async fn test_promoted_draft_survives_restart() {
    let store = setup_store().await;
    let source = Arc::new(FixedSource::new(commits()));

    let pipeline = SyncOrchestrator::open(Arc::clone(&source), Arc::clone(&store), config(), settings())
        .await
        .unwrap();
    let report = pipeline.trigger_sync().await.report().unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.excluded, 1);
    assert_eq!(report.created, 2);

    let login = pipeline
        .drafts()
        .into_iter()
        .find(|d| d.commit_hash == "abc123")
        .unwrap();
    assert_eq!(login.tags, vec!["commit", "auto-generated", "feature"]);
    let entry = pipeline.promote_draft(login.id).await.unwrap();
    assert_eq!(entry.commit_repo.as_deref(), Some("org/kept"));
    assert_eq!(entry.created_at, login.created_at);

    // A fresh pipeline over the same store only drafts the unsaved commit.
    let restarted = SyncOrchestrator::open(Arc::clone(&source), Arc::clone(&store), config(), settings())
        .await
        .unwrap();
    restarted.trigger_sync().await;
    let hashes: Vec<_> = restarted
        .drafts()
        .into_iter()
        .map(|d| d.commit_hash)
        .collect();
    assert_eq!(hashes, vec!["def456"]);

    let stored = store.query(OWNER).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].commit_hash.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_draft_from_message_with_blank_first_line_can_be_saved() {
    let store = setup_store().await;
    let pushed = Utc.with_ymd_and_hms(2026, 10, 5, 11, 0, 0).unwrap();
    let source = FixedSource::new(vec![CommitEvent::new(
        "0ddba11",
        "org/kept",
        "\nfeat: body only",
        pushed,
    )]);
    let pipeline = SyncOrchestrator::open(source, Arc::clone(&store), config(), settings())
        .await
        .unwrap();

    pipeline.trigger_sync().await;
    let draft = pipeline.drafts().pop().unwrap();
    assert_eq!(draft.title, "feat: body only");

    let entry = pipeline.promote_draft(draft.id).await.unwrap();
    assert_eq!(entry.title, "feat: body only");
    assert!(pipeline.drafts().is_empty());
    assert_eq!(store.query(OWNER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_auto_sync_ticks_create_drafts_once() {
    let store = setup_store().await;
    let source = Arc::new(FixedSource::new(commits()));
    let pipeline = Arc::new(
        SyncOrchestrator::open(Arc::clone(&source), store, config(), settings())
            .await
            .unwrap(),
    );
    let (trigger, scheduler) = ManualScheduler::channel();
    let (_stop, shutdown) = watch::channel(false);

    let handle = spawn_auto_sync(Arc::clone(&pipeline), scheduler, shutdown);
    for _ in 0..3 {
        assert!(trigger.fire().await);
    }
    drop(trigger);

    tokio::time::timeout(TEST_TIMEOUT, handle)
        .await
        .expect("auto-sync loop should stop when the trigger is dropped")
        .unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(pipeline.drafts().len(), 2);
    assert!(pipeline.last_sync_time().is_some());
}
