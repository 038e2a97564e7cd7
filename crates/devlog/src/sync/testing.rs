//! In-memory collaborators for orchestrator and scheduler tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::entries::{DiaryEntry, EntryPatch, EntryStoreError, NewEntry};
use crate::source::{CommitEvent, EventSource, Identity, UpstreamUnavailable};

pub(crate) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 5, hour, 0, 0).unwrap()
}

pub(crate) fn commit(hash: &str, repo: &str, message: &str, hour: u32) -> CommitEvent {
    CommitEvent::new(hash, repo, message, at(hour))
}

/// Source that replays scripted responses, repeating the last one.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<CommitEvent>, UpstreamUnavailable>>>,
    last: Mutex<Option<Result<Vec<CommitEvent>, UpstreamUnavailable>>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
    entered: Notify,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A source whose fetches block until [`release`](Self::release) is called.
    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    pub(crate) fn push(&self, response: Result<Vec<CommitEvent>, UpstreamUnavailable>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_ok(&self, events: Vec<CommitEvent>) {
        self.push(Ok(events));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until a fetch has started.
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch_recent_push_events(
        &self,
        _identity: &Identity,
        _window_size: usize,
    ) -> Result<Vec<CommitEvent>, UpstreamUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(response) = next {
            *last = Some(response);
        }
        last.clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Source that never answers.
pub(crate) struct HangingSource;

#[async_trait]
impl EventSource for HangingSource {
    async fn fetch_recent_push_events(
        &self,
        _identity: &Identity,
        _window_size: usize,
    ) -> Result<Vec<CommitEvent>, UpstreamUnavailable> {
        std::future::pending().await
    }
}

/// Entry store kept in a vector, with switchable create failures.
#[derive(Default)]
pub(crate) struct MemoryStore {
    entries: Mutex<Vec<DiaryEntry>>,
    fail_creates: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn entries(&self) -> Vec<DiaryEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Seed an entry as if it had been saved in an earlier session.
    pub(crate) fn seed(&self, owner_id: &str, commit_hash: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.lock().unwrap().push(DiaryEntry {
            id,
            owner_id: owner_id.to_string(),
            title: format!("saved {commit_hash}"),
            content: String::new(),
            commit_hash: Some(commit_hash.to_string()),
            commit_repo: Some("org/app".to_string()),
            created_at: at(1),
            updated_at: at(1),
            is_draft: false,
            tags: Vec::new(),
        });
        id
    }
}

#[async_trait]
impl crate::entries::EntryStore for MemoryStore {
    async fn create(&self, owner_id: &str, entry: NewEntry) -> crate::entries::Result<DiaryEntry> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(EntryStoreError::invalid_input("store offline"));
        }
        let now = Utc::now();
        let stored = DiaryEntry {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title: entry.title,
            content: entry.content,
            commit_hash: entry.commit_hash,
            commit_repo: entry.commit_repo,
            created_at: entry.created_at.unwrap_or(now),
            updated_at: now,
            is_draft: entry.is_draft,
            tags: entry.tags,
        };
        self.entries.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn query(&self, owner_id: &str) -> crate::entries::Result<Vec<DiaryEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        _patch: EntryPatch,
    ) -> crate::entries::Result<DiaryEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id && e.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| EntryStoreError::not_found(owner_id, id))
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> crate::entries::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| !(e.id == id && e.owner_id == owner_id));
        if entries.len() == before {
            return Err(EntryStoreError::not_found(owner_id, id));
        }
        Ok(())
    }
}
