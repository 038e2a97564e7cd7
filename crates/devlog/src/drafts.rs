//! Ephemeral drafts and the commit-hash ledger.
//!
//! Every commit hash the pipeline knows about occupies exactly one slot in the
//! ledger: either a [`CommitRecord::Draft`] pointing at an in-memory draft, or
//! a [`CommitRecord::Durable`] pointing at a stored entry. Inserting a draft
//! for an occupied hash is refused, and promotion swaps the slot's variant in
//! one step, so a hash can never be represented twice.
//!
//! Drafts are held in display order, most recent activity first. Nothing here
//! is persisted; drafts are lost when the process exits.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::entries::NewEntry;

/// A not-yet-persisted diary record derived from a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryDraft {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub commit_hash: String,
    pub commit_repo: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    #[serde(rename = "isTemporary")]
    pub temporary: Temporary,
}

/// Marker carried by every draft; serializes as `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Temporary;

impl Serialize for Temporary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl TemporaryDraft {
    /// Drafts are always temporary; saved entries are [`DiaryEntry`](crate::entries::DiaryEntry).
    pub const fn is_temporary(&self) -> bool {
        true
    }

    /// Fields for the durable entry this draft becomes when promoted.
    ///
    /// The entry keeps the draft's creation time, so a promoted commit stays
    /// on the day it was pushed.
    pub fn to_new_entry(&self) -> NewEntry {
        NewEntry {
            title: self.title.clone(),
            content: self.content.clone(),
            commit_hash: Some(self.commit_hash.clone()),
            commit_repo: Some(self.commit_repo.clone()),
            tags: self.tags.clone(),
            is_draft: false,
            created_at: Some(self.created_at),
        }
    }
}

/// What currently represents a commit hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitRecord {
    /// An in-memory draft. `promoting` is set while its durable create is in flight.
    Draft { draft_id: Uuid, promoting: bool },
    /// A stored entry.
    Durable { entry_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Draft not found: {0}")]
    NotFound(Uuid),

    #[error("Draft {0} is already being promoted")]
    PromotionInProgress(Uuid),

    #[error("Draft {0} is not being promoted")]
    NotPromoting(Uuid),
}

/// Ordered drafts plus the ledger that keys every known commit hash.
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: VecDeque<TemporaryDraft>,
    ledger: HashMap<String, CommitRecord>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drafts in display order (most recent first).
    pub fn drafts(&self) -> impl ExactSizeIterator<Item = &TemporaryDraft> {
        self.drafts.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&TemporaryDraft> {
        self.drafts.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn record(&self, commit_hash: &str) -> Option<CommitRecord> {
        self.ledger.get(commit_hash).copied()
    }

    /// Hashes currently represented by stored entries.
    pub fn durable_hashes(&self) -> HashSet<String> {
        self.hashes_where(|r| matches!(r, CommitRecord::Durable { .. }))
    }

    /// Hashes currently represented by drafts.
    pub fn draft_hashes(&self) -> HashSet<String> {
        self.hashes_where(|r| matches!(r, CommitRecord::Draft { .. }))
    }

    fn hashes_where(&self, pred: impl Fn(&CommitRecord) -> bool) -> HashSet<String> {
        self.ledger
            .iter()
            .filter(|(_, record)| pred(record))
            .map(|(hash, _)| hash.clone())
            .collect()
    }

    /// Replace the durable view with `(commit_hash, entry_id)` pairs from storage.
    ///
    /// A draft whose hash turns out to be stored already (saved elsewhere) is
    /// dropped, unless it is mid-promotion. Returns the number of drafts dropped.
    pub fn hydrate_durable<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, Uuid)>,
    {
        self.ledger
            .retain(|_, record| !matches!(record, CommitRecord::Durable { .. }));

        let mut superseded = Vec::new();
        for (hash, entry_id) in entries {
            match self.ledger.get(&hash) {
                Some(CommitRecord::Draft {
                    promoting: true, ..
                }) => continue,
                Some(CommitRecord::Draft { draft_id, .. }) => superseded.push(*draft_id),
                _ => {}
            }
            self.ledger.insert(hash, CommitRecord::Durable { entry_id });
        }

        self.drafts.retain(|d| !superseded.contains(&d.id));
        if !superseded.is_empty() {
            tracing::debug!(
                dropped = superseded.len(),
                "Dropped drafts already saved as entries"
            );
        }
        superseded.len()
    }

    /// Prepend `drafts`, keeping their relative order.
    ///
    /// Drafts whose hash is already in the ledger (or repeated within the
    /// batch) are refused. Returns the number inserted.
    pub fn insert_many(&mut self, drafts: Vec<TemporaryDraft>) -> usize {
        let mut accepted = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if self.ledger.contains_key(&draft.commit_hash) {
                tracing::warn!(hash = %draft.commit_hash, "Refusing duplicate draft");
                continue;
            }
            self.ledger.insert(
                draft.commit_hash.clone(),
                CommitRecord::Draft {
                    draft_id: draft.id,
                    promoting: false,
                },
            );
            accepted.push(draft);
        }

        let inserted = accepted.len();
        for draft in accepted.into_iter().rev() {
            self.drafts.push_front(draft);
        }
        inserted
    }

    /// Remove a draft without side effects elsewhere.
    pub fn dismiss(&mut self, id: Uuid) -> Result<TemporaryDraft, DraftError> {
        let index = self.position(id)?;
        if self.is_promoting(&self.drafts[index].commit_hash) {
            return Err(DraftError::PromotionInProgress(id));
        }

        let draft = self
            .drafts
            .remove(index)
            .ok_or(DraftError::NotFound(id))?;
        self.ledger.remove(&draft.commit_hash);
        Ok(draft)
    }

    /// Mark a draft as being promoted and hand back its fields.
    ///
    /// The draft stays listed until [`complete_promotion`](Self::complete_promotion).
    pub fn begin_promotion(&mut self, id: Uuid) -> Result<TemporaryDraft, DraftError> {
        let index = self.position(id)?;
        let hash = self.drafts[index].commit_hash.clone();

        match self.ledger.get_mut(&hash) {
            Some(CommitRecord::Draft { promoting, .. }) if *promoting => {
                Err(DraftError::PromotionInProgress(id))
            }
            Some(CommitRecord::Draft { promoting, .. }) => {
                *promoting = true;
                Ok(self.drafts[index].clone())
            }
            _ => Err(DraftError::NotFound(id)),
        }
    }

    /// Finish a promotion: the draft leaves the list and its hash becomes durable.
    pub fn complete_promotion(
        &mut self,
        id: Uuid,
        entry_id: Uuid,
    ) -> Result<TemporaryDraft, DraftError> {
        let index = self.position(id)?;
        if !self.is_promoting(&self.drafts[index].commit_hash) {
            return Err(DraftError::NotPromoting(id));
        }

        let draft = self
            .drafts
            .remove(index)
            .ok_or(DraftError::NotFound(id))?;
        self.ledger
            .insert(draft.commit_hash.clone(), CommitRecord::Durable { entry_id });
        Ok(draft)
    }

    /// Undo [`begin_promotion`](Self::begin_promotion) after a failed durable create.
    pub fn abort_promotion(&mut self, id: Uuid) -> Result<(), DraftError> {
        let index = self.position(id)?;
        let hash = &self.drafts[index].commit_hash;
        match self.ledger.get_mut(hash) {
            Some(CommitRecord::Draft { promoting, .. }) if *promoting => {
                *promoting = false;
                Ok(())
            }
            _ => Err(DraftError::NotPromoting(id)),
        }
    }

    fn position(&self, id: Uuid) -> Result<usize, DraftError> {
        self.drafts
            .iter()
            .position(|d| d.id == id)
            .ok_or(DraftError::NotFound(id))
    }

    fn is_promoting(&self, hash: &str) -> bool {
        matches!(
            self.ledger.get(hash),
            Some(CommitRecord::Draft {
                promoting: true,
                ..
            })
        )
    }
}
