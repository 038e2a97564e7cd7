//! Event source boundary: raw commit records pulled from an upstream forge.
//!
//! An [`EventSource`] fetches a bounded window of recent push activity for an
//! identity and flattens it into [`CommitEvent`]s, most recent push first.
//! Sources carry no business logic; every failure collapses into
//! [`UpstreamUnavailable`], which callers read as "no new data this cycle".

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Default number of upstream events requested per sync cycle.
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// The authenticated identity whose activity is ingested.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Upstream account name (e.g. the GitHub login).
    pub login: String,
    /// Bearer token. `None` means the user has not connected the account yet.
    pub token: Option<String>,
}

impl Identity {
    pub fn new(login: impl Into<String>, token: Option<String>) -> Self {
        Self {
            login: login.into(),
            token,
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("login", &self.login)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single commit observed in an upstream push event. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// Commit hash; the dedup key.
    pub hash: String,
    /// Full repository name, `owner/name`.
    pub repo_full_name: String,
    /// Raw commit message.
    pub message: String,
    /// Timestamp of the push that carried this commit.
    pub occurred_at: DateTime<Utc>,
}

impl CommitEvent {
    pub fn new(
        hash: impl AsRef<str>,
        repo_full_name: impl Into<String>,
        message: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: normalize_hash(hash.as_ref()),
            repo_full_name: repo_full_name.into(),
            message: message.into(),
            occurred_at,
        }
    }

    /// Stable external identifier for this commit.
    #[inline]
    pub fn identity(&self) -> &str {
        &self.hash
    }
}

/// Canonical form of a commit hash.
///
/// Hex hashes compare case-insensitively upstream, so they are stored
/// lowercase with surrounding whitespace removed.
pub fn normalize_hash(hash: &str) -> String {
    hash.trim().to_ascii_lowercase()
}

/// The upstream could not deliver events this cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Upstream unavailable: {reason}")]
pub struct UpstreamUnavailable {
    pub reason: String,
}

impl UpstreamUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Fetches recent push activity for an identity.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch up to `window_size` recent upstream events and return the commits
    /// of the push events among them, most recent push first.
    async fn fetch_recent_push_events(
        &self,
        identity: &Identity,
        window_size: usize,
    ) -> Result<Vec<CommitEvent>, UpstreamUnavailable>;
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for Arc<T> {
    async fn fetch_recent_push_events(
        &self,
        identity: &Identity,
        window_size: usize,
    ) -> Result<Vec<CommitEvent>, UpstreamUnavailable> {
        (**self).fetch_recent_push_events(identity, window_size).await
    }
}
