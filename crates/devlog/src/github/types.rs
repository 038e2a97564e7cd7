//! Wire types for the GitHub events API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Public GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// GitHub caps `per_page` on the events endpoint at 100.
pub const MAX_EVENTS_PER_PAGE: usize = 100;

/// Event type carrying pushed commits.
pub const PUSH_EVENT_TYPE: &str = "PushEvent";

/// One element of the `/users/{login}/events` response array.
///
/// The payload shape depends on `kind`, so it stays untyped until the event
/// is known to be a push.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: EventRepo,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl GitHubEvent {
    pub fn is_push(&self) -> bool {
        self.kind == PUSH_EVENT_TYPE
    }
}

/// Repository reference embedded in an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    /// Full name, `owner/name`.
    pub name: String,
}

/// Payload of a `PushEvent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

/// A commit listed in a push payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PushCommit {
    pub sha: String,
    #[serde(default)]
    pub message: String,
}

/// Error body GitHub returns alongside non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
