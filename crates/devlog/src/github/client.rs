//! GitHub events client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::convert::to_commit_events;
use super::error::{GitHubError, is_rate_limit_error};
use super::types::{ApiErrorBody, GITHUB_API_BASE, GitHubEvent, MAX_EVENTS_PER_PAGE};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::source::{CommitEvent, EventSource, Identity, UpstreamUnavailable};

/// Rate limit state reported in GitHub response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: usize,
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Extract rate limit info from GitHub response headers.
pub fn parse_rate_limit_headers(response: &HttpResponse) -> Option<RateLimitInfo> {
    let limit = response
        .header("x-ratelimit-limit")
        .and_then(|v| v.parse::<usize>().ok())?;
    let remaining = response
        .header("x-ratelimit-remaining")
        .and_then(|v| v.parse::<usize>().ok())?;
    let reset_epoch = response
        .header("x-ratelimit-reset")
        .and_then(|v| v.parse::<i64>().ok())?;
    let reset_at = DateTime::from_timestamp(reset_epoch, 0).unwrap_or_else(Utc::now);
    Some(RateLimitInfo {
        limit,
        remaining,
        reset_at,
    })
}

/// GitHub logins are alphanumeric with single inner hyphens; anything else
/// would change the request path.
fn validate_login(login: &str) -> Result<(), GitHubError> {
    let valid = !login.is_empty()
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !login.starts_with('-');
    if valid {
        Ok(())
    } else {
        Err(GitHubError::InvalidLogin(login.to_string()))
    }
}

/// GitHub implementation of [`EventSource`].
///
/// All I/O goes through an [`HttpTransport`], so tests can run against an
/// in-memory transport.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
}

impl GitHubClient {
    /// Create a client against the public GitHub API.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API base (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// URL of the events page for `login`, with `per_page` clamped to GitHub's cap.
    pub fn events_url(&self, login: &str, window_size: usize) -> String {
        let per_page = window_size.clamp(1, MAX_EVENTS_PER_PAGE);
        format!(
            "{}/users/{}/events?per_page={}",
            self.api_base, login, per_page
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        resource: &str,
    ) -> Result<T, GitHubError> {
        let request = HttpRequest::get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "devlog")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("Authorization", format!("Bearer {}", token));

        let response = self.transport.send(request).await?;

        if response.is_success() {
            return serde_json::from_slice(&response.body)
                .map_err(|e| GitHubError::Decode(e.to_string()));
        }

        if let Some(info) = parse_rate_limit_headers(&response)
            && info.remaining == 0
            && matches!(response.status, 403 | 429)
        {
            return Err(GitHubError::RateLimited {
                reset_at: info.reset_at,
            });
        }

        match response.status {
            401 | 403 => Err(GitHubError::AuthRequired),
            404 => Err(GitHubError::UserNotFound(resource.to_string())),
            status => {
                let message = serde_json::from_slice::<ApiErrorBody>(&response.body)
                    .map(|body| body.message)
                    .unwrap_or_default();
                Err(GitHubError::Status { status, message })
            }
        }
    }

    /// Fetch the most recent page of events for the identity.
    pub async fn list_user_events(
        &self,
        identity: &Identity,
        window_size: usize,
    ) -> Result<Vec<GitHubEvent>, GitHubError> {
        let token = identity
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GitHubError::AuthRequired)?;
        validate_login(&identity.login)?;

        let url = self.events_url(&identity.login, window_size);
        self.get_json(&url, token, &identity.login).await
    }
}

#[async_trait]
impl EventSource for GitHubClient {
    async fn fetch_recent_push_events(
        &self,
        identity: &Identity,
        window_size: usize,
    ) -> Result<Vec<CommitEvent>, UpstreamUnavailable> {
        let events = match self.list_user_events(identity, window_size).await {
            Ok(events) => events,
            Err(e) if is_rate_limit_error(&e) => {
                tracing::warn!(login = %identity.login, error = %e, "GitHub rate limit reached, skipping cycle");
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!(login = %identity.login, error = %e, "Failed to fetch GitHub events");
                return Err(e.into());
            }
        };

        let commits = to_commit_events(&events);
        tracing::debug!(
            login = %identity.login,
            events = events.len(),
            commits = commits.len(),
            "Fetched GitHub events"
        );
        Ok(commits)
    }
}
