//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;
use crate::source::UpstreamUnavailable;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] HttpError),

    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Invalid GitHub login: {0:?}")]
    InvalidLogin(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Unexpected HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Check if a GitHubError indicates rate limiting.
pub fn is_rate_limit_error(e: &GitHubError) -> bool {
    match e {
        GitHubError::RateLimited { .. } => true,
        GitHubError::Status { status, .. } => *status == 429,
        _ => false,
    }
}

impl From<GitHubError> for UpstreamUnavailable {
    fn from(e: GitHubError) -> Self {
        UpstreamUnavailable::new(crate::error::short_error_message(&e))
    }
}
