//! GitHub implementation of the event source.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Wire types for the events endpoint
//! - [`client`] - The events client and its [`EventSource`](crate::source::EventSource) impl
//! - [`convert`] - Conversion from push events to commit events
//!
//! ```ignore
//! use std::sync::Arc;
//! use devlog::github::GitHubClient;
//! use devlog::http::reqwest_transport::ReqwestTransport;
//!
//! let transport = ReqwestTransport::with_timeout(Duration::from_secs(15))?;
//! let client = GitHubClient::new(Arc::new(transport));
//! let commits = client.fetch_recent_push_events(&identity, 30).await?;
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{GitHubClient, RateLimitInfo, parse_rate_limit_headers};
pub use convert::{push_event_commits, to_commit_events};
pub use error::{GitHubError, is_rate_limit_error};
pub use types::{
    EventRepo, GITHUB_API_BASE, GitHubEvent, MAX_EVENTS_PER_PAGE, PUSH_EVENT_TYPE, PushCommit,
    PushPayload,
};
