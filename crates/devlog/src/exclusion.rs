//! Repository exclusion policy.

use std::collections::BTreeSet;

use crate::source::CommitEvent;

/// User-configured denylist of repositories exempt from ingestion.
///
/// Matching is exact and case-sensitive on the full `owner/name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    excluded: BTreeSet<String>,
}

impl ExclusionPolicy {
    pub fn new<I, S>(repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: repos.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_excluded(&self, repo_full_name: &str) -> bool {
        self.excluded.contains(repo_full_name)
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Keep only events from repositories that are not excluded, in order.
    pub fn filter(&self, events: Vec<CommitEvent>) -> Vec<CommitEvent> {
        if self.excluded.is_empty() {
            return events;
        }
        filter_excluded(events, &self.excluded)
    }
}

/// Filter `events` against `excluded_repos`.
pub fn filter_excluded(
    events: Vec<CommitEvent>,
    excluded_repos: &BTreeSet<String>,
) -> Vec<CommitEvent> {
    events
        .into_iter()
        .filter(|event| !excluded_repos.contains(&event.repo_full_name))
        .collect()
}
