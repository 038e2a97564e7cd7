//! Conversion from GitHub events to platform-neutral commit events.

use super::types::{GitHubEvent, PushPayload};
use crate::source::CommitEvent;

/// Extract the commits carried by a single event.
///
/// Non-push events and push events with no commits yield nothing. Every
/// commit shares the push's timestamp; GitHub does not report per-commit
/// times on this endpoint.
pub fn push_event_commits(event: &GitHubEvent) -> Vec<CommitEvent> {
    if !event.is_push() {
        return Vec::new();
    }

    let payload = match serde_json::from_value::<PushPayload>(event.payload.clone()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(
                repo = %event.repo.name,
                event_id = ?event.id,
                error = %e,
                "Skipping push event with malformed payload"
            );
            return Vec::new();
        }
    };

    payload
        .commits
        .into_iter()
        .filter(|commit| !commit.sha.trim().is_empty())
        .map(|commit| {
            CommitEvent::new(
                &commit.sha,
                event.repo.name.clone(),
                commit.message,
                event.created_at,
            )
        })
        .collect()
}

/// Flatten a page of events into commit events, preserving event order.
pub fn to_commit_events(events: &[GitHubEvent]) -> Vec<CommitEvent> {
    events.iter().flat_map(push_event_commits).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn event(kind: &str, repo: &str, created_at: &str, payload: serde_json::Value) -> GitHubEvent {
        serde_json::from_value(serde_json::json!({
            "type": kind,
            "repo": {"name": repo},
            "created_at": created_at,
            "payload": payload,
        }))
        .expect("valid event")
    }

    #[test]
    fn push_commits_share_the_push_timestamp() {
        let push = event(
            "PushEvent",
            "org/app",
            "2026-10-02T08:30:00Z",
            serde_json::json!({"commits": [
                {"sha": "AAA111", "message": "first"},
                {"sha": "bbb222", "message": "second"}
            ]}),
        );

        let commits = push_event_commits(&push);
        let expected_time = Utc.with_ymd_and_hms(2026, 10, 2, 8, 30, 0).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "aaa111");
        assert_eq!(commits[1].hash, "bbb222");
        assert!(commits.iter().all(|c| c.occurred_at == expected_time));
        assert!(commits.iter().all(|c| c.repo_full_name == "org/app"));
    }

    #[test]
    fn non_push_and_malformed_events_are_skipped() {
        let events = vec![
            event(
                "WatchEvent",
                "org/app",
                "2026-10-02T08:30:00Z",
                serde_json::json!({"action": "started"}),
            ),
            event(
                "PushEvent",
                "org/app",
                "2026-10-02T08:00:00Z",
                serde_json::json!({"commits": "not-a-list"}),
            ),
            event(
                "PushEvent",
                "org/lib",
                "2026-10-01T08:00:00Z",
                serde_json::json!({"commits": [{"sha": "ccc333", "message": "fix"}]}),
            ),
        ];

        let commits = to_commit_events(&events);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].repo_full_name, "org/lib");
    }

    #[test]
    fn commits_without_sha_are_dropped() {
        let push = event(
            "PushEvent",
            "org/app",
            "2026-10-02T08:30:00Z",
            serde_json::json!({"commits": [{"sha": " ", "message": "ghost"}]}),
        );
        assert!(push_event_commits(&push).is_empty());
    }
}
