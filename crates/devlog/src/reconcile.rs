//! Novelty check between fetched commits and what is already known.

use std::collections::HashSet;

use uuid::Uuid;

use crate::classify::classify;
use crate::drafts::{Temporary, TemporaryDraft};
use crate::source::CommitEvent;

/// Compute the drafts to create for `events`.
///
/// A commit becomes a draft when its hash is in neither `durable_hashes` nor
/// `draft_hashes` and has not already produced a draft earlier in the same
/// batch. Drafts come back in event order and take the push timestamp as
/// their creation time.
pub fn reconcile(
    events: &[CommitEvent],
    durable_hashes: &HashSet<String>,
    draft_hashes: &HashSet<String>,
) -> Vec<TemporaryDraft> {
    reconcile_with_ids(events, durable_hashes, draft_hashes, Uuid::new_v4)
}

/// [`reconcile`] with a caller-supplied id generator.
pub fn reconcile_with_ids<F>(
    events: &[CommitEvent],
    durable_hashes: &HashSet<String>,
    draft_hashes: &HashSet<String>,
    mut next_id: F,
) -> Vec<TemporaryDraft>
where
    F: FnMut() -> Uuid,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut drafts = Vec::new();

    for event in events {
        let hash = event.identity();
        if durable_hashes.contains(hash) || draft_hashes.contains(hash) || !seen.insert(hash) {
            continue;
        }

        let classification = classify(&event.message);
        let title = draft_title(&classification.title, &classification.body, hash);
        let content = if classification.body.is_empty() {
            title.clone()
        } else {
            classification.body
        };

        drafts.push(TemporaryDraft {
            id: next_id(),
            title,
            content,
            commit_hash: hash.to_string(),
            commit_repo: event.repo_full_name.clone(),
            created_at: event.occurred_at,
            tags: classification.tags,
            temporary: Temporary,
        });
    }

    drafts
}

/// Entries need a non-blank title; messages with a blank first line borrow
/// the first body line, and blank messages fall back to the short hash.
fn draft_title(title: &str, body: &str, hash: &str) -> String {
    if !title.is_empty() {
        return title.to_string();
    }
    match body.lines().next() {
        Some(line) => line.to_string(),
        None => format!("Commit {}", hash.chars().take(7).collect::<String>()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::drafts::DraftStore;
    use crate::exclusion::ExclusionPolicy;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 5, hour, 0, 0).unwrap()
    }

    fn event(hash: &str, repo: &str, message: &str, hour: u32) -> CommitEvent {
        CommitEvent::new(hash, repo, message, at(hour))
    }

    fn set(hashes: &[&str]) -> HashSet<String> {
        hashes.iter().map(|h| h.to_string()).collect()
    }

    fn counter_ids() -> impl FnMut() -> Uuid {
        let mut n = 0u128;
        move || {
            n += 1;
            Uuid::from_u128(n)
        }
    }

    #[test]
    fn novel_commits_become_drafts_in_order() {
        let events = vec![
            event("c3", "org/app", "feat: third", 12),
            event("c2", "org/app", "fix: second", 11),
            event("c1", "org/lib", "docs: first", 10),
        ];

        let drafts = reconcile_with_ids(&events, &set(&[]), &set(&[]), counter_ids());
        let hashes: Vec<_> = drafts.iter().map(|d| d.commit_hash.as_str()).collect();
        assert_eq!(hashes, vec!["c3", "c2", "c1"]);
        assert_eq!(drafts[0].id, Uuid::from_u128(1));
        assert_eq!(drafts[2].commit_repo, "org/lib");
        assert_eq!(drafts[1].created_at, at(11));
    }

    #[test]
    fn durable_hashes_never_produce_drafts() {
        let events = vec![
            event("saved", "org/app", "fix", 10),
            event("saved", "org/other", "feat", 9),
            event("new", "org/app", "chore", 8),
        ];
        let drafts = reconcile(&events, &set(&["saved"]), &set(&[]));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].commit_hash, "new");
    }

    #[test]
    fn existing_drafts_are_not_duplicated() {
        let events = vec![event("pending", "org/app", "wip", 10)];
        assert!(reconcile(&events, &set(&[]), &set(&["pending"])).is_empty());
    }

    #[test]
    fn duplicate_hash_within_batch_yields_one_draft() {
        let events = vec![
            event("dup", "org/app", "first sighting", 12),
            event("dup", "org/fork", "second sighting", 11),
        ];
        let drafts = reconcile(&events, &set(&[]), &set(&[]));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "first sighting");
        assert_eq!(drafts[0].commit_repo, "org/app");
    }

    #[test]
    fn hash_comparison_uses_normalized_identity() {
        let events = vec![event("ABC123", "org/app", "fix", 10)];
        assert!(reconcile(&events, &set(&["abc123"]), &set(&[])).is_empty());
    }

    #[test]
    fn second_pass_over_same_batch_is_idempotent() {
        let events = vec![
            event("a", "org/app", "feat: a", 12),
            event("b", "org/app", "fix: b", 11),
        ];
        let mut store = DraftStore::new();

        let first = reconcile(&events, &store.durable_hashes(), &store.draft_hashes());
        assert_eq!(first.len(), 2);
        store.insert_many(first);

        let second = reconcile(&events, &store.durable_hashes(), &store.draft_hashes());
        assert!(second.is_empty());
    }

    #[test]
    fn content_falls_back_to_title() {
        let events = vec![
            event("a", "org/app", "Fix: null pointer in parser", 10),
            event("b", "org/app", "Add cache\n\nKeyed by commit hash.", 10),
        ];
        let drafts = reconcile(&events, &set(&[]), &set(&[]));
        assert_eq!(drafts[0].content, "Fix: null pointer in parser");
        assert_eq!(drafts[1].title, "Add cache");
        assert_eq!(drafts[1].content, "Keyed by commit hash.");
    }

    #[test]
    fn blank_first_line_never_yields_blank_title() {
        let events = vec![
            event("a", "org/app", "\nfeat: body only", 10),
            event("b", "org/app", "", 10),
            event("c", "org/app", "  \n\n  fix: wrapped\n  second line", 10),
        ];
        let drafts = reconcile(&events, &set(&[]), &set(&[]));

        assert_eq!(drafts[0].title, "feat: body only");
        assert_eq!(drafts[0].content, "feat: body only");
        assert!(drafts[0].tags.contains(&"feature".to_string()));
        assert_eq!(drafts[1].title, "Commit b");
        assert_eq!(drafts[1].content, "Commit b");
        assert_eq!(drafts[2].title, "fix: wrapped");
        assert_eq!(drafts[2].content, "fix: wrapped\nsecond line");
    }

    #[test]
    fn excluded_repo_scenario_yields_single_feature_draft() {
        let policy = ExclusionPolicy::new(["org/ignored"]);
        let events = vec![
            event("zzz999", "org/ignored", "feat: secret work", 12),
            event("abc123", "org/kept", "feat: add login", 11),
        ];

        let drafts = reconcile(&policy.filter(events), &set(&[]), &set(&[]));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].commit_hash, "abc123");
        assert_eq!(drafts[0].tags, vec!["commit", "auto-generated", "feature"]);
    }
}
