//! Progress reporting for sync cycles and draft actions.

use uuid::Uuid;

/// Progress events emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A sync cycle acquired the single-flight guard.
    SyncStarted { owner: String },

    /// A trigger arrived while a cycle was in flight and was dropped.
    SyncSkipped { owner: String },

    /// The event source returned its window.
    FetchComplete { commits: usize },

    /// The exclusion policy ran.
    Filtered { kept: usize, excluded: usize },

    /// New drafts were inserted.
    DraftsCreated { count: usize },

    /// The cycle finished.
    SyncComplete {
        fetched: usize,
        excluded: usize,
        created: usize,
    },

    /// The cycle aborted.
    SyncFailed { error: String },

    /// A periodic tick was ignored because auto-sync is off.
    AutoSyncPaused,

    /// A draft became a durable entry.
    DraftPromoted { commit_hash: String, entry_id: Uuid },

    /// Creating the durable entry for a draft failed; the draft was kept.
    PromotionFailed { commit_hash: String, error: String },

    /// A draft was dismissed.
    DraftDismissed { commit_hash: String },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_emit_with_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |event| {
            sink.lock().unwrap().push(event);
        });

        emit(Some(&callback), SyncProgress::DraftsCreated { count: 2 });
        emit(Some(&callback), SyncProgress::AutoSyncPaused);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SyncProgress::DraftsCreated { count: 2 },
                SyncProgress::AutoSyncPaused
            ]
        );
    }

    #[test]
    fn test_emit_without_callback() {
        emit(None, SyncProgress::FetchComplete { commits: 1 });
    }
}
