//! Errors surfaced by the pipeline to its callers.

use thiserror::Error;
use uuid::Uuid;

use crate::drafts::DraftError;
use crate::entries::EntryStoreError;
use crate::source::UpstreamUnavailable;

/// Errors returned across the pipeline boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The event source could not deliver events (network, auth, non-2xx, timeout).
    #[error(transparent)]
    UpstreamUnavailable(#[from] UpstreamUnavailable),

    /// A durable store call failed; the draft or entry involved is untouched.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] EntryStoreError),

    /// No draft with this id.
    #[error("Draft not found: {0}")]
    DraftNotFound(Uuid),

    /// The draft is already being promoted.
    #[error("Draft {0} is already being promoted")]
    PromotionInProgress(Uuid),
}

impl From<DraftError> for PipelineError {
    fn from(e: DraftError) -> Self {
        match e {
            DraftError::NotFound(id) | DraftError::NotPromoting(id) => Self::DraftNotFound(id),
            DraftError::PromotionInProgress(id) => Self::PromotionInProgress(id),
        }
    }
}

impl PipelineError {
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_))
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps multi-line details
/// out of status lines and the pipeline's "last error".
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = std::io::Error::other("first line\nsecond line");
        assert_eq!(short_error_message(&err), "first line");
    }

    #[test]
    fn test_upstream_is_transparent() {
        let err = PipelineError::from(UpstreamUnavailable::new("timed out after 15s"));
        assert!(err.is_upstream());
        assert_eq!(err.to_string(), "Upstream unavailable: timed out after 15s");
    }

    #[test]
    fn test_persistence_failure_wraps_store_error() {
        let err = PipelineError::from(EntryStoreError::invalid_input("bad"));
        assert!(err.is_persistence());
        assert!(err.to_string().starts_with("Persistence failure"));
    }

    #[test]
    fn test_draft_errors_map_to_pipeline_errors() {
        let id = Uuid::new_v4();
        assert!(matches!(
            PipelineError::from(DraftError::NotFound(id)),
            PipelineError::DraftNotFound(x) if x == id
        ));
        assert!(matches!(
            PipelineError::from(DraftError::PromotionInProgress(id)),
            PipelineError::PromotionInProgress(x) if x == id
        ));
    }
}
