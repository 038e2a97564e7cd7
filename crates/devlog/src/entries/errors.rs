use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during durable entry operations.
#[derive(Debug, Error)]
pub enum EntryStoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Entry not found.
    #[error("Entry not found: {context}")]
    NotFound { context: String },

    /// The owner already has an entry for this commit.
    #[error("Entry already exists for commit {commit_hash} (owner {owner_id})")]
    DuplicateCommit {
        owner_id: String,
        commit_hash: String,
    },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl EntryStoreError {
    /// Create a NotFound error for an id lookup scoped to an owner.
    pub fn not_found(owner_id: &str, id: Uuid) -> Self {
        Self::NotFound {
            context: format!("owner={} id={}", owner_id, id),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type alias for entry store operations.
pub type Result<T> = std::result::Result<T, EntryStoreError>;
