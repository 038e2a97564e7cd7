//! Domain types for durable entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::diary_entry::Model;

/// A durable diary entry as seen by the pipeline and its callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub commit_hash: Option<String>,
    pub commit_repo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_draft: bool,
    pub tags: Vec<String>,
}

impl From<Model> for DiaryEntry {
    fn from(model: Model) -> Self {
        let tags = model.tag_list();
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            content: model.content,
            commit_hash: model.commit_hash,
            commit_repo: model.commit_repo,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            is_draft: model.is_draft,
            tags,
        }
    }
}

/// Fields for creating a durable entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    pub commit_hash: Option<String>,
    pub commit_repo: Option<String>,
    pub tags: Vec<String>,
    pub is_draft: bool,
    /// Creation time to record; `None` means "now".
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update of an entry's user-editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_draft: Option<bool>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none() && self.is_draft.is_none()
    }
}
