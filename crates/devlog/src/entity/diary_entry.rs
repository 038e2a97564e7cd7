//! DiaryEntry entity - durable log entries, optionally linked to a commit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A durable diary entry owned by a single user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "diary_entries")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Opaque owner identifier.
    pub owner_id: String,

    // ─── Content ─────────────────────────────────────────────────────────────
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Ordered tag list (stored as JSON array for cross-database compatibility).
    #[sea_orm(column_type = "Json")]
    pub tags: serde_json::Value,

    // ─── Commit Link ─────────────────────────────────────────────────────────
    /// Commit hash this entry was promoted from. Unique per owner when set.
    pub commit_hash: Option<String>,
    /// Full name of the repository the commit belongs to.
    pub commit_repo: Option<String>,

    // ─── State ───────────────────────────────────────────────────────────────
    /// User-level "draft" flag on a saved entry (not an ephemeral draft).
    #[sea_orm(default_value = false)]
    pub is_draft: bool,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the tag column, dropping non-string values.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
