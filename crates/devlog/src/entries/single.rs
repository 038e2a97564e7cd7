use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::diary_entry::{ActiveModel, Column, Entity as DiaryEntries, Model};

use super::errors::{EntryStoreError, Result};
use super::types::{EntryPatch, NewEntry};

// ─── Single Record Operations ────────────────────────────────────────────────

/// Insert a new entry for `owner_id`.
///
/// # Errors
/// Returns `EntryStoreError::DuplicateCommit` if the owner already has an
/// entry for the same commit, `InvalidInput` for an empty title, and
/// `Database` for any other failure.
pub async fn insert(db: &DatabaseConnection, owner_id: &str, entry: NewEntry) -> Result<Model> {
    if owner_id.trim().is_empty() {
        return Err(EntryStoreError::invalid_input("owner id must not be empty"));
    }
    if entry.title.trim().is_empty() {
        return Err(EntryStoreError::invalid_input("title must not be empty"));
    }

    if let Some(hash) = entry.commit_hash.as_deref()
        && find_by_commit_hash(db, owner_id, hash).await?.is_some()
    {
        return Err(EntryStoreError::DuplicateCommit {
            owner_id: owner_id.to_string(),
            commit_hash: hash.to_string(),
        });
    }

    let now = Utc::now();
    let created_at = entry.created_at.unwrap_or(now);
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id.to_string()),
        title: Set(entry.title),
        content: Set(entry.content),
        tags: Set(serde_json::json!(entry.tags)),
        commit_hash: Set(entry.commit_hash),
        commit_repo: Set(entry.commit_repo),
        is_draft: Set(entry.is_draft),
        created_at: Set(created_at.fixed_offset()),
        updated_at: Set(now.fixed_offset()),
    };

    model.insert(db).await.map_err(EntryStoreError::from)
}

/// Find an entry by id, scoped to its owner.
pub async fn find_by_id(db: &DatabaseConnection, owner_id: &str, id: Uuid) -> Result<Option<Model>> {
    DiaryEntries::find_by_id(id)
        .filter(Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(EntryStoreError::from)
}

/// Find the owner's entry for a commit, if any.
pub async fn find_by_commit_hash(
    db: &DatabaseConnection,
    owner_id: &str,
    commit_hash: &str,
) -> Result<Option<Model>> {
    DiaryEntries::find()
        .filter(Column::OwnerId.eq(owner_id))
        .filter(Column::CommitHash.eq(commit_hash))
        .one(db)
        .await
        .map_err(EntryStoreError::from)
}

/// All entries for an owner, newest first.
pub async fn find_by_owner(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<Model>> {
    DiaryEntries::find()
        .filter(Column::OwnerId.eq(owner_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(EntryStoreError::from)
}

/// `(commit_hash, entry_id)` pairs for the owner's commit-linked entries.
pub async fn commit_hashes_by_owner(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<(String, Uuid)>> {
    let rows: Vec<(Option<String>, Uuid)> = DiaryEntries::find()
        .select_only()
        .column(Column::CommitHash)
        .column(Column::Id)
        .filter(Column::OwnerId.eq(owner_id))
        .filter(Column::CommitHash.is_not_null())
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(hash, id)| hash.map(|hash| (hash, id)))
        .collect())
}

/// Apply a partial update to an entry.
///
/// # Errors
/// Returns `EntryStoreError::NotFound` if the owner has no such entry.
pub async fn update(
    db: &DatabaseConnection,
    owner_id: &str,
    id: Uuid,
    patch: EntryPatch,
) -> Result<Model> {
    let existing = find_by_id(db, owner_id, id)
        .await?
        .ok_or_else(|| EntryStoreError::not_found(owner_id, id))?;

    if patch.is_empty() {
        return Ok(existing);
    }

    let mut model: ActiveModel = existing.into();
    if let Some(title) = patch.title {
        if title.trim().is_empty() {
            return Err(EntryStoreError::invalid_input("title must not be empty"));
        }
        model.title = Set(title);
    }
    if let Some(content) = patch.content {
        model.content = Set(content);
    }
    if let Some(tags) = patch.tags {
        model.tags = Set(serde_json::json!(tags));
    }
    if let Some(is_draft) = patch.is_draft {
        model.is_draft = Set(is_draft);
    }
    model.updated_at = Set(Utc::now().fixed_offset());

    model.update(db).await.map_err(EntryStoreError::from)
}

/// Delete an entry.
///
/// # Errors
/// Returns `EntryStoreError::NotFound` if nothing was deleted.
pub async fn delete(db: &DatabaseConnection, owner_id: &str, id: Uuid) -> Result<()> {
    let result = DiaryEntries::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(EntryStoreError::not_found(owner_id, id));
    }
    Ok(())
}
