//! The durable store boundary consumed by the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::errors::Result;
use super::single;
use super::types::{DiaryEntry, EntryPatch, NewEntry};

/// Durable, owner-scoped entry storage.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Create an entry and return the stored record.
    async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<DiaryEntry>;

    /// All entries belonging to `owner_id`, newest first.
    async fn query(&self, owner_id: &str) -> Result<Vec<DiaryEntry>>;

    /// Apply a partial update to one entry.
    async fn update(&self, owner_id: &str, id: Uuid, patch: EntryPatch) -> Result<DiaryEntry>;

    /// Delete one entry.
    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()>;

    /// `(commit_hash, entry_id)` pairs for the owner's commit-linked entries.
    async fn commit_hashes(&self, owner_id: &str) -> Result<Vec<(String, Uuid)>> {
        let entries = self.query(owner_id).await?;
        Ok(entries
            .into_iter()
            .filter_map(|e| e.commit_hash.map(|hash| (hash, e.id)))
            .collect())
    }
}

#[async_trait]
impl<T: EntryStore + ?Sized> EntryStore for Arc<T> {
    async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<DiaryEntry> {
        (**self).create(owner_id, entry).await
    }

    async fn query(&self, owner_id: &str) -> Result<Vec<DiaryEntry>> {
        (**self).query(owner_id).await
    }

    async fn update(&self, owner_id: &str, id: Uuid, patch: EntryPatch) -> Result<DiaryEntry> {
        (**self).update(owner_id, id, patch).await
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()> {
        (**self).delete(owner_id, id).await
    }

    async fn commit_hashes(&self, owner_id: &str) -> Result<Vec<(String, Uuid)>> {
        (**self).commit_hashes(owner_id).await
    }
}

/// [`EntryStore`] backed by the `diary_entries` table.
///
/// Not `Clone`: share it through `Arc<SeaOrmEntryStore>`, which is an
/// [`EntryStore`] too.
#[derive(Debug)]
pub struct SeaOrmEntryStore {
    db: DatabaseConnection,
}

impl SeaOrmEntryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl EntryStore for SeaOrmEntryStore {
    async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<DiaryEntry> {
        let model = single::insert(&self.db, owner_id, entry).await?;
        tracing::debug!(owner = %owner_id, id = %model.id, hash = ?model.commit_hash, "Created entry");
        Ok(model.into())
    }

    async fn query(&self, owner_id: &str) -> Result<Vec<DiaryEntry>> {
        let models = single::find_by_owner(&self.db, owner_id).await?;
        Ok(models.into_iter().map(DiaryEntry::from).collect())
    }

    async fn update(&self, owner_id: &str, id: Uuid, patch: EntryPatch) -> Result<DiaryEntry> {
        single::update(&self.db, owner_id, id, patch)
            .await
            .map(DiaryEntry::from)
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()> {
        single::delete(&self.db, owner_id, id).await?;
        tracing::debug!(owner = %owner_id, id = %id, "Deleted entry");
        Ok(())
    }

    async fn commit_hashes(&self, owner_id: &str) -> Result<Vec<(String, Uuid)>> {
        single::commit_hashes_by_owner(&self.db, owner_id).await
    }
}
