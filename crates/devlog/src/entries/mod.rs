//! Durable diary entry storage.
//!
//! The pipeline consumes storage through the [`EntryStore`] trait; the
//! free functions operate directly on a sea-orm connection and back the
//! [`SeaOrmEntryStore`] implementation.

mod errors;
mod single;
mod store;
mod types;

pub use errors::{EntryStoreError, Result};
pub use single::{
    commit_hashes_by_owner, delete, find_by_commit_hash, find_by_id, find_by_owner, insert, update,
};
pub use store::{EntryStore, SeaOrmEntryStore};
pub use types::{DiaryEntry, EntryPatch, NewEntry};
