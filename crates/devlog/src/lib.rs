//! Devlog - turns pushed commits into developer diary drafts.
//!
//! This library watches an identity's recent push activity on a forge,
//! filters out excluded repositories, and turns every commit it has not seen
//! before into an in-memory draft. Drafts can be dismissed or promoted into
//! durable diary entries; a commit is represented by at most one draft or
//! entry at any time.
//!
//! # Features
//!
//! - `github` - The GitHub events client and the reqwest HTTP transport.
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//! - `sqlite` / `postgres` - Database backends for the entry store.
//!
//! # Example
//!
//! ```ignore
//! use devlog::{connect_and_migrate, SeaOrmEntryStore, SyncSettings};
//! use devlog::sync::{PipelineConfig, SyncOrchestrator};
//!
//! let db = connect_and_migrate("sqlite://devlog.db?mode=rwc").await?;
//! let store = SeaOrmEntryStore::new(db);
//! let orchestrator = SyncOrchestrator::open(client, store, config, SyncSettings::default()).await?;
//!
//! orchestrator.trigger_sync().await;
//! for draft in orchestrator.drafts() {
//!     println!("{} {}", draft.commit_hash, draft.title);
//! }
//! ```

pub mod classify;
pub mod db;
pub mod drafts;
pub mod entity;
pub mod entries;
pub mod error;
pub mod exclusion;
pub mod http;
pub mod reconcile;
pub mod settings;
pub mod source;
pub mod sync;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use drafts::{CommitRecord, DraftStore, Temporary, TemporaryDraft};
pub use entity::prelude::*;
pub use entries::{DiaryEntry, EntryPatch, EntryStore, EntryStoreError, NewEntry, SeaOrmEntryStore};
pub use error::{PipelineError, short_error_message};
pub use exclusion::ExclusionPolicy;
pub use settings::{SettingsError, SyncSettings};
pub use source::{CommitEvent, EventSource, Identity, UpstreamUnavailable};
pub use sync::{PipelineConfig, PipelineSnapshot, SyncOrchestrator, SyncOutcome, SyncReport};
