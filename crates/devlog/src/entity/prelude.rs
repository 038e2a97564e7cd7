//! Common re-exports for convenient entity usage.

pub use super::diary_entry::{
    ActiveModel as DiaryEntryActiveModel, Column as DiaryEntryColumn, Entity as DiaryEntryEntity,
    Model as DiaryEntryModel,
};
