//! SeaORM entity definitions for the devlog database schema.

pub mod diary_entry;
pub mod prelude;
