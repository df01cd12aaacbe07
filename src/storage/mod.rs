//! Local issue cache.

pub mod schema;
mod sqlite;

pub use sqlite::{SqliteStorage, UpsertCounts, last_sync_key};
