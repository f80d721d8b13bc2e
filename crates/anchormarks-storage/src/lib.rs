//! AnchorMarks Storage Layer
//!
//! SQLite persistence for folders and bookmarks. Assigns durable ids to the
//! run-local ids an import produces. Every import is written in a single
//! transaction.

mod database;
mod error;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use store::{BookmarkStore, PersistOutcome};

pub type Result<T> = std::result::Result<T, StorageError>;
