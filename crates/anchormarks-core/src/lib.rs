//! AnchorMarks Core
//!
//! Ties the interchange engine to the bookmark store: parse a browser export,
//! persist it, and write the stored collection back out.

mod config;
mod error;
mod library;

pub use config::Config;
pub use error::CoreError;
pub use library::{ImportReport, Library};

// Re-export the pieces callers configure or inspect
pub use anchormarks_interchange::{
    import_bytes, EmptyFolderPolicy, ExportLayout, ExportOptions, FolderId, ImportOptions,
    ParsedBookmark, ParsedFolder, ParsedImport, StrategyKind, StrategyPolicy,
};
pub use anchormarks_storage::{BookmarkStore, Database, PersistOutcome, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
