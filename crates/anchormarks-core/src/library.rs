//! Library facade
//!
//! Owns the configuration and the bookmark store. Import parses first and
//! only then writes, so the store never sees a half-parsed file.

use serde::Serialize;
use std::path::Path;

use anchormarks_interchange::{
    export_html, import_bytes, import_html, ParsedBookmark, ParsedFolder, ParsedImport,
    StrategyKind,
};
use anchormarks_storage::{BookmarkStore, Database};

use crate::config::Config;
use crate::Result;

/// Aggregate outcome of one import, for reporting to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub strategy: StrategyKind,
    pub parsed_folders: usize,
    pub parsed_bookmarks: usize,
    pub folders_created: usize,
    pub folders_reused: usize,
    pub bookmarks_created: usize,
    pub duplicates_skipped: usize,
}

pub struct Library {
    config: Config,
    store: BookmarkStore,
}

impl Library {
    pub fn open(config: Config) -> Result<Self> {
        if let Some(parent) = config
            .database_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        tracing::info!(path = %config.database_path.display(), "Opened bookmark library");

        Ok(Self {
            config,
            store: BookmarkStore::new(db),
        })
    }

    pub fn open_in_memory(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            store: BookmarkStore::new(Database::open_in_memory()?),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse without touching the store.
    pub fn preview_html(&self, html: &str) -> ParsedImport {
        import_html(html, &self.config.import)
    }

    pub fn import_html(&self, html: &str) -> Result<ImportReport> {
        let parsed = self.preview_html(html);
        self.persist(&parsed)
    }

    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportReport> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Read bookmark file");

        let parsed = import_bytes(&bytes, &self.config.import)?;
        self.persist(&parsed)
    }

    fn persist(&self, parsed: &ParsedImport) -> Result<ImportReport> {
        let outcome = self.store.persist_import(parsed)?;

        Ok(ImportReport {
            strategy: parsed.strategy,
            parsed_folders: parsed.folders.len(),
            parsed_bookmarks: parsed.bookmarks.len(),
            folders_created: outcome.folders_created,
            folders_reused: outcome.folders_reused,
            bookmarks_created: outcome.bookmarks_created,
            duplicates_skipped: outcome.duplicates_skipped,
        })
    }

    pub fn bookmarks(&self) -> Result<Vec<ParsedBookmark>> {
        Ok(self.store.bookmarks()?)
    }

    pub fn folders(&self) -> Result<Vec<ParsedFolder>> {
        Ok(self.store.folders()?)
    }

    pub fn export_html(&self) -> Result<String> {
        let bookmarks = self.store.bookmarks()?;
        let folders = self.store.folders()?;
        Ok(export_html(&bookmarks, &folders, &self.config.export))
    }

    pub fn export_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let html = self.export_html()?;
        std::fs::write(path.as_ref(), html)?;
        tracing::info!(path = %path.as_ref().display(), "Exported bookmarks");
        Ok(())
    }
}
