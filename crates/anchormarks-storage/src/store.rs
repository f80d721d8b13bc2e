//! Persistence of parse results
//!
//! Takes the run-local folder ids of a [`ParsedImport`] and replaces them with
//! durable row ids before any bookmark is written.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashMap;

use anchormarks_interchange::{FolderId, FolderStyle, ParsedBookmark, ParsedFolder, ParsedImport};

use crate::database::Database;
use crate::error::StorageError;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    pub folders_created: usize,
    pub folders_reused: usize,
    pub bookmarks_created: usize,
    pub duplicates_skipped: usize,
    /// Row ids of the new bookmarks, in import order
    pub created_bookmark_ids: Vec<i64>,
}

#[derive(Clone)]
pub struct BookmarkStore {
    db: Database,
}

impl BookmarkStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create-or-get the folder `name` under `parent`.
    pub fn ensure_folder(&self, name: &str, parent: Option<i64>, style: &FolderStyle) -> Result<i64> {
        self.db
            .transaction(|conn| ensure_folder_in(conn, name.trim(), parent, style).map(|(id, _)| id))
    }

    /// Write one import atomically. Bookmarks whose URL is already stored are
    /// skipped and counted.
    pub fn persist_import(&self, parsed: &ParsedImport) -> Result<PersistOutcome> {
        let outcome = self.db.transaction(|conn| {
            let mut outcome = PersistOutcome::default();
            let mut durable: HashMap<FolderId, i64> = HashMap::new();

            for folder in &parsed.folders {
                let parent = folder.parent_id.and_then(|p| durable.get(&p).copied());
                let style = FolderStyle {
                    color: folder.color.clone(),
                    icon: folder.icon.clone(),
                };
                let (id, created) = ensure_folder_in(conn, &folder.name, parent, &style)?;
                if created {
                    outcome.folders_created += 1;
                } else {
                    outcome.folders_reused += 1;
                }
                durable.insert(folder.id, id);
            }

            let created_at = Utc::now().to_rfc3339();
            for bookmark in &parsed.bookmarks {
                let folder_id = bookmark.folder_id.and_then(|f| durable.get(&f).copied());
                let inserted = conn.execute(
                    "INSERT INTO bookmarks (title, url, folder_id, tags, color_hint, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(url) DO NOTHING",
                    rusqlite::params![
                        bookmark.title,
                        bookmark.url,
                        folder_id,
                        bookmark.tags,
                        bookmark.color_hint,
                        created_at
                    ],
                )?;

                if inserted == 0 {
                    tracing::debug!(url = %bookmark.url, "Skipping bookmark with known URL");
                    outcome.duplicates_skipped += 1;
                } else {
                    outcome.bookmarks_created += 1;
                    outcome.created_bookmark_ids.push(conn.last_insert_rowid());
                }
            }

            Ok(outcome)
        })?;

        if outcome.duplicates_skipped > 0 {
            tracing::warn!(
                skipped = outcome.duplicates_skipped,
                "Import contained bookmarks that already exist"
            );
        }
        tracing::info!(
            folders_created = outcome.folders_created,
            bookmarks_created = outcome.bookmarks_created,
            "Persisted import"
        );

        Ok(outcome)
    }

    pub fn folder(&self, id: i64) -> Result<ParsedFolder> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT id, name, parent_id, color, icon FROM folders WHERE id = ?1",
                [id],
                folder_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("folder {id}")))
        })
    }

    /// All folders, parents before children.
    pub fn folders(&self) -> Result<Vec<ParsedFolder>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, parent_id, color, icon FROM folders ORDER BY id",
            )?;
            let folders = stmt
                .query_map([], folder_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(folders)
        })
    }

    pub fn bookmarks(&self) -> Result<Vec<ParsedBookmark>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT title, url, folder_id, tags, color_hint FROM bookmarks ORDER BY id",
            )?;
            let bookmarks = stmt
                .query_map([], |row| {
                    Ok(ParsedBookmark {
                        title: row.get(0)?,
                        url: row.get(1)?,
                        folder_id: row.get::<_, Option<i64>>(2)?.map(durable_id),
                        tags: row.get(3)?,
                        color_hint: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(bookmarks)
        })
    }
}

fn durable_id(id: i64) -> FolderId {
    FolderId(id as u64)
}

fn folder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ParsedFolder> {
    Ok(ParsedFolder {
        id: durable_id(row.get(0)?),
        name: row.get(1)?,
        parent_id: row.get::<_, Option<i64>>(2)?.map(durable_id),
        color: row.get(3)?,
        icon: row.get(4)?,
    })
}

/// Returns the folder id and whether it was created by this call.
fn ensure_folder_in(
    conn: &Connection,
    name: &str,
    parent: Option<i64>,
    style: &FolderStyle,
) -> Result<(i64, bool)> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM folders WHERE name = ?1 AND parent_id IS ?2",
            rusqlite::params![name, parent],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok((id, false));
    }

    conn.execute(
        "INSERT INTO folders (name, parent_id, color, icon, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![name, parent, style.color, style.icon, Utc::now().to_rfc3339()],
    )?;
    Ok((conn.last_insert_rowid(), true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchormarks_interchange::{import_html, ImportOptions};

    const EXPORT: &str = r#"<DL><p>
<DT><H3>Dev</H3>
<DL><p>
    <DT><H3>Rust</H3>
    <DL><p>
        <DT><A HREF="https://crates.io" TAGS="rust, registry">crates.io</A>
    </DL><p>
    <DT><A HREF="https://github.com">GitHub</A>
</DL><p>
<DT><A HREF="https://example.com">Example</A>
</DL><p>"#;

    fn store() -> BookmarkStore {
        BookmarkStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_persist_import_assigns_durable_ids() {
        let store = store();
        let parsed = import_html(EXPORT, &ImportOptions::default());
        let outcome = store.persist_import(&parsed).unwrap();
        assert_eq!(outcome.folders_created, 2);
        assert_eq!(outcome.bookmarks_created, 3);
        assert_eq!(outcome.created_bookmark_ids.len(), 3);

        let folders = store.folders().unwrap();
        let dev = folders.iter().find(|f| f.name == "Dev").unwrap();
        let rust = folders.iter().find(|f| f.name == "Rust").unwrap();
        assert_eq!(dev.parent_id, None);
        assert_eq!(rust.parent_id, Some(dev.id));

        let bookmarks = store.bookmarks().unwrap();
        let crates = bookmarks.iter().find(|b| b.title == "crates.io").unwrap();
        assert_eq!(crates.folder_id, Some(rust.id));
        assert_eq!(crates.tags.as_deref(), Some("rust, registry"));
        let example = bookmarks.iter().find(|b| b.title == "Example").unwrap();
        assert_eq!(example.folder_id, None);
    }

    #[test]
    fn test_second_import_reuses_folders_and_skips_urls() {
        let store = store();
        let parsed = import_html(EXPORT, &ImportOptions::default());
        store.persist_import(&parsed).unwrap();

        let outcome = store.persist_import(&parsed).unwrap();
        assert_eq!(outcome.folders_created, 0);
        assert_eq!(outcome.folders_reused, 2);
        assert_eq!(outcome.bookmarks_created, 0);
        assert_eq!(outcome.duplicates_skipped, 3);
        assert_eq!(store.folders().unwrap().len(), 2);
        assert_eq!(store.bookmarks().unwrap().len(), 3);
    }

    #[test]
    fn test_ensure_folder_is_idempotent() {
        let store = store();
        let style = FolderStyle::default();
        let root = store.ensure_folder("Work", None, &style).unwrap();
        assert_eq!(store.ensure_folder("Work", None, &style).unwrap(), root);

        let nested = store.ensure_folder("Work", Some(root), &style).unwrap();
        assert_ne!(nested, root);

        let folder = store.folder(nested).unwrap();
        assert_eq!(folder.parent_id, Some(FolderId(root as u64)));
        assert_eq!(folder.color, style.color);
    }

    #[test]
    fn test_missing_folder() {
        let err = store().folder(99).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
