//! Database connection

use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::Result;

/// Shared handle to the bookmark database. Clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "Opened bookmark database");

        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    // Folder deletes detach bookmarks through `ON DELETE SET NULL`, which
    // SQLite only enforces with foreign keys switched on.
    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside a transaction; any error rolls everything back.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let count: i32 =
                conn.query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_open_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marks.db");

        Database::open(&path)
            .unwrap()
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO folders (name, parent_id, color, icon, created_at) VALUES ('Work', NULL, '', '', '')",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let count: i64 = Database::open(&path)
            .unwrap()
            .with_connection(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_deleting_folder_detaches_bookmarks() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO folders (id, name, parent_id, color, icon, created_at) VALUES (1, 'Work', NULL, '', '', '')",
                [],
            )?;
            conn.execute(
                "INSERT INTO bookmarks (title, url, folder_id, created_at) VALUES ('a', 'https://a', 1, '')",
                [],
            )?;
            conn.execute("DELETE FROM folders WHERE id = 1", [])?;
            let folder: Option<i64> =
                conn.query_row("SELECT folder_id FROM bookmarks", [], |row| row.get(0))?;
            assert_eq!(folder, None);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<()> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO folders (name, parent_id, color, icon, created_at) VALUES ('x', NULL, '', '', '')",
                [],
            )?;
            Err(crate::StorageError::NotFound("abort".to_string()))
        });
        assert!(result.is_err());

        db.with_connection(|conn| {
            let count: i32 = conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }
}
