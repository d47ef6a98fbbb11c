use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Arc;

/// Client-local state database.
///
/// Holds what the browser client kept in local storage: the session, the
/// per-book progress for books viewed read-only, and preferences. Nothing
/// in here expires.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- At most one remembered session
            CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                token TEXT NOT NULL,
                username TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Progress for books read without owning them
            CREATE TABLE IF NOT EXISTS local_progress (
                book_id TEXT PRIMARY KEY,
                page INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Database(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== SESSION OPERATIONS ==========

    /// Save the session, replacing any previous one.
    pub fn save_session(&self, token: &str, username: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO session (id, token, username, created_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET
                token = excluded.token,
                username = excluded.username,
                created_at = excluded.created_at",
            params![token, username, now_timestamp()],
        )
        .map_err(|e| AppError::Database(format!("Failed to save session: {}", e)))?;
        Ok(())
    }

    /// Get the remembered session.
    pub fn get_session(&self) -> Result<Option<StoredSession>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT token, username, created_at FROM session WHERE id = 1",
            [],
            |row| {
                Ok(StoredSession {
                    token: row.get(0)?,
                    username: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Database(format!("Failed to get session: {}", e)))
    }

    /// Forget the session. Returns whether one existed.
    pub fn clear_session(&self) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM session", [])
            .map_err(|e| AppError::Database(format!("Failed to clear session: {}", e)))?;
        Ok(rows > 0)
    }

    // ========== LOCAL PROGRESS OPERATIONS ==========

    /// Save or update the local page for a book.
    pub fn set_local_progress(&self, book_id: &str, page: u32) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO local_progress (book_id, page, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (book_id) DO UPDATE SET
                page = excluded.page,
                updated_at = excluded.updated_at",
            params![book_id, page, now_timestamp()],
        )
        .map_err(|e| AppError::Database(format!("Failed to save local progress: {}", e)))?;
        Ok(())
    }

    /// Get the local progress entry for a book.
    pub fn get_local_progress(&self, book_id: &str) -> Result<Option<LocalProgressEntry>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT book_id, page, updated_at FROM local_progress WHERE book_id = ?1",
            params![book_id],
            |row| {
                Ok(LocalProgressEntry {
                    book_id: row.get(0)?,
                    page: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Database(format!("Failed to get local progress: {}", e)))
    }

    // ========== PREFERENCE OPERATIONS ==========

    /// Set a preference value.
    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| AppError::Database(format!("Failed to save preference: {}", e)))?;
        Ok(())
    }

    /// Get a preference value.
    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| AppError::Database(format!("Failed to get preference: {}", e)))
    }
}
