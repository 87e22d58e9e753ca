//! SQLite database setup and connection management for ComplaintPro.
//! Handles database initialization, schema creation, and connection management.

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::repository::{ComplaintRepository, DbConn};
use crate::infra::app_config::app_data_dir;

const SCHEMA_VERSION: i32 = 1;

/// Archive of every classified complaint, independent of the rolling window.
pub struct Database {
    conn: DbConn,
}

impl Database {
    /// Create or open the database at the default location
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::default_path())
    }

    /// Create an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Create or open the database at a specific path
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        log::debug!("Opened complaint archive at {}", path.display());
        Ok(db)
    }

    fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("COMPLAINTPRO_DB_PATH") {
            return PathBuf::from(path);
        }
        app_data_dir().join("complaints.sqlite")
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn.lock();

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if existing_version == 0 {
            Self::create_schema(&conn)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        } else if existing_version > SCHEMA_VERSION {
            bail!(
                "Database schema version {} is newer than supported version {}",
                existing_version,
                SCHEMA_VERSION
            );
        }

        Ok(())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS complaints (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                category TEXT NOT NULL,
                priority TEXT NOT NULL,
                confidence REAL,
                captured_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_complaints_captured_at
                ON complaints(captured_at);
            CREATE INDEX IF NOT EXISTS idx_complaints_category
                ON complaints(category);
            "#,
        )
        .context("create schema")?;
        Ok(())
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> DbConn {
        self.conn.clone()
    }

    pub fn complaint_repo(&self) -> ComplaintRepository {
        ComplaintRepository::new(self.connection())
    }
}
