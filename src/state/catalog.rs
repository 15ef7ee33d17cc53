use rusqlite::{params, Connection, Result as SqlResult};
use std::path::{Path, PathBuf};
use chrono::Utc;
use tracing::{debug, info};

use super::backend::Backend;
use super::data::ProjectRecord;
use crate::error::BackendError;

/// The catalog keeps the project collection in a SQLite database.
/// Each record is one row holding its JSON body, ordered by position.
pub struct SqliteBackend {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open (or create) the catalog at `db_path` and initialize the schema.
    ///
    /// The default location comes from [`Config`](crate::config::Config):
    /// - Linux: ~/.local/share/folio/folio.db
    /// - macOS: ~/Library/Application Support/folio/folio.db
    /// - Windows: %APPDATA%\folio\folio.db
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let db_path = db_path.into();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BackendError::io(parent, e))?;
        }

        let conn = Connection::open(&db_path)?;
        info!("📁 Catalog opened at: {}", db_path.display());

        let catalog = SqliteBackend {
            conn,
            db_path: Some(db_path),
        };
        catalog.init_schema()?;

        Ok(catalog)
    }

    /// A catalog that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, BackendError> {
        let catalog = SqliteBackend {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Create the projects table if it doesn't exist
    fn init_schema(&self) -> SqlResult<()> {
        // record_id holds the id as JSON so numeric and key ids never collide
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                position        INTEGER PRIMARY KEY,
                record_id       TEXT NOT NULL UNIQUE,
                body_json       TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        debug!("catalog schema initialized");
        Ok(())
    }

    /// Get the path to the database file (None when in memory)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read_all(&self) -> Result<Vec<ProjectRecord>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT body_json FROM projects ORDER BY position")?;

        let bodies = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for body in bodies {
            records.push(serde_json::from_str(&body?)?);
        }

        Ok(records)
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), BackendError> {
        let now = Utc::now().timestamp();
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM projects", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO projects (position, record_id, body_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, record) in records.iter().enumerate() {
                insert.execute(params![
                    position as i64,
                    serde_json::to_string(&record.id)?,
                    serde_json::to_string(record)?,
                    now,
                ])?;
            }
        }

        // Dropping the transaction without commit rolls it back
        tx.commit()?;

        debug!(count = records.len(), "catalog rewritten");
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{ProjectDraft, RecordId};

    fn record(id: RecordId, title: &str) -> ProjectRecord {
        ProjectRecord::from_draft(
            id,
            ProjectDraft {
                title: title.to_string(),
                category: vec!["web".to_string()],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = SqliteBackend::open_in_memory().unwrap();

        assert!(catalog.read_all().unwrap().is_empty());
        assert!(catalog.path().is_none());
    }

    #[test]
    fn test_write_keeps_order() {
        let mut catalog = SqliteBackend::open_in_memory().unwrap();
        let records = vec![
            record(RecordId::Local(5), "five"),
            record(RecordId::Local(1), "one"),
            record(RecordId::Key("1".to_string()), "keyed"),
        ];

        catalog.write_all(&records).unwrap();

        assert_eq!(catalog.read_all().unwrap(), records);
    }

    #[test]
    fn test_rewrite_replaces_rows() {
        let mut catalog = SqliteBackend::open_in_memory().unwrap();
        catalog
            .write_all(&[record(RecordId::Local(1), "a"), record(RecordId::Local(2), "b")])
            .unwrap();

        catalog.write_all(&[record(RecordId::Local(2), "b")]).unwrap();

        let records = catalog.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "b");
    }

    #[test]
    fn test_duplicate_ids_rejected_and_rolled_back() {
        let mut catalog = SqliteBackend::open_in_memory().unwrap();
        catalog.write_all(&[record(RecordId::Local(1), "a")]).unwrap();

        let dup = [record(RecordId::Local(9), "x"), record(RecordId::Local(9), "y")];
        assert!(matches!(catalog.write_all(&dup), Err(BackendError::Sqlite(_))));

        // the failed rewrite left the previous rows in place
        assert_eq!(catalog.read_all().unwrap()[0].title, "a");
    }

    #[test]
    fn test_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio").join("folio.db");

        {
            let mut catalog = SqliteBackend::open(&path).unwrap();
            catalog.write_all(&[record(RecordId::Local(1), "kept")]).unwrap();
        }

        let catalog = SqliteBackend::open(&path).unwrap();
        assert_eq!(catalog.read_all().unwrap()[0].title, "kept");
        assert_eq!(catalog.path(), Some(path.as_path()));
    }
}
