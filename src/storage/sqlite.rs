use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{schema, BlobStorage, StorageError};

/// Named text blobs in a single SQLite table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.display().to_string(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let mut storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// A throwaway database; nothing written survives the process.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let mut storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// Create the tables on first open; refuse a newer schema version.
    fn migrate(&mut self) -> Result<(), StorageError> {
        self.conn.execute_batch(schema::SCHEMA_V1)?;
        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match version {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![schema::CURRENT_VERSION],
                )?;
            }
            Some(v) if v > schema::CURRENT_VERSION => {
                return Err(StorageError::UnsupportedVersion(v));
            }
            Some(_) => {}
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn schema_version(&self) -> Result<i32, StorageError> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?)
    }
}

impl BlobStorage for SqliteStorage {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM blobs WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn write(&mut self, name: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO blobs (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = ?2, updated_at = ?3",
            params![name, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
