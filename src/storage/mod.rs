mod document;
mod schema;
mod sqlite;

pub use document::{parse as parse_document, render as render_document, render_pretty, DocumentError};
pub use sqlite::SqliteStorage;

/// Name of the blob holding the transaction document.
pub const TRANSACTIONS_BLOB: &str = "transactions-storage";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to open storage at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {0} is newer than this build supports")]
    UnsupportedVersion(i32),
    #[error("persisted data is corrupt: {0}")]
    Corrupt(#[from] DocumentError),
    #[error("failed to encode transactions: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key/value text storage. One blob per name, overwritten on every write.
pub trait BlobStorage {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, name: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local storage with nothing behind it.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blobs: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_blob(name: &str, value: &str) -> Self {
        let mut blobs = std::collections::HashMap::new();
        blobs.insert(name.to_string(), value.to_string());
        Self { blobs }
    }
}

#[cfg(test)]
impl BlobStorage for MemoryStorage {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(name).cloned())
    }

    fn write(&mut self, name: &str, value: &str) -> Result<(), StorageError> {
        self.blobs.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
