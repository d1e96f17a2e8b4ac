use chrono::NaiveDate;
use std::path::Path;

use crate::models::{NewTransaction, Transaction, TransactionPatch};
use crate::storage::{self, BlobStorage, DocumentError, StorageError, TRANSACTIONS_BLOB};
use crate::store::{TransactionRepository, TransactionStore};

/// How the collection was obtained when the ledger was opened.
#[derive(Debug)]
pub enum LoadStatus {
    /// Persisted state was read back.
    Restored,
    /// Nothing persisted yet; started from the sample data.
    Seeded,
    /// Persisted state could not be read; started from the sample data.
    Recovered(StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A transaction store backed by blob storage. Every mutation that changes
/// the collection is followed by a full save.
pub struct Ledger<S: BlobStorage> {
    store: TransactionStore,
    storage: S,
}

impl<S: BlobStorage> Ledger<S> {
    /// Load persisted state, falling back to the sample data. Never fails.
    pub fn open(backend: S, today: NaiveDate) -> (Self, LoadStatus) {
        let loaded = backend
            .read(TRANSACTIONS_BLOB)
            .and_then(|blob| match blob {
                Some(text) => Ok(Some(storage::parse_document(&text)?)),
                None => Ok(None),
            });

        let (store, status) = match loaded {
            Ok(Some(transactions)) => (TransactionStore::new(transactions), LoadStatus::Restored),
            Ok(None) => (TransactionStore::seeded(today), LoadStatus::Seeded),
            Err(e) => (TransactionStore::seeded(today), LoadStatus::Recovered(e)),
        };

        (
            Self {
                store,
                storage: backend,
            },
            status,
        )
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&mut self) -> Result<(), StorageError> {
        let doc = storage::render_document(self.store.transactions())?;
        self.storage.write(TRANSACTIONS_BLOB, &doc)
    }

    /// Write `next` to storage, then make it the live collection. On a failed
    /// write the live collection is left as it was.
    fn commit(&mut self, next: TransactionStore) -> Result<(), StorageError> {
        let doc = storage::render_document(next.transactions())?;
        self.storage.write(TRANSACTIONS_BLOB, &doc)?;
        self.store = next;
        Ok(())
    }

    /// The export document for the current collection.
    pub fn export_json(&self) -> Result<String, StorageError> {
        Ok(storage::render_pretty(self.store.transactions())?)
    }

    pub fn export_to_file(&self, path: &Path) -> Result<usize, StorageError> {
        std::fs::write(path, self.export_json()?)?;
        Ok(self.store.len())
    }

    /// Replace the whole collection with the contents of `text`.
    ///
    /// The document is fully validated and saved before memory is touched, so
    /// on any error the previous collection stays in place.
    pub fn import_json(&mut self, text: &str) -> Result<usize, ImportError> {
        let transactions = storage::parse_document(text)?;
        let doc = storage::render_document(&transactions).map_err(StorageError::from)?;
        self.storage.write(TRANSACTIONS_BLOB, &doc)?;

        let count = transactions.len();
        self.store.replace_all(transactions);
        Ok(count)
    }

    pub fn import_file(&mut self, path: &Path) -> Result<usize, ImportError> {
        let text = std::fs::read_to_string(path)?;
        self.import_json(&text)
    }
}

impl<S: BlobStorage> TransactionRepository for Ledger<S> {
    type Error = StorageError;

    fn transactions(&self) -> &[Transaction] {
        self.store.transactions()
    }

    fn add(&mut self, new: NewTransaction) -> Result<Transaction, StorageError> {
        let mut next = self.store.clone();
        let txn = next.add(new).unwrap_or_else(|never| match never {});
        self.commit(next)?;
        Ok(txn)
    }

    fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<bool, StorageError> {
        let mut next = self.store.clone();
        let changed = next.update(id, patch).unwrap_or_else(|never| match never {});
        if changed {
            self.commit(next)?;
        }
        Ok(changed)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut next = self.store.clone();
        let removed = next.delete(id).unwrap_or_else(|never| match never {});
        if removed {
            self.commit(next)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests;
