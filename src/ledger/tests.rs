#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::{Category, TransactionType};
use crate::storage::MemoryStorage;
use rust_decimal_macros::dec;
use serde_json::Value;

const DOC: &str = r#"{"transactions":[{"id":"a1","amount":300,"description":"Bonus","category":"salary","date":"2024-02-01","type":"income"},{"id":"b2","amount":19.99,"description":"Spotify","category":"entertainment","date":"2024-02-03","type":"expense","notes":"family plan"}]}"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
}

fn lunch() -> NewTransaction {
    NewTransaction {
        amount: dec!(12.50),
        description: "Lunch".into(),
        category: Category::Food,
        date: today(),
        kind: TransactionType::Expense,
        notes: None,
    }
}

/// Storage whose reads and/or writes always fail.
#[derive(Default)]
struct BrokenStorage {
    fail_reads: bool,
    fail_writes: bool,
    inner: MemoryStorage,
    writes: usize,
}

impl BlobStorage for BrokenStorage {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Io(std::io::Error::other("read failed")));
        }
        self.inner.read(name)
    }

    fn write(&mut self, name: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::other("write failed")));
        }
        self.writes += 1;
        self.inner.write(name, value)
    }
}

fn ids<S: BlobStorage>(ledger: &Ledger<S>) -> Vec<String> {
    ledger.transactions().iter().map(|t| t.id.clone()).collect()
}

// ── Loading ───────────────────────────────────────────────────

#[test]
fn test_open_empty_storage_seeds() {
    let (ledger, status) = Ledger::open(MemoryStorage::default(), today());
    assert!(matches!(status, LoadStatus::Seeded));
    assert_eq!(ledger.transactions().len(), 6);
}

#[test]
fn test_open_restores_saved_state() {
    let (ledger, status) = Ledger::open(MemoryStorage::with_blob(TRANSACTIONS_BLOB, DOC), today());
    assert!(matches!(status, LoadStatus::Restored));
    assert_eq!(ledger.transactions().len(), 2);
    assert_eq!(ids(&ledger), vec!["a1", "b2"]);
}

#[test]
fn test_open_corrupt_state_recovers_with_seed() {
    let storage = MemoryStorage::with_blob(TRANSACTIONS_BLOB, "{\"state\": [broken");
    let (ledger, status) = Ledger::open(storage, today());
    assert!(matches!(status, LoadStatus::Recovered(StorageError::Corrupt(_))));
    assert_eq!(ledger.transactions().len(), 6);
}

#[test]
fn test_open_unreadable_storage_recovers_with_seed() {
    let storage = BrokenStorage {
        fail_reads: true,
        ..Default::default()
    };
    let (ledger, status) = Ledger::open(storage, today());
    assert!(matches!(status, LoadStatus::Recovered(StorageError::Io(_))));
    assert_eq!(ledger.transactions().len(), 6);
}

// ── Mutations persist ─────────────────────────────────────────

#[test]
fn test_add_is_saved() {
    let (mut ledger, _) = Ledger::open(MemoryStorage::default(), today());
    let added = ledger.add(lunch()).unwrap();

    let (reopened, status) = Ledger::open(ledger.storage().clone(), today());
    assert!(matches!(status, LoadStatus::Restored));
    assert_eq!(reopened.transactions().len(), 7);
    assert_eq!(reopened.transactions()[0], added);
}

#[test]
fn test_update_and_delete_are_saved() {
    let (mut ledger, _) = Ledger::open(MemoryStorage::default(), today());
    let patch = TransactionPatch {
        description: Some("Monthly rent".into()),
        ..Default::default()
    };
    assert!(ledger.update("3", &patch).unwrap());
    assert!(ledger.delete("2").unwrap());

    let (reopened, _) = Ledger::open(ledger.storage().clone(), today());
    assert_eq!(reopened.get_by_id("3").unwrap().description, "Monthly rent");
    assert!(reopened.get_by_id("2").is_none());
}

#[test]
fn test_noop_mutations_do_not_write() {
    let (mut ledger, _) = Ledger::open(BrokenStorage::default(), today());
    assert!(!ledger.delete("missing").unwrap());
    assert!(!ledger.update("missing", &TransactionPatch::default()).unwrap());
    assert_eq!(ledger.storage().writes, 0);
    assert_eq!(ledger.transactions().len(), 6);
}

#[test]
fn test_empty_patch_does_not_write() {
    let (mut ledger, _) = Ledger::open(BrokenStorage::default(), today());
    let before = ledger.transactions().to_vec();
    assert!(!ledger.update("1", &TransactionPatch::default()).unwrap());
    assert_eq!(ledger.storage().writes, 0);
    assert_eq!(ledger.transactions(), before.as_slice());
}

fn unwritable_ledger() -> Ledger<BrokenStorage> {
    let storage = BrokenStorage {
        fail_writes: true,
        ..Default::default()
    };
    Ledger::open(storage, today()).0
}

#[test]
fn test_failed_add_leaves_collection_unchanged() {
    let mut ledger = unwritable_ledger();
    let before = ledger.transactions().to_vec();
    assert!(ledger.add(lunch()).is_err());
    assert_eq!(ledger.transactions(), before.as_slice());
}

#[test]
fn test_failed_update_leaves_collection_unchanged() {
    let mut ledger = unwritable_ledger();
    let before = ledger.transactions().to_vec();
    let patch = TransactionPatch {
        amount: Some(dec!(1)),
        ..Default::default()
    };
    assert!(ledger.update("1", &patch).is_err());
    assert_eq!(ledger.transactions(), before.as_slice());
}

#[test]
fn test_failed_delete_leaves_collection_unchanged() {
    let mut ledger = unwritable_ledger();
    let before = ledger.transactions().to_vec();
    assert!(ledger.delete("1").is_err());
    assert_eq!(ledger.transactions(), before.as_slice());
    assert!(ledger.get_by_id("1").is_some());
}

// ── Import / export ───────────────────────────────────────────

#[test]
fn test_import_replaces_collection_and_saves() {
    let (mut ledger, _) = Ledger::open(MemoryStorage::default(), today());
    assert_eq!(ledger.import_json(DOC).unwrap(), 2);
    assert_eq!(ids(&ledger), vec!["a1", "b2"]);

    let (reopened, _) = Ledger::open(ledger.storage().clone(), today());
    assert_eq!(ids(&reopened), vec!["a1", "b2"]);
}

#[test]
fn test_import_then_export_round_trips_transactions() {
    let (mut ledger, _) = Ledger::open(MemoryStorage::default(), today());
    ledger.import_json(DOC).unwrap();

    let exported: Value = serde_json::from_str(&ledger.export_json().unwrap()).unwrap();
    let original: Value = serde_json::from_str(DOC).unwrap();
    assert_eq!(
        serde_json::to_string(&exported["state"]["transactions"]).unwrap(),
        serde_json::to_string(&original["transactions"]).unwrap()
    );
}

#[test]
fn test_export_can_be_imported() {
    let (mut source, _) = Ledger::open(MemoryStorage::default(), today());
    source.add(lunch()).unwrap();
    let exported = source.export_json().unwrap();

    let (mut target, _) = Ledger::open(MemoryStorage::default(), today());
    target.import_json(&exported).unwrap();
    assert_eq!(target.transactions(), source.transactions());
}

#[test]
fn test_import_invalid_json_keeps_state() {
    let (mut ledger, _) = Ledger::open(MemoryStorage::with_blob(TRANSACTIONS_BLOB, DOC), today());
    let before = ledger.transactions().to_vec();
    let blob_before = ledger.storage().read(TRANSACTIONS_BLOB).unwrap();

    let err = ledger.import_json("this is not json").unwrap_err();
    assert!(matches!(err, ImportError::Document(DocumentError::InvalidJson(_))));
    assert_eq!(ledger.transactions(), before.as_slice());
    assert_eq!(ledger.storage().read(TRANSACTIONS_BLOB).unwrap(), blob_before);
}

#[test]
fn test_import_write_failure_keeps_state() {
    let storage = BrokenStorage {
        fail_writes: true,
        ..Default::default()
    };
    let (mut ledger, _) = Ledger::open(storage, today());
    let before = ledger.transactions().to_vec();
    let err = ledger.import_json(DOC).unwrap_err();
    assert!(matches!(err, ImportError::Storage(_)));
    assert_eq!(ledger.transactions(), before.as_slice());
}

#[test]
fn test_export_and_import_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    let (ledger, _) = Ledger::open(MemoryStorage::with_blob(TRANSACTIONS_BLOB, DOC), today());
    assert_eq!(ledger.export_to_file(&path).unwrap(), 2);

    let (mut other, _) = Ledger::open(MemoryStorage::default(), today());
    assert_eq!(other.import_file(&path).unwrap(), 2);
    assert_eq!(other.get_by_id("b2").unwrap().notes.as_deref(), Some("family plan"));
}

#[test]
fn test_import_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ledger, _) = Ledger::open(MemoryStorage::default(), today());
    let err = ledger.import_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ImportError::Read(_)));
    assert_eq!(ledger.transactions().len(), 6);
}

#[test]
fn test_ledger_queries_through_repository() {
    let (ledger, _) = Ledger::open(MemoryStorage::with_blob(TRANSACTIONS_BLOB, DOC), today());
    assert_eq!(ledger.get_total_by_type(TransactionType::Income), dec!(300));
    assert_eq!(ledger.get_recent(1)[0].id, "b2");
}
