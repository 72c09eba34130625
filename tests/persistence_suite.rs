mod common;

use common::{day, rupees, temp_store};
use rent_ledger::{
    core::{ledger_manager::LedgerManager, time::FixedClock},
    errors::LedgerError,
    ledger::{InvoiceDraft, NewRenter, Renter, TransactionPatch},
    storage::{DocumentKey, DocumentStore, JsonFileStore, MemoryStore},
};
use std::fs;
use std::path::{Path, PathBuf};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

fn open(store: JsonFileStore) -> LedgerManager {
    LedgerManager::open_with_clock(Box::new(store), Box::new(FixedClock(day())))
        .expect("open ledger")
        .0
}

#[test]
fn ledger_roundtrips_through_json_files() {
    let (store, _guard) = temp_store();
    let mut manager = open(store.clone());
    let id = manager
        .add_renter(
            NewRenter::new("Asha Rao", "A-101", day(), rupees(12_000))
                .with_phone("98450 00000")
                .with_email("asha@example.com")
                .with_advance(rupees(2_000)),
        )
        .unwrap();
    let txn = manager
        .create_invoice(
            InvoiceDraft::new(id, rupees(12_000), day()).with_description("April rent"),
            true,
        )
        .unwrap();
    manager
        .update_transaction(txn.id, TransactionPatch::payment(rupees(5_000)))
        .unwrap();

    assert!(store.document_path(DocumentKey::Renters).exists());
    assert!(store.document_path(DocumentKey::Transactions).exists());

    let reopened = open(store);
    assert_eq!(reopened.book(), manager.book());
    assert!(reopened.audit().is_clean());
}

#[test]
fn atomic_save_failure_preserves_original_file_and_memory() {
    let (store, _guard) = temp_store();
    let mut manager = open(store.clone());
    let id = manager
        .add_renter(NewRenter::new("Ravi", "B-2", day(), rupees(7_000)))
        .unwrap();
    let path = store.document_path(DocumentKey::Transactions);
    let original = fs::read_to_string(&path).expect("read original file");
    let renters_path = store.document_path(DocumentKey::Renters);
    let original_renters = fs::read_to_string(&renters_path).unwrap();
    let before = manager.book().clone();

    // A directory at the temp path makes File::create fail.
    fs::create_dir_all(tmp_path_for(&path)).unwrap();
    let result = manager.create_invoice(InvoiceDraft::new(id, rupees(7_000), day()), false);
    assert!(result.is_err(), "expected save to fail");

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(fs::read_to_string(&renters_path).unwrap(), original_renters);
    assert_eq!(manager.book(), &before);
}

#[test]
fn each_save_backs_up_the_previous_document() {
    let (store, _guard) = temp_store();
    let mut manager = open(store.clone());
    let id = manager
        .add_renter(NewRenter::new("Neel", "C-3", day(), rupees(8_000)))
        .unwrap();
    manager.toggle_renter_status(id).unwrap();

    let backups = store.list_backups(DocumentKey::Renters).unwrap();
    assert_eq!(backups.len(), 1);
    let saved = fs::read_to_string(&backups[0].path).unwrap();
    assert!(saved.contains("\"active\""));

    store.restore_backup(&backups[0]).unwrap();
    let restored = open(store);
    assert!(restored.book().renter(id).unwrap().is_active());
}

#[test]
fn backups_are_pruned_to_retention() {
    let (store, _guard) = temp_store();
    for round in 0..6 {
        store
            .write(DocumentKey::Renters, &format!("[{round}]"))
            .unwrap();
    }
    let backups = store.list_backups(DocumentKey::Renters).unwrap();
    assert!(backups.len() <= 3, "found {} backups", backups.len());
    assert!(!backups.is_empty());
}

#[test]
fn legacy_bare_arrays_still_load() {
    let renter = Renter::new(
        NewRenter::new("Old Tenant", "D-4", day(), rupees(5_000)),
        day(),
    );
    let mut legacy = serde_json::to_value(vec![&renter]).unwrap();
    // Records written before renter status existed.
    legacy[0].as_object_mut().unwrap().remove("status");
    legacy[0].as_object_mut().unwrap().remove("advance_balance");

    let store = MemoryStore::new()
        .with_document(DocumentKey::Renters, legacy.to_string())
        .with_document(DocumentKey::Transactions, "[]");
    let (manager, metadata) = LedgerManager::open(Box::new(store.clone())).unwrap();
    assert_eq!(metadata.legacy_documents.len(), 2);
    let loaded = manager.book().renter(renter.id).unwrap();
    assert!(loaded.is_active());
    assert_eq!(loaded.advance_balance, rupees(0));

    manager.save().unwrap();
    let upgraded = store.read(DocumentKey::Renters).unwrap().unwrap();
    assert!(upgraded.contains("schema_version"));
}

#[test]
fn future_schema_versions_are_rejected() {
    let store = MemoryStore::new().with_document(
        DocumentKey::Transactions,
        r#"{"schema_version": 99, "records": []}"#,
    );
    let err = LedgerManager::open(Box::new(store))
        .err()
        .expect("newer schema should be rejected");
    assert!(matches!(err, LedgerError::Persistence(msg) if msg.contains("newer")));
}

#[test]
fn corrupt_documents_surface_as_serde_errors() {
    let (store, _guard) = temp_store();
    fs::write(store.document_path(DocumentKey::Renters), "{not json").unwrap();
    let err = LedgerManager::open(Box::new(store)).err().expect("corrupt file");
    assert!(matches!(err, LedgerError::Serde(_)));
}
