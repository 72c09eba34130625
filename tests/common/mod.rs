#![allow(dead_code)]

use chrono::NaiveDate;
use rent_ledger::{
    core::services::RenterService,
    ledger::{Money, NewRenter, RentBook},
    storage::JsonFileStore,
};
use std::collections::HashMap;
use tempfile::TempDir;
use uuid::Uuid;

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date")
}

pub fn rupees(amount: i64) -> Money {
    Money::from_major(amount)
}

/// Book holding one active renter with the given advance credit.
pub fn book_with_renter(advance: i64) -> (RentBook, Uuid) {
    let mut book = RentBook::new();
    let id = RenterService::add(
        &mut book,
        NewRenter::new("Asha Rao", "A-101", day(), rupees(12_000)).with_advance(rupees(advance)),
        day(),
    )
    .expect("add renter");
    (book, id)
}

/// Every renter balance equals the sum of its invoices' pending amounts.
pub fn assert_balance_invariant(book: &RentBook) {
    let mut expected: HashMap<Uuid, Money> = HashMap::new();
    for txn in book.transactions() {
        *expected.entry(txn.renter_id).or_insert(Money::ZERO) += txn.pending_amount();
    }
    for renter in book.renters() {
        let sum = expected.get(&renter.id).copied().unwrap_or(Money::ZERO);
        assert_eq!(renter.balance, sum, "balance drift for renter {}", renter.id);
    }
}

/// JSON store rooted in a fresh temporary directory.
pub fn temp_store() -> (JsonFileStore, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let store = JsonFileStore::with_retention(temp.path().join("data"), "gharrent", 3)
        .expect("create json store");
    (store, temp)
}
