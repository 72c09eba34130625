//! Ledger domain models, persistence-friendly types, and the record store.

pub mod book;
pub mod money;
pub mod renter;
pub mod transaction;

pub use book::RentBook;
pub use money::Money;
pub use renter::{NewRenter, Renter, RenterPatch, RenterStatus};
pub use transaction::{
    BillingMonth, InvoiceDraft, Transaction, TransactionKind, TransactionPatch, TransactionStatus,
};
