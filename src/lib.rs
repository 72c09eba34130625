#![doc(test(attr(deny(warnings))))]

//! Rent Ledger keeps renter balances, advance credit and invoices consistent
//! as bills are issued, paid, edited and removed.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Rent Ledger tracing initialized.");
    });
}
