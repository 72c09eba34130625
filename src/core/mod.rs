pub mod audit;
pub mod ledger_manager;
pub mod services;
pub mod shared;
pub mod time;
pub mod utils;

pub use audit::{AuditIssue, AuditReport};
pub use ledger_manager::{LedgerManager, LoadMetadata};
pub use shared::SharedLedger;
pub use time::{Clock, FixedClock, SystemClock};
