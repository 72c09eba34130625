pub mod document;
pub mod json_backend;
pub mod memory;

use std::fmt;

use crate::errors::Result;

/// The two logical documents a rent ledger persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Renters,
    Transactions,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 2] = [DocumentKey::Renters, DocumentKey::Transactions];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKey::Renters => "renters",
            DocumentKey::Transactions => "transactions",
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value persistence for whole serialized documents. Each write replaces
/// the previous contents of that key entirely.
pub trait DocumentStore: Send + Sync {
    /// Returns `None` when nothing has been stored under `key` yet.
    fn read(&self, key: DocumentKey) -> Result<Option<String>>;
    fn write(&self, key: DocumentKey, contents: &str) -> Result<()>;

    /// Short human-readable location used in log lines.
    fn describe(&self) -> String;
}

pub use document::CURRENT_SCHEMA_VERSION;
pub use json_backend::{BackupInfo, JsonFileStore};
pub use memory::MemoryStore;
