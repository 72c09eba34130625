use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use super::{DocumentKey, DocumentStore};
use crate::errors::{LedgerError, Result};

/// Process-local document store. Clones share the same documents, which lets
/// tests reopen a ledger against what a previous manager saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<DocumentKey, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document, e.g. with data exported from another store.
    pub fn with_document(self, key: DocumentKey, contents: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.documents.write() {
            guard.insert(key, contents.into());
        }
        self
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: DocumentKey) -> Result<Option<String>> {
        let guard = self
            .documents
            .read()
            .map_err(|_| LedgerError::Persistence("memory store lock poisoned".into()))?;
        Ok(guard.get(&key).cloned())
    }

    fn write(&self, key: DocumentKey, contents: &str) -> Result<()> {
        let mut guard = self
            .documents
            .write()
            .map_err(|_| LedgerError::Persistence("memory store lock poisoned".into()))?;
        guard.insert(key, contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
