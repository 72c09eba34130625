use std::sync::{Arc, Mutex};

use crate::core::ledger_manager::LedgerManager;
use crate::errors::{LedgerError, Result};

/// Cloneable handle that serializes access to one [`LedgerManager`].
///
/// Each call to [`SharedLedger::with`] is a single critical section, so an
/// operation and its save are never interleaved with another caller's.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<LedgerManager>>,
}

impl SharedLedger {
    pub fn new(manager: LedgerManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    pub fn with<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut LedgerManager) -> Result<T>,
    {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Persistence("ledger lock poisoned".into()))?;
        operation(&mut guard)
    }
}
