use tracing::{info, warn};
use uuid::Uuid;

use crate::core::audit::{self, AuditReport};
use crate::core::services::{
    DashboardStats, InvoiceService, MonthCollection, RenterService, RenterStatement,
    SummaryService,
};
use crate::core::time::{Clock, SystemClock};
use crate::errors::Result;
use crate::ledger::{
    BillingMonth, InvoiceDraft, NewRenter, RentBook, Renter, RenterPatch, RenterStatus,
    Transaction, TransactionPatch,
};
use crate::storage::{document, DocumentKey, DocumentStore};

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadMetadata {
    pub location: String,
    pub renters: usize,
    pub transactions: usize,
    /// Documents that were stored without a schema envelope.
    pub legacy_documents: Vec<DocumentKey>,
    pub audit: AuditReport,
}

/// Facade that owns the record store and keeps it in sync with persistence.
///
/// Every mutation runs against a staged copy of the book. Both documents are
/// written in full and only then does the staged copy replace the live one, so
/// a failed write leaves the in-memory state exactly as it was.
pub struct LedgerManager {
    book: RentBook,
    storage: Box<dyn DocumentStore>,
    clock: Box<dyn Clock>,
}

impl LedgerManager {
    pub fn open(storage: Box<dyn DocumentStore>) -> Result<(Self, LoadMetadata)> {
        Self::open_with_clock(storage, Box::new(SystemClock))
    }

    pub fn open_with_clock(
        storage: Box<dyn DocumentStore>,
        clock: Box<dyn Clock>,
    ) -> Result<(Self, LoadMetadata)> {
        let mut manager = Self {
            book: RentBook::new(),
            storage,
            clock,
        };
        let metadata = manager.reload()?;
        Ok((manager, metadata))
    }

    /// Replaces the in-memory book with what storage currently holds.
    pub fn reload(&mut self) -> Result<LoadMetadata> {
        let mut legacy_documents = Vec::new();
        let renters = match self.storage.read(DocumentKey::Renters)? {
            Some(raw) => {
                let decoded = document::decode::<Renter>(&raw)?;
                if decoded.legacy {
                    legacy_documents.push(DocumentKey::Renters);
                }
                decoded.records
            }
            None => Vec::new(),
        };
        let transactions = match self.storage.read(DocumentKey::Transactions)? {
            Some(raw) => {
                let decoded = document::decode::<Transaction>(&raw)?;
                if decoded.legacy {
                    legacy_documents.push(DocumentKey::Transactions);
                }
                decoded.records
            }
            None => Vec::new(),
        };

        self.book = RentBook::from_parts(renters, transactions);
        let report = audit::reconcile(&self.book);
        for issue in &report.issues {
            warn!(%issue, "ledger audit finding");
        }
        let metadata = LoadMetadata {
            location: self.storage.describe(),
            renters: self.book.renter_count(),
            transactions: self.book.transaction_count(),
            legacy_documents,
            audit: report,
        };
        info!(
            location = %metadata.location,
            renters = metadata.renters,
            transactions = metadata.transactions,
            "ledger loaded"
        );
        Ok(metadata)
    }

    pub fn book(&self) -> &RentBook {
        &self.book
    }

    pub fn storage(&self) -> &dyn DocumentStore {
        self.storage.as_ref()
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Writes both documents as they are held in memory.
    pub fn save(&self) -> Result<()> {
        persist(self.storage.as_ref(), &self.book, None)
    }

    pub fn add_renter(&mut self, details: NewRenter) -> Result<Uuid> {
        self.apply(|book, clock| RenterService::add(book, details, clock.today()))
    }

    pub fn edit_renter(&mut self, id: Uuid, patch: RenterPatch) -> Result<Option<Renter>> {
        self.apply(|book, _| RenterService::edit(book, id, patch))
    }

    pub fn remove_renter(&mut self, id: Uuid) -> Result<Option<usize>> {
        self.apply(|book, _| Ok(RenterService::remove(book, id)))
    }

    pub fn toggle_renter_status(&mut self, id: Uuid) -> Result<Option<RenterStatus>> {
        self.apply(|book, _| Ok(RenterService::toggle_status(book, id)))
    }

    pub fn create_invoice(&mut self, draft: InvoiceDraft, use_advance: bool) -> Result<Transaction> {
        self.apply(|book, _| InvoiceService::create(book, draft, use_advance))
    }

    pub fn update_transaction(
        &mut self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        self.apply(|book, _| InvoiceService::update(book, id, patch))
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<Option<Transaction>> {
        self.apply(|book, _| InvoiceService::delete(book, id))
    }

    pub fn audit(&self) -> AuditReport {
        audit::reconcile(&self.book)
    }

    pub fn dashboard(&self) -> DashboardStats {
        SummaryService::dashboard(&self.book)
    }

    pub fn month_collection(&self, month: BillingMonth) -> MonthCollection {
        SummaryService::month_collection(&self.book, month)
    }

    pub fn statement(&self, renter_id: Uuid) -> Option<RenterStatement<'_>> {
        SummaryService::statement(&self.book, renter_id)
    }

    fn apply<T, F>(&mut self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut RentBook, &dyn Clock) -> Result<T>,
    {
        let mut staged = self.book.clone();
        let outcome = operation(&mut staged, self.clock.as_ref())?;
        if staged != self.book {
            persist(self.storage.as_ref(), &staged, Some(&self.book))?;
            self.book = staged;
        }
        Ok(outcome)
    }
}

/// Writes renters then transactions. When the second write fails the renters
/// document is rewritten from `previous` so the pair stays consistent.
fn persist(storage: &dyn DocumentStore, book: &RentBook, previous: Option<&RentBook>) -> Result<()> {
    let renters = document::encode(book.renters())?;
    let transactions = document::encode(book.transactions())?;
    storage.write(DocumentKey::Renters, &renters)?;
    if let Err(err) = storage.write(DocumentKey::Transactions, &transactions) {
        if let Some(previous) = previous {
            let rollback = document::encode(previous.renters())
                .and_then(|raw| storage.write(DocumentKey::Renters, &raw));
            if let Err(rollback_err) = rollback {
                warn!(error = %rollback_err, "renters document not rolled back");
            }
        }
        return Err(err);
    }
    info!(
        location = %storage.describe(),
        renters = book.renter_count(),
        transactions = book.transaction_count(),
        "ledger saved"
    );
    Ok(())
}
