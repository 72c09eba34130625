use uuid::Uuid;

use super::{renter::Renter, transaction::Transaction};
use crate::errors::LedgerError;

/// In-memory record store holding both ledger collections.
///
/// Renters keep insertion order. Transactions are newest-first because new
/// invoices are prepended. Mutators are crate-private so balances only move
/// through the services in [`crate::core::services`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentBook {
    renters: Vec<Renter>,
    transactions: Vec<Transaction>,
}

impl RentBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a book from persisted collections without reconciling them.
    pub fn from_parts(renters: Vec<Renter>, transactions: Vec<Transaction>) -> Self {
        Self {
            renters,
            transactions,
        }
    }

    pub fn renters(&self) -> &[Renter] {
        &self.renters
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn renter(&self, id: Uuid) -> Option<&Renter> {
        self.renters.iter().find(|renter| renter.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    /// A renter's invoices, newest first.
    pub fn transactions_for(&self, renter_id: Uuid) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions
            .iter()
            .filter(move |txn| txn.renter_id == renter_id)
    }

    pub fn renter_count(&self) -> usize {
        self.renters.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Looks a renter up by full id or unique id prefix.
    pub fn find_renter(&self, key: &str) -> Result<&Renter, LedgerError> {
        resolve_by_prefix(&self.renters, key, |renter| renter.id, "renter")
    }

    /// Looks a transaction up by full id or unique id prefix.
    pub fn find_transaction(&self, key: &str) -> Result<&Transaction, LedgerError> {
        resolve_by_prefix(&self.transactions, key, |txn| txn.id, "invoice")
    }

    pub(crate) fn renter_mut(&mut self, id: Uuid) -> Option<&mut Renter> {
        self.renters.iter_mut().find(|renter| renter.id == id)
    }

    pub(crate) fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub(crate) fn push_renter(&mut self, renter: Renter) -> Uuid {
        let id = renter.id;
        self.renters.push(renter);
        id
    }

    pub(crate) fn prepend_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.insert(0, transaction);
        id
    }

    pub(crate) fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        Some(self.transactions.remove(index))
    }

    pub(crate) fn remove_renter(&mut self, id: Uuid) -> Option<Renter> {
        let index = self.renters.iter().position(|renter| renter.id == id)?;
        Some(self.renters.remove(index))
    }

    /// Drops every transaction owned by `renter_id`, returning how many went.
    pub(crate) fn purge_transactions_for(&mut self, renter_id: Uuid) -> usize {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.renter_id != renter_id);
        before - self.transactions.len()
    }
}

fn resolve_by_prefix<'a, T>(
    items: &'a [T],
    key: &str,
    id_of: impl Fn(&T) -> Uuid,
    label: &str,
) -> Result<&'a T, LedgerError> {
    let needle = key.trim().to_ascii_lowercase().replace('-', "");
    if needle.is_empty() {
        return Err(LedgerError::InvalidInput(format!("{label} id is empty")));
    }
    let mut matches = items
        .iter()
        .filter(|item| id_of(item).simple().to_string().starts_with(&needle));
    let first = matches
        .next()
        .ok_or_else(|| LedgerError::InvalidInput(format!("no {label} matches `{key}`")))?;
    if matches.next().is_some() {
        return Err(LedgerError::InvalidInput(format!(
            "`{key}` matches more than one {label}; use a longer id"
        )));
    }
    Ok(first)
}
