//! Invoice lifecycle and the balance/advance reconciliation rules.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{InvoiceDraft, Money, RentBook, Transaction, TransactionPatch};

/// Creates, edits and deletes invoices while keeping every renter's
/// `balance` equal to the sum of its invoices' pending amounts.
pub struct InvoiceService;

impl InvoiceService {
    /// Issues an invoice, optionally settling it from the renter's advance credit.
    ///
    /// Fails without touching the book when the renter does not exist or the
    /// new balance would leave the representable range.
    pub fn create(book: &mut RentBook, draft: InvoiceDraft, use_advance: bool) -> Result<Transaction> {
        let renter = book
            .renter_mut(draft.renter_id)
            .ok_or(LedgerError::RenterNotFound(draft.renter_id))?;

        let deduction = if use_advance && renter.advance_balance.is_positive() {
            draft.total_amount.min(renter.advance_balance)
        } else {
            Money::ZERO
        };
        let advance = renter
            .advance_balance
            .checked_sub(deduction)
            .ok_or_else(|| out_of_range("advance balance"))?;
        let balance = draft
            .total_amount
            .checked_sub(deduction)
            .and_then(|owed| renter.balance.checked_add(owed))
            .ok_or_else(|| out_of_range("balance"))?;
        renter.advance_balance = advance;
        renter.balance = balance;

        let transaction = Transaction::from_draft(draft, deduction, deduction);
        debug!(
            transaction = %transaction.id,
            renter = %transaction.renter_id,
            total = %transaction.total_amount,
            advance_used = %transaction.advance_used,
            status = %transaction.status,
            "invoice created"
        );
        book.prepend_transaction(transaction.clone());
        Ok(transaction)
    }

    /// Overwrites invoice fields and moves the owner's balance by the change in
    /// pending amount. Advance usage is fixed at creation and never revisited.
    ///
    /// Returns `Ok(None)` when no invoice has the given id.
    pub fn update(
        book: &mut RentBook,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let Some(existing) = book.transaction(id) else {
            debug!(transaction = %id, "update skipped, invoice not found");
            return Ok(None);
        };
        let merged = patch.merged_with(existing);
        let delta = pending(&merged)?
            .checked_sub(pending(existing)?)
            .ok_or_else(|| out_of_range("pending amount"))?;

        if merged.paid_amount > merged.total_amount {
            warn!(
                transaction = %id,
                paid = %merged.paid_amount,
                total = %merged.total_amount,
                "invoice overpaid; surplus is not credited to advance"
            );
        }

        if !delta.is_zero() {
            match book.renter_mut(merged.renter_id) {
                Some(renter) => {
                    renter.balance = renter
                        .balance
                        .checked_add(delta)
                        .ok_or_else(|| out_of_range("balance"))?;
                }
                None => warn!(
                    transaction = %id,
                    renter = %merged.renter_id,
                    "invoice owner missing; balance not adjusted"
                ),
            }
        }

        if let Some(slot) = book.transaction_mut(id) {
            *slot = merged.clone();
        }
        debug!(transaction = %id, delta = %delta, status = %merged.status, "invoice updated");
        Ok(Some(merged))
    }

    /// Removes an invoice and reverses its effect on the owner's balance and
    /// advance credit. Returns the removed invoice, or `Ok(None)` if it did not exist.
    pub fn delete(book: &mut RentBook, id: Uuid) -> Result<Option<Transaction>> {
        let Some(existing) = book.transaction(id) else {
            return Ok(None);
        };
        let owed = pending(existing)?;
        let refund = existing.advance_used;
        let owner = existing.renter_id;

        match book.renter_mut(owner) {
            Some(renter) => {
                let balance = renter
                    .balance
                    .checked_sub(owed)
                    .ok_or_else(|| out_of_range("balance"))?;
                let advance = if refund.is_positive() {
                    renter
                        .advance_balance
                        .checked_add(refund)
                        .ok_or_else(|| out_of_range("advance balance"))?
                } else {
                    renter.advance_balance
                };
                renter.balance = balance;
                renter.advance_balance = advance;
            }
            None => warn!(
                transaction = %id,
                renter = %owner,
                "deleted invoice had no owner"
            ),
        }
        let removed = book.remove_transaction(id);
        debug!(transaction = %id, refunded = %refund, "invoice deleted");
        Ok(removed)
    }

    /// Invoices in newest-first order.
    pub fn list(book: &RentBook) -> Vec<&Transaction> {
        book.transactions().iter().collect()
    }
}

fn pending(txn: &Transaction) -> Result<Money> {
    txn.total_amount
        .checked_sub(txn.paid_amount)
        .ok_or_else(|| out_of_range("pending amount"))
}

fn out_of_range(field: &str) -> LedgerError {
    LedgerError::InvalidInput(format!("{field} would exceed the supported amount range"))
}
