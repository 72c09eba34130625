//! Full-recomputation checks over a [`RentBook`].

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::ledger::{Money, RentBook, TransactionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    /// Stored renter balance differs from the sum of its pending amounts.
    BalanceMismatch {
        renter_id: Uuid,
        stored: Money,
        expected: Money,
    },
    /// Cached status disagrees with the status derived from the amounts.
    StatusDrift {
        transaction_id: Uuid,
        stored: TransactionStatus,
        derived: TransactionStatus,
    },
    OrphanTransaction {
        transaction_id: Uuid,
        renter_id: Uuid,
    },
    /// `advance_used` is larger than `paid_amount`, typically after a payment
    /// was lowered by an edit.
    AdvanceExceedsPaid { transaction_id: Uuid },
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::BalanceMismatch {
                renter_id,
                stored,
                expected,
            } => write!(
                f,
                "renter {renter_id} balance is {stored} but invoices add up to {expected}"
            ),
            AuditIssue::StatusDrift {
                transaction_id,
                stored,
                derived,
            } => write!(
                f,
                "invoice {transaction_id} is stored as {stored} but amounts say {derived}"
            ),
            AuditIssue::OrphanTransaction {
                transaction_id,
                renter_id,
            } => write!(
                f,
                "invoice {transaction_id} references unknown renter {renter_id}"
            ),
            AuditIssue::AdvanceExceedsPaid { transaction_id } => write!(
                f,
                "invoice {transaction_id} used more advance than it has been paid"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Recomputes every renter balance and invoice status from scratch.
pub fn reconcile(book: &RentBook) -> AuditReport {
    let mut expected: HashMap<Uuid, Money> = book
        .renters()
        .iter()
        .map(|renter| (renter.id, Money::ZERO))
        .collect();
    let mut issues = Vec::new();

    for txn in book.transactions() {
        match expected.get_mut(&txn.renter_id) {
            Some(total) => *total += txn.pending_amount(),
            None => issues.push(AuditIssue::OrphanTransaction {
                transaction_id: txn.id,
                renter_id: txn.renter_id,
            }),
        }
        if txn.has_status_drift() {
            issues.push(AuditIssue::StatusDrift {
                transaction_id: txn.id,
                stored: txn.status,
                derived: txn.derived_status(),
            });
        }
        if txn.advance_used > txn.paid_amount {
            issues.push(AuditIssue::AdvanceExceedsPaid {
                transaction_id: txn.id,
            });
        }
    }

    for renter in book.renters() {
        let sum = expected.get(&renter.id).copied().unwrap_or(Money::ZERO);
        if sum != renter.balance {
            issues.push(AuditIssue::BalanceMismatch {
                renter_id: renter.id,
                stored: renter.balance,
                expected: sum,
            });
        }
    }

    AuditReport { issues }
}
