mod common;

use common::{assert_balance_invariant, book_with_renter, day, rupees};
use rent_ledger::{
    core::{
        audit::reconcile,
        services::{InvoiceService, RenterService},
    },
    errors::LedgerError,
    ledger::{InvoiceDraft, Money, NewRenter, TransactionPatch, TransactionStatus},
};
use uuid::Uuid;

#[test]
fn advance_partially_covers_a_larger_invoice() {
    let (mut book, id) = book_with_renter(500);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(800), day()), true).unwrap();

    assert_eq!(txn.paid_amount, rupees(500));
    assert_eq!(txn.advance_used, rupees(500));
    assert_eq!(txn.status, TransactionStatus::Partial);
    let renter = book.renter(id).unwrap();
    assert_eq!(renter.advance_balance, Money::ZERO);
    assert_eq!(renter.balance, rupees(300));
}

#[test]
fn advance_fully_covers_a_smaller_invoice() {
    let (mut book, id) = book_with_renter(1_000);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(600), day()), true).unwrap();

    assert_eq!(txn.paid_amount, rupees(600));
    assert_eq!(txn.advance_used, rupees(600));
    assert_eq!(txn.status, TransactionStatus::Paid);
    let renter = book.renter(id).unwrap();
    assert_eq!(renter.advance_balance, rupees(400));
    assert_eq!(renter.balance, Money::ZERO);
}

#[test]
fn advance_is_ignored_unless_requested() {
    let (mut book, id) = book_with_renter(1_000);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(600), day()), false).unwrap();
    assert_eq!(txn.advance_used, Money::ZERO);
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(book.renter(id).unwrap().advance_balance, rupees(1_000));
    assert_eq!(book.renter(id).unwrap().balance, rupees(600));
}

#[test]
fn create_then_delete_restores_renter_exactly() {
    for (advance, total, use_advance) in [(500, 800, true), (1_000, 600, true), (0, 750, false)] {
        let (mut book, id) = book_with_renter(advance);
        let before = book.renter(id).unwrap().clone();
        let txn = InvoiceService::create(
            &mut book,
            InvoiceDraft::new(id, Money::from_minor(total * 100 + 33), day()),
            use_advance,
        )
        .unwrap();
        InvoiceService::delete(&mut book, txn.id).unwrap().unwrap();

        let after = book.renter(id).unwrap();
        assert_eq!(after.balance, before.balance);
        assert_eq!(after.advance_balance, before.advance_balance);
        assert_eq!(book.transaction_count(), 0);
    }
}

#[test]
fn status_boundaries_hold_across_create_and_update() {
    let (mut book, id) = book_with_renter(1_000);
    let exact =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(1_000), day()), true).unwrap();
    assert_eq!(exact.status, TransactionStatus::Paid);

    let open =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(400), day()), false).unwrap();
    assert_eq!(open.status, TransactionStatus::Pending);

    let partial =
        InvoiceService::update(&mut book, open.id, TransactionPatch::payment(rupees(1))).unwrap().unwrap();
    assert_eq!(partial.status, TransactionStatus::Partial);
    let paid =
        InvoiceService::update(&mut book, open.id, TransactionPatch::payment(rupees(400))).unwrap().unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);
    let reopened = InvoiceService::update(
        &mut book,
        open.id,
        TransactionPatch {
            total_amount: Some(rupees(500)),
            ..TransactionPatch::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(reopened.status, TransactionStatus::Partial);
    let cleared =
        InvoiceService::update(&mut book, open.id, TransactionPatch::payment(Money::ZERO)).unwrap().unwrap();
    assert_eq!(cleared.status, TransactionStatus::Pending);
    assert_balance_invariant(&book);
}

#[test]
fn update_moves_balance_by_the_pending_delta() {
    let (mut book, id) = book_with_renter(0);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(1_000), day()), false).unwrap();
    InvoiceService::update(&mut book, txn.id, TransactionPatch::payment(rupees(200))).unwrap().unwrap();
    let before = book.renter(id).unwrap().balance;
    assert_eq!(before, rupees(800));

    InvoiceService::update(&mut book, txn.id, TransactionPatch::payment(rupees(1_000))).unwrap().unwrap();
    assert_eq!(book.renter(id).unwrap().balance, before - rupees(800));
}

#[test]
fn update_never_touches_the_advance_pool() {
    let (mut book, id) = book_with_renter(300);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(900), day()), true).unwrap();
    InvoiceService::update(&mut book, txn.id, TransactionPatch::payment(rupees(100))).unwrap().unwrap();

    let stored = book.transaction(txn.id).unwrap();
    assert_eq!(stored.advance_used, rupees(300));
    assert_eq!(book.renter(id).unwrap().advance_balance, Money::ZERO);
    assert!(reconcile(&book)
        .issues
        .iter()
        .any(|issue| issue.to_string().contains("more advance")));
}

#[test]
fn overpayment_is_stored_without_crediting_advance() {
    let (mut book, id) = book_with_renter(0);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(500), day()), false).unwrap();
    let updated =
        InvoiceService::update(&mut book, txn.id, TransactionPatch::payment(rupees(700))).unwrap().unwrap();
    assert_eq!(updated.status, TransactionStatus::Paid);
    let renter = book.renter(id).unwrap();
    assert_eq!(renter.balance, rupees(-200));
    assert_eq!(renter.advance_balance, Money::ZERO);
    assert_balance_invariant(&book);
}

#[test]
fn delete_refunds_advance_and_reverses_pending() {
    let (mut book, id) = book_with_renter(300);
    let txn =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(1_000), day()), true).unwrap();
    InvoiceService::update(&mut book, txn.id, TransactionPatch::payment(rupees(450))).unwrap().unwrap();
    let before = book.renter(id).unwrap().clone();
    let stored = book.transaction(txn.id).unwrap().clone();

    InvoiceService::delete(&mut book, txn.id).unwrap().unwrap();
    let after = book.renter(id).unwrap();
    assert_eq!(after.advance_balance, before.advance_balance + rupees(300));
    assert_eq!(after.balance, before.balance - stored.pending_amount());
}

#[test]
fn cascade_delete_leaves_no_orphans() {
    let (mut book, id) = book_with_renter(0);
    let other = RenterService::add(
        &mut book,
        NewRenter::new("Vikram", "B-7", day(), rupees(9_000)),
        day(),
    )
    .unwrap();
    for amount in [100, 200, 300] {
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(amount), day()), false)
            .unwrap();
    }
    InvoiceService::create(&mut book, InvoiceDraft::new(other, rupees(50), day()), false).unwrap();

    assert_eq!(RenterService::remove(&mut book, id), Some(3));
    assert!(book.transactions().iter().all(|txn| txn.renter_id == other));
    assert!(reconcile(&book).is_clean());
}

#[test]
fn missing_entities_are_noops_or_rejected() {
    let (mut book, _) = book_with_renter(100);
    let snapshot = book.clone();
    let ghost = Uuid::new_v4();

    let err = InvoiceService::create(&mut book, InvoiceDraft::new(ghost, rupees(10), day()), true)
        .unwrap_err();
    assert!(matches!(err, LedgerError::RenterNotFound(id) if id == ghost));
    assert!(InvoiceService::update(&mut book, ghost, TransactionPatch::payment(rupees(1))).unwrap().is_none());
    assert!(InvoiceService::delete(&mut book, ghost).unwrap().is_none());
    assert!(RenterService::remove(&mut book, ghost).is_none());
    assert!(RenterService::toggle_status(&mut book, ghost).is_none());
    assert_eq!(book, snapshot);
}

#[test]
fn new_invoices_are_listed_first() {
    let (mut book, id) = book_with_renter(0);
    let first =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(1), day()), false).unwrap();
    let second =
        InvoiceService::create(&mut book, InvoiceDraft::new(id, rupees(2), day()), false).unwrap();
    let ids: Vec<Uuid> = InvoiceService::list(&book).iter().map(|txn| txn.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}
