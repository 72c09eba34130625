use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{BillingMonth, Money, RentBook, Renter, Transaction};

/// Headline figures for the landlord dashboard. Inactive renters are excluded
/// from every aggregate except `inactive_renters` and `occupancy_rate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_renters: usize,
    pub inactive_renters: usize,
    pub pending_amount: Money,
    pub advance_held: Money,
    pub expected_monthly_rent: Money,
    pub open_invoices: usize,
    /// Share of renter records that are active, in `0.0..=1.0`.
    pub occupancy_rate: f64,
}

/// Billing totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCollection {
    pub month: BillingMonth,
    pub invoice_count: usize,
    pub billed: Money,
    pub collected: Money,
    pub from_advance: Money,
    pub outstanding: Money,
}

/// A renter together with their invoices, as shown in the renter portal.
#[derive(Debug, Clone)]
pub struct RenterStatement<'a> {
    pub renter: &'a Renter,
    pub transactions: Vec<&'a Transaction>,
}

impl RenterStatement<'_> {
    pub fn open_invoices(&self) -> impl Iterator<Item = &&Transaction> + '_ {
        self.transactions.iter().filter(|txn| txn.is_open())
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn dashboard(book: &RentBook) -> DashboardStats {
        let active: Vec<&Renter> = book.renters().iter().filter(|r| r.is_active()).collect();
        let inactive_renters = book.renter_count() - active.len();
        let occupancy_rate = if book.renter_count() == 0 {
            0.0
        } else {
            active.len() as f64 / book.renter_count() as f64
        };
        DashboardStats {
            total_renters: active.len(),
            inactive_renters,
            pending_amount: active.iter().map(|r| r.balance).sum(),
            advance_held: active.iter().map(|r| r.advance_balance).sum(),
            expected_monthly_rent: active.iter().map(|r| r.monthly_rent).sum(),
            open_invoices: book.transactions().iter().filter(|t| t.is_open()).count(),
            occupancy_rate,
        }
    }

    pub fn month_collection(book: &RentBook, month: BillingMonth) -> MonthCollection {
        let invoices: Vec<&Transaction> = book
            .transactions()
            .iter()
            .filter(|txn| txn.for_month == month)
            .collect();
        let billed: Money = invoices.iter().map(|txn| txn.total_amount).sum();
        let collected: Money = invoices.iter().map(|txn| txn.paid_amount).sum();
        MonthCollection {
            month,
            invoice_count: invoices.len(),
            billed,
            collected,
            from_advance: invoices.iter().map(|txn| txn.advance_used).sum(),
            outstanding: billed - collected,
        }
    }

    pub fn statement(book: &RentBook, renter_id: Uuid) -> Option<RenterStatement<'_>> {
        let renter = book.renter(renter_id)?;
        Some(RenterStatement {
            renter,
            transactions: book.transactions_for(renter_id).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{InvoiceService, RenterService};
    use crate::ledger::{InvoiceDraft, NewRenter, TransactionPatch};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 5).unwrap()
    }

    fn seeded() -> (RentBook, Uuid, Uuid) {
        let mut book = RentBook::new();
        let a = RenterService::add(
            &mut book,
            NewRenter::new("A", "1", date(), Money::from_major(5_000))
                .with_advance(Money::from_major(300)),
            date(),
        )
        .unwrap();
        let b = RenterService::add(
            &mut book,
            NewRenter::new("B", "2", date(), Money::from_major(4_000)),
            date(),
        )
        .unwrap();
        InvoiceService::create(
            &mut book,
            InvoiceDraft::new(a, Money::from_major(1_000), date()),
            true,
        )
        .unwrap();
        let txn = InvoiceService::create(
            &mut book,
            InvoiceDraft::new(b, Money::from_major(2_000), date()),
            false,
        )
        .unwrap();
        InvoiceService::update(
            &mut book,
            txn.id,
            TransactionPatch::payment(Money::from_major(2_000)),
        )
        .unwrap();
        (book, a, b)
    }

    #[test]
    fn dashboard_excludes_inactive_renters() {
        let (mut book, _, b) = seeded();
        RenterService::toggle_status(&mut book, b);
        let stats = SummaryService::dashboard(&book);
        assert_eq!(stats.total_renters, 1);
        assert_eq!(stats.inactive_renters, 1);
        assert_eq!(stats.pending_amount, Money::from_major(700));
        assert_eq!(stats.advance_held, Money::ZERO);
        assert_eq!(stats.expected_monthly_rent, Money::from_major(5_000));
        assert_eq!(stats.open_invoices, 1);
        assert!((stats.occupancy_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_book_has_zero_occupancy() {
        let stats = SummaryService::dashboard(&RentBook::new());
        assert_eq!(stats.total_renters, 0);
        assert_eq!(stats.occupancy_rate, 0.0);
    }

    #[test]
    fn month_collection_splits_billed_and_collected() {
        let (book, _, _) = seeded();
        let report = SummaryService::month_collection(&book, BillingMonth::containing(date()));
        assert_eq!(report.invoice_count, 2);
        assert_eq!(report.billed, Money::from_major(3_000));
        assert_eq!(report.collected, Money::from_major(2_300));
        assert_eq!(report.from_advance, Money::from_major(300));
        assert_eq!(report.outstanding, Money::from_major(700));
    }

    #[test]
    fn statement_lists_only_owned_invoices() {
        let (book, a, _) = seeded();
        let statement = SummaryService::statement(&book, a).unwrap();
        assert_eq!(statement.transactions.len(), 1);
        assert_eq!(statement.open_invoices().count(), 1);
        assert!(SummaryService::statement(&book, Uuid::new_v4()).is_none());
    }
}
