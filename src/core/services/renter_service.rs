use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{NewRenter, RentBook, Renter, RenterPatch, RenterStatus};

pub struct RenterService;

impl RenterService {
    pub fn add(book: &mut RentBook, details: NewRenter, joined_at: NaiveDate) -> Result<Uuid> {
        if details.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("renter name is required".into()));
        }
        let renter = Renter::new(details, joined_at);
        debug!(renter = %renter.id, advance = %renter.advance_balance, "renter added");
        Ok(book.push_renter(renter))
    }

    /// Applies profile changes. Returns the updated renter, or `None` if unknown.
    pub fn edit(book: &mut RentBook, id: Uuid, patch: RenterPatch) -> Result<Option<Renter>> {
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(LedgerError::InvalidInput("renter name is required".into()));
        }
        let Some(renter) = book.renter_mut(id) else {
            return Ok(None);
        };
        patch.apply_to(renter);
        debug!(renter = %id, "renter edited");
        Ok(Some(renter.clone()))
    }

    /// Hard-deletes a renter together with every invoice it owns.
    /// Returns the number of invoices purged, or `None` if the renter was unknown.
    pub fn remove(book: &mut RentBook, id: Uuid) -> Option<usize> {
        book.remove_renter(id)?;
        let purged = book.purge_transactions_for(id);
        debug!(renter = %id, purged, "renter removed");
        Some(purged)
    }

    /// Flips active/inactive. Amounts are never touched.
    pub fn toggle_status(book: &mut RentBook, id: Uuid) -> Option<RenterStatus> {
        let renter = book.renter_mut(id)?;
        renter.status = renter.status.toggled();
        debug!(renter = %id, status = %renter.status, "renter status toggled");
        Some(renter.status)
    }

    /// Active renters first, each group kept in insertion order.
    pub fn sorted_for_display(book: &RentBook) -> Vec<&Renter> {
        let mut renters: Vec<&Renter> = book.renters().iter().collect();
        renters.sort_by_key(|renter| renter.status);
        renters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::InvoiceService;
    use crate::ledger::{InvoiceDraft, Money};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    fn details(name: &str) -> NewRenter {
        NewRenter::new(name, "E-5", date(), Money::from_major(5_000))
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut book = RentBook::new();
        let err = RenterService::add(&mut book, details("   "), date()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
        assert_eq!(book.renter_count(), 0);
    }

    #[test]
    fn edit_cannot_reach_balance() {
        let mut book = RentBook::new();
        let id = RenterService::add(&mut book, details("Omar"), date()).unwrap();
        InvoiceService::create(
            &mut book,
            InvoiceDraft::new(id, Money::from_major(700), date()),
            false,
        )
        .unwrap();
        let edited = RenterService::edit(
            &mut book,
            id,
            RenterPatch {
                phone: Some("99887".into()),
                advance_balance: Some(Money::from_major(1_000)),
                ..RenterPatch::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(edited.balance, Money::from_major(700));
        assert_eq!(edited.advance_balance, Money::from_major(1_000));
        assert!(RenterService::edit(&mut book, Uuid::new_v4(), RenterPatch::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn toggle_is_reversible_and_keeps_amounts() {
        let mut book = RentBook::new();
        let id = RenterService::add(
            &mut book,
            details("Lena").with_advance(Money::from_major(250)),
            date(),
        )
        .unwrap();
        let before = book.renter(id).cloned().unwrap();
        assert_eq!(
            RenterService::toggle_status(&mut book, id),
            Some(RenterStatus::Inactive)
        );
        assert_eq!(
            RenterService::toggle_status(&mut book, id),
            Some(RenterStatus::Active)
        );
        assert_eq!(book.renter(id).unwrap(), &before);
        assert_eq!(RenterService::toggle_status(&mut book, Uuid::new_v4()), None);
    }

    #[test]
    fn display_order_puts_active_first() {
        let mut book = RentBook::new();
        let a = RenterService::add(&mut book, details("A"), date()).unwrap();
        let b = RenterService::add(&mut book, details("B"), date()).unwrap();
        let c = RenterService::add(&mut book, details("C"), date()).unwrap();
        RenterService::toggle_status(&mut book, a);
        let order: Vec<Uuid> = RenterService::sorted_for_display(&book)
            .iter()
            .map(|renter| renter.id)
            .collect();
        assert_eq!(order, vec![b, c, a]);
    }
}
