use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{money::Money, renter::short_id};
use crate::errors::LedgerError;

/// A bill issued to a renter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub renter_id: Uuid,
    #[serde(default)]
    pub kind: TransactionKind,
    pub total_amount: Money,
    pub paid_amount: Money,
    /// Portion of `paid_amount` funded from the renter's advance credit.
    #[serde(default)]
    pub advance_used: Money,
    pub date: NaiveDate,
    pub for_month: BillingMonth,
    pub due_date: NaiveDate,
    /// Cached copy of [`TransactionStatus::derive`]; never authoritative.
    pub status: TransactionStatus,
    #[serde(default)]
    pub description: String,
}

impl Transaction {
    /// Builds an invoice from a draft with the given settlement split.
    pub fn from_draft(draft: InvoiceDraft, paid_amount: Money, advance_used: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            renter_id: draft.renter_id,
            kind: TransactionKind::Invoice,
            total_amount: draft.total_amount,
            paid_amount,
            advance_used,
            date: draft.date,
            for_month: draft.for_month,
            due_date: draft.due_date,
            status: TransactionStatus::derive(paid_amount, draft.total_amount),
            description: draft.description,
        }
    }

    /// `total_amount - paid_amount`; the unit every renter balance is built from.
    pub fn pending_amount(&self) -> Money {
        self.total_amount - self.paid_amount
    }

    pub fn derived_status(&self) -> TransactionStatus {
        TransactionStatus::derive(self.paid_amount, self.total_amount)
    }

    pub fn refresh_status(&mut self) {
        self.status = self.derived_status();
    }

    pub fn has_status_drift(&self) -> bool {
        self.status != self.derived_status()
    }

    pub fn is_open(&self) -> bool {
        self.derived_status() != TransactionStatus::Paid
    }

    pub fn short_id(&self) -> String {
        short_id(self.id)
    }

    /// Caller-side sanity check: non-negative amounts and no over-payment.
    pub fn validate_amounts(&self) -> Result<(), LedgerError> {
        if self.total_amount.is_negative() {
            return Err(LedgerError::InvalidInput(
                "total amount cannot be negative".into(),
            ));
        }
        if self.paid_amount.is_negative() {
            return Err(LedgerError::InvalidInput(
                "paid amount cannot be negative".into(),
            ));
        }
        if self.paid_amount > self.total_amount {
            return Err(LedgerError::InvalidInput(format!(
                "paid amount {} exceeds total {}",
                self.paid_amount, self.total_amount
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    #[default]
    Invoice,
}

/// Settlement state of an invoice, a pure function of paid vs total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Paid,
    Partial,
    Pending,
}

impl TransactionStatus {
    pub fn derive(paid_amount: Money, total_amount: Money) -> Self {
        if paid_amount >= total_amount {
            TransactionStatus::Paid
        } else if paid_amount.is_positive() {
            TransactionStatus::Partial
        } else {
            TransactionStatus::Pending
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Paid => "Paid",
            TransactionStatus::Partial => "Partial",
            TransactionStatus::Pending => "Pending",
        };
        f.write_str(label)
    }
}

/// Fields a caller supplies to issue an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub renter_id: Uuid,
    pub total_amount: Money,
    pub for_month: BillingMonth,
    pub due_date: NaiveDate,
    pub date: NaiveDate,
    pub description: String,
}

impl InvoiceDraft {
    /// Draft billed on `date` for the month containing it, due the same day.
    pub fn new(renter_id: Uuid, total_amount: Money, date: NaiveDate) -> Self {
        Self {
            renter_id,
            total_amount,
            for_month: BillingMonth::containing(date),
            due_date: date,
            date,
            description: String::new(),
        }
    }

    pub fn for_month(mut self, month: BillingMonth) -> Self {
        self.for_month = month;
        self
    }

    pub fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.total_amount.is_negative() {
            return Err(LedgerError::InvalidInput(
                "invoice total cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Partial overwrite of an invoice. Status is always re-derived, so it has no field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub total_amount: Option<Money>,
    pub paid_amount: Option<Money>,
    pub description: Option<String>,
    pub for_month: Option<BillingMonth>,
    pub due_date: Option<NaiveDate>,
}

impl TransactionPatch {
    pub fn payment(paid_amount: Money) -> Self {
        Self {
            paid_amount: Some(paid_amount),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns a copy of `original` with the patch applied and status re-derived.
    pub fn merged_with(&self, original: &Transaction) -> Transaction {
        let mut merged = original.clone();
        if let Some(total) = self.total_amount {
            merged.total_amount = total;
        }
        if let Some(paid) = self.paid_amount {
            merged.paid_amount = paid;
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(month) = self.for_month {
            merged.for_month = month;
        }
        if let Some(due) = self.due_date {
            merged.due_date = due;
        }
        merged.refresh_status();
        merged
    }
}

/// Calendar month an invoice bills for, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidInput(format!(
                "month {month} is out of range"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidInput(format!("`{raw}` is not a YYYY-MM month"));
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for BillingMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillingMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
