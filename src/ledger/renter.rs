use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;

/// A tenant with a running debt and a pool of prepaid credit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Renter {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub unit_number: String,
    pub lease_start_date: NaiveDate,
    pub monthly_rent: Money,
    /// Total unpaid debt across every live invoice of this renter.
    pub balance: Money,
    #[serde(default)]
    pub advance_balance: Money,
    pub joined_at: NaiveDate,
    #[serde(default)]
    pub status: RenterStatus,
}

impl Renter {
    /// Creates an active renter with a zero balance.
    pub fn new(details: NewRenter, joined_at: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: details.name,
            phone: details.phone,
            email: details.email,
            unit_number: details.unit_number,
            lease_start_date: details.lease_start_date,
            monthly_rent: details.monthly_rent,
            balance: Money::ZERO,
            advance_balance: details.advance_balance,
            joined_at,
            status: RenterStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RenterStatus::Active
    }

    pub fn short_id(&self) -> String {
        short_id(self.id)
    }
}

/// Caller-supplied fields for a new renter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRenter {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub unit_number: String,
    pub lease_start_date: NaiveDate,
    pub monthly_rent: Money,
    pub advance_balance: Money,
}

impl NewRenter {
    pub fn new(
        name: impl Into<String>,
        unit_number: impl Into<String>,
        lease_start_date: NaiveDate,
        monthly_rent: Money,
    ) -> Self {
        Self {
            name: name.into(),
            phone: String::new(),
            email: None,
            unit_number: unit_number.into(),
            lease_start_date,
            monthly_rent,
            advance_balance: Money::ZERO,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_advance(mut self, advance: Money) -> Self {
        self.advance_balance = advance;
        self
    }
}

/// Partial update for a renter's profile. `balance` is owned by the invoice
/// engine and intentionally has no field here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenterPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub unit_number: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub monthly_rent: Option<Money>,
    pub advance_balance: Option<Money>,
}

impl RenterPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, renter: &mut Renter) {
        if let Some(name) = self.name {
            renter.name = name;
        }
        if let Some(phone) = self.phone {
            renter.phone = phone;
        }
        if let Some(email) = self.email {
            renter.email = email;
        }
        if let Some(unit) = self.unit_number {
            renter.unit_number = unit;
        }
        if let Some(date) = self.lease_start_date {
            renter.lease_start_date = date;
        }
        if let Some(rent) = self.monthly_rent {
            renter.monthly_rent = rent;
        }
        if let Some(advance) = self.advance_balance {
            renter.advance_balance = advance;
        }
    }
}

/// Soft-delete marker. Records stored before the field existed load as active.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RenterStatus {
    #[default]
    Active,
    Inactive,
}

impl RenterStatus {
    pub fn toggled(self) -> Self {
        match self {
            RenterStatus::Active => RenterStatus::Inactive,
            RenterStatus::Inactive => RenterStatus::Active,
        }
    }
}

impl fmt::Display for RenterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RenterStatus::Active => "active",
            RenterStatus::Inactive => "inactive",
        };
        f.write_str(label)
    }
}

/// First eight hex digits of an id, used for display and prefix lookup.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn new_renter_starts_active_with_zero_balance() {
        let details = NewRenter::new("Asha", "A-101", lease_date(), Money::from_major(8_000))
            .with_advance(Money::from_major(500));
        let renter = Renter::new(details, lease_date());
        assert_eq!(renter.balance, Money::ZERO);
        assert_eq!(renter.advance_balance, Money::from_major(500));
        assert!(renter.is_active());
    }

    #[test]
    fn missing_status_and_advance_default_on_load() {
        let json = r#"{
            "id": "6f1c1f7e-8a59-4b0e-9f0e-1d2b3c4d5e6f",
            "name": "Ravi",
            "phone": "98200",
            "unit_number": "B-2",
            "lease_start_date": "2023-01-01",
            "monthly_rent": 700000,
            "balance": 0,
            "joined_at": "2023-01-01"
        }"#;
        let renter: Renter = serde_json::from_str(json).unwrap();
        assert_eq!(renter.status, RenterStatus::Active);
        assert_eq!(renter.advance_balance, Money::ZERO);
        assert_eq!(renter.email, None);
    }

    #[test]
    fn patch_leaves_unset_fields_alone() {
        let mut renter = Renter::new(
            NewRenter::new("Asha", "A-101", lease_date(), Money::from_major(8_000)),
            lease_date(),
        );
        RenterPatch {
            unit_number: Some("A-102".into()),
            email: Some(Some("asha@example.com".into())),
            ..RenterPatch::default()
        }
        .apply_to(&mut renter);
        assert_eq!(renter.unit_number, "A-102");
        assert_eq!(renter.email.as_deref(), Some("asha@example.com"));
        assert_eq!(renter.name, "Asha");
    }

    #[test]
    fn toggling_twice_restores_status() {
        let status = RenterStatus::Active;
        assert_eq!(status.toggled(), RenterStatus::Inactive);
        assert_eq!(status.toggled().toggled(), status);
    }
}
