use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

const MINOR_PER_MAJOR: i64 = 100;

/// Signed amount expressed in minor currency units (paise, cents).
///
/// Operators saturate at the `i64` bounds. Ledger arithmetic goes through
/// [`Money::checked_add`] and [`Money::checked_sub`] instead.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Largest magnitude accepted from text input.
    pub const MAX_INPUT: Money = Money(i64::MAX / 4);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole currency units, e.g. `Money::from_major(500)` is 500.00.
    pub const fn from_major(units: i64) -> Self {
        Self(units * MINOR_PER_MAJOR)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Major and minor parts of the absolute value.
    pub fn split_abs(self) -> (u64, u64) {
        let abs = self.0.unsigned_abs();
        (
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64,
        )
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.split_abs();
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    /// Accepts `1250`, `1,250.50`, `-30.5`, `+12`. At most two decimals.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidInput(format!("`{raw}` is not a valid amount"));
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | '_'))
            .collect();
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(LedgerError::InvalidInput(format!(
                "`{raw}` has more than two decimal places"
            )));
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid());
        }
        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let total = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(minor))
            .filter(|value| *value <= Money::MAX_INPUT.0)
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!("`{raw}` exceeds the largest supported amount"))
            })?;
        Ok(Money(if negative { -total } else { total }))
    }
}
