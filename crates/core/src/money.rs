//! Fixed-point money.
//!
//! All monetary amounts are carried as integer cents. Accumulation never
//! touches binary floating point; formatting is the only place the decimal
//! point appears.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Monetary amount in integer cents (2-digit decimal precision).
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn amount(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition; overflow is a domain invariant violation.
    pub fn checked_add(self, other: Cents) -> DomainResult<Cents> {
        self.0
            .checked_add(other.0)
            .map(Cents)
            .ok_or_else(|| DomainError::invariant("money addition overflow"))
    }

    /// Checked multiplication by a quantity.
    pub fn checked_mul(self, quantity: i64) -> DomainResult<Cents> {
        self.0
            .checked_mul(quantity)
            .map(Cents)
            .ok_or_else(|| DomainError::invariant("money multiplication overflow"))
    }
}

impl core::fmt::Display for Cents {
    /// Renders as a decimal amount, e.g. `1234` -> `12.34`, `-50` -> `-0.50`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = i128::from(self.0);
        let sign = if total < 0 { "-" } else { "" };
        let abs = total.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_decimals() {
        assert_eq!(Cents::new(0).to_string(), "0.00");
        assert_eq!(Cents::new(5).to_string(), "0.05");
        assert_eq!(Cents::new(1234).to_string(), "12.34");
        assert_eq!(Cents::new(-50).to_string(), "-0.50");
        assert_eq!(Cents::new(-1234).to_string(), "-12.34");
        assert_eq!(Cents::new(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn checked_arithmetic_flags_overflow() {
        assert_eq!(
            Cents::new(2).checked_add(Cents::new(3)).unwrap(),
            Cents::new(5)
        );
        assert_eq!(Cents::new(150).checked_mul(4).unwrap(), Cents::new(600));
        assert!(Cents::new(i64::MAX).checked_add(Cents::new(1)).is_err());
        assert!(Cents::new(i64::MAX).checked_mul(2).is_err());
    }
}
