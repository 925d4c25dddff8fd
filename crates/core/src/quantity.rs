//! Positive stock quantities.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A strictly positive number of units moved in or out of stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be a positive integer, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_are_rejected() {
        assert!(matches!(Quantity::new(0), Err(DomainError::Validation(_))));
        assert!(matches!(Quantity::new(-3), Err(DomainError::Validation(_))));
    }

    #[test]
    fn positive_quantity_keeps_its_value() {
        let q = Quantity::new(42).unwrap();
        assert_eq!(q.get(), 42);
        assert_eq!(i64::from(q), 42);
        assert_eq!(q.to_string(), "42");
    }
}
