//! Strongly-typed codes and names used across the ledger.
//!
//! Every value is trimmed and checked against the width of the column that
//! stores it, so nothing empty or oversized ever reaches the store.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemCode(String);

/// Identifier of a physical storage location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode(String);

/// Human-readable item name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

macro_rules! impl_text_newtype {
    ($t:ty, $name:literal, $max_len:expr) => {
        impl $t {
            /// Maximum length in characters (matches the column width).
            pub const MAX_LEN: usize = $max_len;

            /// Parse user input: trims whitespace, rejects empty or oversized values.
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                let value = raw.trim();
                if value.is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                let len = value.chars().count();
                if len > Self::MAX_LEN {
                    return Err(DomainError::validation(format!(
                        "{} is {} characters long, at most {} allowed",
                        $name,
                        len,
                        Self::MAX_LEN
                    )));
                }
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_text_newtype!(ItemCode, "item code", 50);
impl_text_newtype!(LocationCode, "location code", 100);
impl_text_newtype!(ItemName, "item name", 255);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let code = ItemCode::parse("  CPU-1 \t").unwrap();
        assert_eq!(code.as_str(), "CPU-1");
    }

    #[test]
    fn empty_and_blank_values_are_rejected() {
        for raw in ["", "   ", "\t"] {
            match LocationCode::parse(raw) {
                Err(DomainError::Validation(msg)) => assert!(msg.contains("location code")),
                other => panic!("expected validation error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn oversized_values_are_rejected() {
        let long = "X".repeat(ItemCode::MAX_LEN + 1);
        assert!(matches!(ItemCode::parse(&long), Err(DomainError::Validation(_))));

        let exact = "X".repeat(ItemCode::MAX_LEN);
        assert!(ItemCode::parse(&exact).is_ok());
    }

    #[test]
    fn width_is_counted_in_characters() {
        // Multi-byte names fit as long as the character count does.
        let name = "記憶體".repeat(80);
        assert!(ItemName::parse(&name).is_ok());
    }

    #[test]
    fn codes_order_lexically() {
        let a = LocationCode::parse("A1").unwrap();
        let b = LocationCode::parse("A2").unwrap();
        assert!(a < b);
    }
}
