//! Stock movements and the balance check that guards removals.

use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, ItemCode, LocationCode, Quantity, StockScope};

/// Command: receive stock into a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockIn {
    pub item: ItemCode,
    pub location: LocationCode,
    pub quantity: Quantity,
}

/// Command: remove stock from a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOut {
    pub item: ItemCode,
    pub location: LocationCode,
    pub quantity: Quantity,
}

impl StockIn {
    pub fn new(item: ItemCode, location: LocationCode, quantity: Quantity) -> Self {
        Self {
            item,
            location,
            quantity,
        }
    }

    pub fn parse(item: &str, location: &str, quantity: i64) -> Result<Self, DomainError> {
        Ok(Self::new(
            ItemCode::parse(item)?,
            LocationCode::parse(location)?,
            Quantity::new(quantity)?,
        ))
    }
}

impl StockOut {
    pub fn new(item: ItemCode, location: LocationCode, quantity: Quantity) -> Self {
        Self {
            item,
            location,
            quantity,
        }
    }

    pub fn parse(item: &str, location: &str, quantity: i64) -> Result<Self, DomainError> {
        Ok(Self::new(
            ItemCode::parse(item)?,
            LocationCode::parse(location)?,
            Quantity::new(quantity)?,
        ))
    }
}

/// Current balances of one item at one location, as read before a removal.
///
/// `None` means the row has never existed (item never stocked, or never
/// stocked at that location). It counts as zero in every check.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StockBalance {
    pub total: Option<i64>,
    pub at_location: Option<i64>,
}

impl StockBalance {
    pub fn total_or_zero(&self) -> i64 {
        self.total.unwrap_or(0)
    }

    pub fn at_location_or_zero(&self) -> i64 {
        self.at_location.unwrap_or(0)
    }
}

/// What a validated removal does to the location row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockOutPlan {
    /// The location is emptied: its row is deleted.
    RemoveLocation { quantity: i64 },
    /// The location keeps `remaining` units.
    DecrementLocation { quantity: i64, remaining: i64 },
}

impl StockOutPlan {
    pub fn quantity(&self) -> i64 {
        match *self {
            StockOutPlan::RemoveLocation { quantity } => quantity,
            StockOutPlan::DecrementLocation { quantity, .. } => quantity,
        }
    }
}

/// Balances after adding `cmd` to `balance`.
///
/// Fails with a validation error when the total or the location quantity
/// would exceed `i64::MAX`; nothing may be written in that case.
pub fn plan_stock_in(balance: StockBalance, cmd: &StockIn) -> Result<StockBalance, DomainError> {
    let added = cmd.quantity.get();
    let overflow = || {
        DomainError::validation(format!(
            "quantity would exceed the maximum balance of {}",
            i64::MAX
        ))
    };

    let total = balance.total_or_zero().checked_add(added).ok_or_else(overflow)?;
    let at_location = balance
        .at_location_or_zero()
        .checked_add(added)
        .ok_or_else(overflow)?;

    Ok(StockBalance {
        total: Some(total),
        at_location: Some(at_location),
    })
}

/// Check a removal against the current balances.
///
/// The location balance is checked first, then the total on its own: a total
/// smaller than a location balance means the stored rows disagree, and the
/// removal is refused rather than driving the total negative.
pub fn plan_stock_out(balance: StockBalance, cmd: &StockOut) -> Result<StockOutPlan, DomainError> {
    let requested = cmd.quantity.get();

    let at_location = balance.at_location_or_zero();
    if at_location < requested {
        return Err(DomainError::insufficient(
            StockScope::Location(cmd.location.clone()),
            at_location,
            requested,
        ));
    }

    let total = balance.total_or_zero();
    if total < requested {
        return Err(DomainError::insufficient(StockScope::Total, total, requested));
    }

    if at_location == requested {
        Ok(StockOutPlan::RemoveLocation { quantity: requested })
    } else {
        Ok(StockOutPlan::DecrementLocation {
            quantity: requested,
            remaining: at_location - requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stock_out(quantity: i64) -> StockOut {
        StockOut::parse("CPU-1", "A1", quantity).unwrap()
    }

    #[test]
    fn exact_location_balance_removes_the_row() {
        let balance = StockBalance {
            total: Some(80),
            at_location: Some(50),
        };
        let plan = plan_stock_out(balance, &stock_out(50)).unwrap();
        assert_eq!(plan, StockOutPlan::RemoveLocation { quantity: 50 });
    }

    #[test]
    fn partial_removal_decrements() {
        let balance = StockBalance {
            total: Some(80),
            at_location: Some(50),
        };
        let plan = plan_stock_out(balance, &stock_out(20)).unwrap();
        assert_eq!(
            plan,
            StockOutPlan::DecrementLocation {
                quantity: 20,
                remaining: 30
            }
        );
    }

    #[test]
    fn stock_in_adds_to_both_balances() {
        let cmd = StockIn::parse("CPU-1", "A1", 5).unwrap();
        let balance = StockBalance {
            total: Some(30),
            at_location: None,
        };
        assert_eq!(
            plan_stock_in(balance, &cmd),
            Ok(StockBalance {
                total: Some(35),
                at_location: Some(5),
            })
        );
    }

    #[test]
    fn stock_in_past_the_maximum_balance_is_rejected() {
        let cmd = StockIn::parse("CPU-1", "A2", 1).unwrap();
        let full_total = StockBalance {
            total: Some(i64::MAX),
            at_location: None,
        };
        assert!(matches!(plan_stock_in(full_total, &cmd), Err(DomainError::Validation(_))));

        let full_location = StockBalance {
            total: Some(i64::MAX - 10),
            at_location: Some(i64::MAX),
        };
        assert!(matches!(plan_stock_in(full_location, &cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn never_stocked_location_reads_as_zero() {
        let balance = StockBalance {
            total: Some(30),
            at_location: None,
        };
        let err = plan_stock_out(balance, &stock_out(1)).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                scope: StockScope::Location(loc),
                available,
                requested,
            } => {
                assert_eq!(loc.as_str(), "A1");
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn total_is_checked_independently_of_location() {
        // Rows disagree: the location claims more than the total.
        let balance = StockBalance {
            total: Some(5),
            at_location: Some(10),
        };
        let err = plan_stock_out(balance, &stock_out(8)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                scope: StockScope::Total,
                available: 5,
                requested: 8
            }
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: an accepted plan never leaves either balance negative,
        /// and only an exact match empties the location.
        #[test]
        fn accepted_plans_never_overdraw(
            at_location in proptest::option::of(0i64..1_000),
            extra_total in 0i64..1_000,
            requested in 1i64..1_500,
        ) {
            let balance = StockBalance {
                total: at_location.map(|q| q + extra_total),
                at_location,
            };
            if let Ok(plan) = plan_stock_out(balance, &stock_out(requested)) {
                prop_assert!(balance.at_location_or_zero() >= requested);
                prop_assert!(balance.total_or_zero() >= requested);
                match plan {
                    StockOutPlan::RemoveLocation { quantity } => {
                        prop_assert_eq!(quantity, balance.at_location_or_zero());
                    }
                    StockOutPlan::DecrementLocation { remaining, .. } => {
                        prop_assert!(remaining > 0);
                    }
                }
            } else {
                prop_assert!(
                    balance.at_location_or_zero() < requested
                        || balance.total_or_zero() < requested
                );
            }
        }
    }
}
